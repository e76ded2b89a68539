use crate::header::{is_end_card, Header};
use crate::table::{BinaryTableHdu, TableData};
use crate::{FitsError, Result, CARD_SIZE, FITS_BLOCK_SIZE};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Where [`FitsFile::open`] reads from: the file itself, or its
/// decompressed contents when it was gzipped.
#[derive(Debug)]
pub enum FitsSource {
    File(BufReader<File>),
    Memory(Cursor<Vec<u8>>),
}

impl Read for FitsSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::File(inner) => inner.read(buf),
            Self::Memory(inner) => inner.read(buf),
        }
    }
}

impl Seek for FitsSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Self::File(inner) => inner.seek(pos),
            Self::Memory(inner) => inner.seek(pos),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HduInfo {
    pub index: usize,
    pub header_start: u64,
    pub header_size: usize,
    pub data_start: u64,
    /// Unpadded data size in bytes, heap included.
    pub data_size: usize,
}

#[derive(Debug)]
pub struct FitsFile<R> {
    reader: R,
    hdus: Vec<HduInfo>,
    headers: Vec<Header>,
}

impl FitsFile<FitsSource> {
    /// Opens a FITS file, decompressing it first if it starts with the gzip
    /// magic bytes.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;

        let mut magic = [0u8; 2];
        let is_gzip = match file.read_exact(&mut magic) {
            Ok(()) => magic == GZIP_MAGIC,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => false,
            Err(e) => return Err(e.into()),
        };
        file.seek(SeekFrom::Start(0))?;

        let source = if is_gzip {
            let mut bytes = Vec::new();
            GzDecoder::new(BufReader::new(file)).read_to_end(&mut bytes)?;
            FitsSource::Memory(Cursor::new(bytes))
        } else {
            FitsSource::File(BufReader::new(file))
        };

        Self::new(source)
    }
}

impl<R: Read + Seek> FitsFile<R> {
    pub fn new(reader: R) -> Result<Self> {
        let mut fits = FitsFile {
            reader,
            hdus: Vec::new(),
            headers: Vec::new(),
        };
        fits.scan_hdus()?;
        Ok(fits)
    }

    pub fn num_hdus(&self) -> usize {
        self.hdus.len()
    }

    pub fn hdu_info(&self, index: usize) -> Option<&HduInfo> {
        self.hdus.get(index)
    }

    pub fn header(&self, index: usize) -> Result<&Header> {
        self.headers.get(index).ok_or(FitsError::HduNotFound(index))
    }

    pub fn primary_header(&self) -> Result<&Header> {
        self.header(0)
    }

    pub fn binary_table(&self, index: usize) -> Result<BinaryTableHdu> {
        let header = self.header(index)?.clone();
        let info = self.hdus[index].clone();
        BinaryTableHdu::new(header, info)
    }

    /// The first `BINTABLE` extension, where sky maps keep their pixels.
    pub fn first_binary_table(&self) -> Result<BinaryTableHdu> {
        let index = self
            .headers
            .iter()
            .position(Header::is_binary_table)
            .ok_or(FitsError::NoBinaryTable)?;
        self.binary_table(index)
    }

    pub fn read_table_data(&mut self, table: &BinaryTableHdu) -> Result<TableData> {
        let info = table.hdu_info();
        if table.table_size() > info.data_size {
            return Err(FitsError::InvalidFormat(format!(
                "HDU {} declares {} table bytes in a {} byte data unit",
                info.index,
                table.table_size(),
                info.data_size
            )));
        }

        self.reader.seek(SeekFrom::Start(info.data_start))?;
        let mut bytes = vec![0u8; table.table_size()];
        read_exact_or_eof(&mut self.reader, &mut bytes)?;
        Ok(TableData::new(bytes, table.row_size()))
    }

    fn scan_hdus(&mut self) -> Result<()> {
        let mut position = 0u64;

        loop {
            let header_bytes = match self.read_header_blocks(position) {
                Ok(Some(bytes)) => bytes,
                Ok(None) => break,
                Err(e) if self.hdus.is_empty() => return Err(e),
                // Trailing bytes that do not form a header end the scan.
                Err(_) => break,
            };

            let header = Header::parse(&header_bytes)?;
            if self.hdus.is_empty() && !header.is_primary() {
                return Err(FitsError::InvalidFormat(
                    "Primary header does not start with SIMPLE = T".to_string(),
                ));
            }

            let data_start = position + header_bytes.len() as u64;
            let data_size = calculate_data_size(&header)?;
            self.hdus.push(HduInfo {
                index: self.hdus.len(),
                header_start: position,
                header_size: header_bytes.len(),
                data_start,
                data_size,
            });
            self.headers.push(header);

            position = data_start + align_to_block(data_size as u64);
        }

        if self.hdus.is_empty() {
            return Err(FitsError::InvalidFormat("Empty file".to_string()));
        }
        Ok(())
    }

    /// Reads whole header blocks from `start` until one holds `END`.
    /// Returns `None` when `start` is exactly at the end of the stream.
    fn read_header_blocks(&mut self, start: u64) -> Result<Option<Vec<u8>>> {
        self.reader.seek(SeekFrom::Start(start))?;

        let mut bytes = Vec::new();
        let mut block = [0u8; FITS_BLOCK_SIZE];
        loop {
            let filled = fill(&mut self.reader, &mut block)?;
            if filled == 0 && bytes.is_empty() {
                return Ok(None);
            }
            if filled < FITS_BLOCK_SIZE {
                return Err(FitsError::UnexpectedEof);
            }

            bytes.extend_from_slice(&block);
            if block.chunks(CARD_SIZE).any(is_end_card) {
                return Ok(Some(bytes));
            }
        }
    }
}

/// Data unit size in bytes: `|BITPIX|/8 * GCOUNT * (PCOUNT + NAXIS1 * ... * NAXISn)`.
pub fn calculate_data_size(header: &Header) -> Result<usize> {
    let naxis = header.require_integer("NAXIS")?;
    if naxis == 0 {
        return Ok(0);
    }

    let bitpix = header.require_integer("BITPIX")?;
    let bytes_per_value = match bitpix {
        8 | 16 | 32 | 64 | -32 | -64 => bitpix.unsigned_abs() as usize / 8,
        other => {
            return Err(FitsError::InvalidKeywordValue {
                keyword: "BITPIX".to_string(),
                value: other.to_string(),
            })
        }
    };

    let mut elements: usize = 1;
    for axis in 1..=naxis {
        let keyword = format!("NAXIS{}", axis);
        let length = header.require_integer(&keyword)?;
        let length = usize::try_from(length).map_err(|_| FitsError::InvalidKeywordValue {
            keyword: keyword.clone(),
            value: length.to_string(),
        })?;
        elements = elements
            .checked_mul(length)
            .ok_or_else(|| FitsError::InvalidFormat("Data unit size overflows".to_string()))?;
    }

    let pcount = header.get_integer("PCOUNT").unwrap_or(0).max(0) as usize;
    let gcount = header.get_integer("GCOUNT").unwrap_or(1).max(1) as usize;

    (elements + pcount)
        .checked_mul(gcount)
        .and_then(|n| n.checked_mul(bytes_per_value))
        .ok_or_else(|| FitsError::InvalidFormat("Data unit size overflows".to_string()))
}

pub fn align_to_block(size: u64) -> u64 {
    size.div_ceil(FITS_BLOCK_SIZE as u64) * FITS_BLOCK_SIZE as u64
}

/// Reads until `buf` is full or the stream ends; returns the bytes read.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => FitsError::UnexpectedEof,
        _ => e.into(),
    })
}
