//! Builders for small in-memory FITS files used by tests across the workspace.

use crate::{CARD_SIZE, FITS_BLOCK_SIZE};
use byteorder::{BigEndian, WriteBytesExt};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use tempfile::NamedTempFile;

/// A binary-table column and its values, one per row.
#[derive(Debug, Clone)]
pub enum MockColumn {
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl MockColumn {
    fn tform(&self) -> &'static str {
        match self {
            Self::Short(_) => "1I",
            Self::Int(_) => "1J",
            Self::Long(_) => "1K",
            Self::Float(_) => "1E",
            Self::Double(_) => "1D",
        }
    }

    fn width(&self) -> usize {
        match self {
            Self::Short(_) => 2,
            Self::Int(_) | Self::Float(_) => 4,
            Self::Long(_) | Self::Double(_) => 8,
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Short(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Long(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
        }
    }

    fn write_row(&self, row: usize, out: &mut Vec<u8>) {
        let result = match self {
            Self::Short(v) => out.write_i16::<BigEndian>(v[row]),
            Self::Int(v) => out.write_i32::<BigEndian>(v[row]),
            Self::Long(v) => out.write_i64::<BigEndian>(v[row]),
            Self::Float(v) => out.write_f32::<BigEndian>(v[row]),
            Self::Double(v) => out.write_f64::<BigEndian>(v[row]),
        };
        result.expect("writing to a Vec cannot fail");
    }
}

#[derive(Debug, Default)]
struct MockHdu {
    cards: Vec<String>,
    data: Vec<u8>,
}

/// Assembles FITS bytes HDU by HDU. [`card`](Self::card) always appends to
/// the most recently started HDU.
#[derive(Debug, Default)]
pub struct MockFitsBuilder {
    hdus: Vec<MockHdu>,
}

impl MockFitsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn card(mut self, keyword: &str, value: &str, comment: &str) -> Self {
        let card = if comment.is_empty() {
            format!("{:<8}= {:<70}", keyword, value)
        } else {
            format!("{:<8}= {:<20} / {}", keyword, value, comment)
        };
        let mut card_80 = format!("{:<80}", card);
        card_80.truncate(CARD_SIZE);

        if self.hdus.is_empty() {
            self.hdus.push(MockHdu::default());
        }
        if let Some(hdu) = self.hdus.last_mut() {
            hdu.cards.push(card_80);
        }
        self
    }

    /// Appends a real-valued card in a form the header parser reads back exactly.
    pub fn real(self, keyword: &str, value: f64) -> Self {
        self.card(keyword, &format!("{:?}", value), "")
    }

    pub fn simple_primary(self) -> Self {
        self.card("SIMPLE", "T", "Standard FITS format")
            .card("BITPIX", "8", "Bits per pixel")
            .card("NAXIS", "0", "Number of axes")
            .card("EXTEND", "T", "Extensions follow")
    }

    /// Starts a `BINTABLE` extension holding `columns`, all of equal length.
    pub fn binary_table(mut self, columns: &[(&str, MockColumn)]) -> Self {
        let rows = columns.first().map_or(0, |(_, c)| c.len());
        assert!(
            columns.iter().all(|(_, c)| c.len() == rows),
            "mock table columns must have equal length"
        );
        let row_size: usize = columns.iter().map(|(_, c)| c.width()).sum();

        let mut data = Vec::with_capacity(row_size * rows);
        for row in 0..rows {
            for (_, column) in columns {
                column.write_row(row, &mut data);
            }
        }

        self.hdus.push(MockHdu::default());
        let mut builder = self
            .card("XTENSION", "'BINTABLE'", "binary table extension")
            .card("BITPIX", "8", "")
            .card("NAXIS", "2", "")
            .card("NAXIS1", &row_size.to_string(), "width of table in bytes")
            .card("NAXIS2", &rows.to_string(), "number of rows")
            .card("PCOUNT", "0", "")
            .card("GCOUNT", "1", "")
            .card("TFIELDS", &columns.len().to_string(), "");
        for (i, (name, column)) in columns.iter().enumerate() {
            builder = builder
                .card(&format!("TTYPE{}", i + 1), &format!("'{}'", name), "")
                .card(&format!("TFORM{}", i + 1), &format!("'{}'", column.tform()), "");
        }

        if let Some(hdu) = builder.hdus.last_mut() {
            hdu.data = data;
        }
        builder
    }

    pub fn build_memory(self) -> Vec<u8> {
        let mut out = Vec::new();
        for hdu in self.hdus {
            for card in &hdu.cards {
                out.extend_from_slice(card.as_bytes());
            }
            out.extend_from_slice(format!("{:<80}", "END").as_bytes());
            pad_to_block(&mut out, b' ');

            out.extend_from_slice(&hdu.data);
            pad_to_block(&mut out, 0);
        }
        out
    }

    pub fn build_temp_file(self) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().expect("create temp file");
        temp_file
            .write_all(&self.build_memory())
            .expect("write temp file");
        temp_file.flush().expect("flush temp file");
        temp_file
    }

    pub fn build_gzip_temp_file(self) -> NamedTempFile {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&self.build_memory())
            .expect("compress FITS bytes");
        let compressed = encoder.finish().expect("finish gzip stream");

        let mut temp_file = NamedTempFile::new().expect("create temp file");
        temp_file.write_all(&compressed).expect("write temp file");
        temp_file.flush().expect("flush temp file");
        temp_file
    }
}

fn pad_to_block(out: &mut Vec<u8>, fill: u8) {
    let remainder = out.len() % FITS_BLOCK_SIZE;
    if remainder != 0 {
        out.resize(out.len() + FITS_BLOCK_SIZE - remainder, fill);
    }
}
