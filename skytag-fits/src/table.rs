//! `BINTABLE` extensions: column layout from `TFORMn`/`TTYPEn` and typed
//! column reads with `TSCALn`/`TZEROn` applied.

use crate::header::Header;
use crate::reader::HduInfo;
use crate::{FitsError, Result};
use byteorder::{BigEndian, ByteOrder};

/// Binary-table element types, keyed by their `TFORM` letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Logical,
    Bit,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    ComplexFloat,
    ComplexDouble,
    Descriptor32,
    Descriptor64,
}

impl ColumnType {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'L' => Some(Self::Logical),
            'X' => Some(Self::Bit),
            'B' => Some(Self::Byte),
            'I' => Some(Self::Short),
            'J' => Some(Self::Int),
            'K' => Some(Self::Long),
            'E' => Some(Self::Float),
            'D' => Some(Self::Double),
            'A' => Some(Self::Char),
            'C' => Some(Self::ComplexFloat),
            'M' => Some(Self::ComplexDouble),
            'P' => Some(Self::Descriptor32),
            'Q' => Some(Self::Descriptor64),
            _ => None,
        }
    }

    /// Bytes per element. `Bit` columns pack eight elements per byte.
    pub fn element_size(self) -> usize {
        match self {
            Self::Logical | Self::Bit | Self::Byte | Self::Char => 1,
            Self::Short => 2,
            Self::Int | Self::Float => 4,
            Self::Long | Self::Double | Self::ComplexFloat | Self::Descriptor32 => 8,
            Self::ComplexDouble | Self::Descriptor64 => 16,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Self::Byte | Self::Short | Self::Int | Self::Long)
    }

    pub fn is_real(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }
}

/// Splits a `TFORMn` value into repeat count and element type.
///
/// `1K` and `K` both mean one 64-bit integer; `PE(100)` is a 32-bit heap
/// descriptor whose trailing max-length is ignored.
pub fn parse_tform(format: &str) -> Result<(usize, ColumnType)> {
    let format = format.trim();
    if format.is_empty() {
        return Err(FitsError::InvalidFormat("Empty column format".to_string()));
    }

    let digits = format.chars().take_while(|c| c.is_ascii_digit()).count();
    let repeat = if digits == 0 {
        1
    } else {
        format[..digits].parse().map_err(|_| {
            FitsError::InvalidFormat(format!("Invalid repeat count in format '{}'", format))
        })?
    };

    let code = format[digits..].chars().next().ok_or_else(|| {
        FitsError::InvalidFormat(format!(
            "Invalid FITS format '{}' - missing data type",
            format
        ))
    })?;

    let column_type = ColumnType::from_code(code).ok_or_else(|| {
        FitsError::InvalidFormat(format!("Unknown binary table format: {}", format))
    })?;

    Ok((repeat, column_type))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub index: usize,
    pub name: Option<String>,
    pub format: String,
    pub column_type: ColumnType,
    pub repeat: usize,
    pub unit: Option<String>,
    pub scale: f64,
    pub zero: f64,
    /// Byte offset of the column within a row.
    pub offset: usize,
}

impl ColumnInfo {
    /// Bytes the column occupies in each row.
    pub fn width(&self) -> usize {
        match self.column_type {
            ColumnType::Bit => self.repeat.div_ceil(8),
            ColumnType::Descriptor32 | ColumnType::Descriptor64 => {
                self.column_type.element_size() * self.repeat.min(1)
            }
            other => other.element_size() * self.repeat,
        }
    }

    pub fn is_scaled(&self) -> bool {
        self.scale != 1.0 || self.zero != 0.0
    }

    fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("column {}", self.index + 1))
    }

    fn unsupported(&self) -> FitsError {
        FitsError::UnsupportedColumn {
            name: self.display_name(),
            format: self.format.clone(),
        }
    }
}

/// Raw row bytes of a binary table, without the heap.
#[derive(Debug, Clone)]
pub struct TableData {
    bytes: Vec<u8>,
    row_size: usize,
}

impl TableData {
    pub fn new(bytes: Vec<u8>, row_size: usize) -> Self {
        Self { bytes, row_size }
    }

    pub fn num_rows(&self) -> usize {
        if self.row_size == 0 {
            0
        } else {
            self.bytes.len() / self.row_size
        }
    }

    pub fn row(&self, index: usize) -> Option<&[u8]> {
        let start = index.checked_mul(self.row_size)?;
        self.bytes.get(start..start + self.row_size)
    }

    fn cells<'a>(&'a self, column: &'a ColumnInfo) -> impl Iterator<Item = &'a [u8]> + 'a {
        let width = column.width();
        self.bytes
            .chunks_exact(self.row_size.max(1))
            .map(move |row| &row[column.offset..column.offset + width])
    }
}

#[derive(Debug, Clone)]
pub struct BinaryTableHdu {
    header: Header,
    info: HduInfo,
    columns: Vec<ColumnInfo>,
    row_size: usize,
    num_rows: usize,
}

impl BinaryTableHdu {
    pub fn new(header: Header, info: HduInfo) -> Result<Self> {
        if !header.is_binary_table() {
            return Err(FitsError::InvalidFormat(format!(
                "HDU {} is not a binary table",
                info.index
            )));
        }

        let row_size = non_negative(&header, "NAXIS1")?;
        let num_rows = non_negative(&header, "NAXIS2")?;
        let column_count = non_negative(&header, "TFIELDS")?;

        let mut columns = Vec::with_capacity(column_count);
        let mut offset = 0;
        for index in 0..column_count {
            let column = Self::read_column_info(&header, index, offset)?;
            offset += column.width();
            columns.push(column);
        }

        if offset > row_size {
            return Err(FitsError::InvalidFormat(format!(
                "Columns need {} bytes per row but NAXIS1 = {}",
                offset, row_size
            )));
        }

        Ok(Self {
            header,
            info,
            columns,
            row_size,
            num_rows,
        })
    }

    fn read_column_info(header: &Header, index: usize, offset: usize) -> Result<ColumnInfo> {
        let n = index + 1;
        let format_key = format!("TFORM{}", n);
        let format = header
            .get_string(&format_key)
            .ok_or(FitsError::KeywordNotFound {
                keyword: format_key.clone(),
            })?
            .trim()
            .to_string();
        let (repeat, column_type) = parse_tform(&format)?;

        Ok(ColumnInfo {
            index,
            name: header
                .get_string(&format!("TTYPE{}", n))
                .map(|s| s.trim().to_string()),
            format,
            column_type,
            repeat,
            unit: header
                .get_string(&format!("TUNIT{}", n))
                .map(|s| s.trim().to_string()),
            scale: header.get_real(&format!("TSCAL{}", n)).unwrap_or(1.0),
            zero: header.get_real(&format!("TZERO{}", n)).unwrap_or(0.0),
            offset,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn hdu_info(&self) -> &HduInfo {
        &self.info
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn row_size(&self) -> usize {
        self.row_size
    }

    /// Bytes of row data, excluding the heap and block padding.
    pub fn table_size(&self) -> usize {
        self.row_size * self.num_rows
    }

    /// Column names compare case-insensitively, as `TTYPEn` values do.
    pub fn column_by_name(&self, name: &str) -> Result<&ColumnInfo> {
        self.columns
            .iter()
            .find(|c| c.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
            .ok_or_else(|| FitsError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_by_name(name).is_ok()
    }

    /// Reads a scalar numeric column as physical values `raw * TSCAL + TZERO`.
    pub fn column_f64(&self, data: &TableData, name: &str) -> Result<Vec<f64>> {
        let column = self.checked_scalar(data, name)?;
        let decode: fn(&[u8]) -> f64 = match column.column_type {
            ColumnType::Byte => |b| b[0] as f64,
            ColumnType::Short => |b| BigEndian::read_i16(b) as f64,
            ColumnType::Int => |b| BigEndian::read_i32(b) as f64,
            ColumnType::Long => |b| BigEndian::read_i64(b) as f64,
            ColumnType::Float => |b| BigEndian::read_f32(b) as f64,
            ColumnType::Double => BigEndian::read_f64,
            _ => return Err(column.unsupported()),
        };

        let (scale, zero) = (column.scale, column.zero);
        let values = data.cells(column).map(decode);
        Ok(if column.is_scaled() {
            values.map(|v| v * scale + zero).collect()
        } else {
            values.collect()
        })
    }

    /// Reads a scalar integer column exactly, with an integral `TZERO` added.
    pub fn column_i64(&self, data: &TableData, name: &str) -> Result<Vec<i64>> {
        let column = self.checked_scalar(data, name)?;
        if !column.column_type.is_integer() {
            return Err(column.unsupported());
        }
        let decode: fn(&[u8]) -> i64 = match column.column_type {
            ColumnType::Byte => |b| b[0] as i64,
            ColumnType::Short => |b| BigEndian::read_i16(b) as i64,
            ColumnType::Int => |b| BigEndian::read_i32(b) as i64,
            _ => BigEndian::read_i64,
        };

        if !column.is_scaled() {
            return Ok(data.cells(column).map(decode).collect());
        }

        if column.scale != 1.0 || column.zero.fract() != 0.0 || column.zero.abs() > i64::MAX as f64 {
            return Err(column.unsupported());
        }
        let zero = column.zero as i64;
        data.cells(column)
            .map(|cell| {
                decode(cell).checked_add(zero).ok_or_else(|| {
                    FitsError::InvalidFormat(format!(
                        "TZERO overflow in column {}",
                        column.display_name()
                    ))
                })
            })
            .collect()
    }

    fn checked_scalar(&self, data: &TableData, name: &str) -> Result<&ColumnInfo> {
        let column = self.column_by_name(name)?;
        if column.repeat != 1 {
            return Err(column.unsupported());
        }
        if data.row_size != self.row_size || data.num_rows() != self.num_rows {
            return Err(FitsError::InvalidFormat(format!(
                "Table data holds {} rows of {} bytes, header declares {} rows of {} bytes",
                data.num_rows(),
                data.row_size,
                self.num_rows,
                self.row_size
            )));
        }
        Ok(column)
    }
}

fn non_negative(header: &Header, keyword: &str) -> Result<usize> {
    let value = header.require_integer(keyword)?;
    usize::try_from(value).map_err(|_| FitsError::InvalidKeywordValue {
        keyword: keyword.to_string(),
        value: value.to_string(),
    })
}
