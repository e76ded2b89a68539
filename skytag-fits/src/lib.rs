//! Reading multi-order sky maps out of FITS files.
//!
//! Only the parts of FITS that gravitational-wave sky maps use are covered:
//! header cards, HDU scanning, and fixed-width binary-table columns. Gzipped
//! files are decompressed transparently.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`header`] | Card parsing and keyword lookup |
//! | [`table`] | `BINTABLE` column layout and typed column reads |
//! | [`reader`] | HDU scanning over plain or gzipped files |
//!
//! ```no_run
//! use skytag_fits::FitsFile;
//!
//! let mut fits = FitsFile::open("bayestar.multiorder.fits")?;
//! let table = fits.first_binary_table()?;
//! let data = fits.read_table_data(&table)?;
//! let uniq = table.column_i64(&data, "UNIQ")?;
//! let density = table.column_f64(&data, "PROBDENSITY")?;
//! assert_eq!(uniq.len(), density.len());
//! # Ok::<(), skytag_fits::FitsError>(())
//! ```

pub mod errors;
pub mod header;
pub mod reader;
pub mod table;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use errors::{FitsError, Result};
pub use header::{Header, HeaderCard, Keyword, KeywordValue};
pub use reader::{FitsFile, FitsSource, HduInfo};
pub use table::{BinaryTableHdu, ColumnInfo, ColumnType, TableData};

/// FITS files are laid out in blocks of this many bytes.
pub const FITS_BLOCK_SIZE: usize = 2880;

/// Every header card is exactly this wide.
pub const CARD_SIZE: usize = 80;
