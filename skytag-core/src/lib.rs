//! Foundation types for the skytag workspace.
//!
//! `skytag-core` holds the pieces that do not depend on any file format:
//! typed angles with sexagesimal parsing, the error type shared by the
//! lower layers, and the HEALPix arithmetic used to place sky positions
//! inside multi-order probability maps.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`angle`] | [`Angle`], HMS/DMS parsing, RA/Dec validation |
//! | [`healpix`] | NUNIQ decoding, nested `ang2pix` up to level 29, pixel areas |
//! | [`constants`] | Numeric constants (pi multiples, degree/radian factors) |
//! | [`errors`] | [`SkyError`] and [`SkyResult`] |
//!
//! # Example
//!
//! ```
//! use skytag_core::angle::AngleUnits;
//! use skytag_core::healpix::{ang2pix_nest, uniq_to_level_ipix, MAX_LEVEL};
//!
//! let ra = "00:41:22.4".hms().unwrap();
//! let dec = "+14:20:43.9".dms().unwrap();
//! let index29 = ang2pix_nest(MAX_LEVEL, ra.degrees(), dec.degrees()).unwrap();
//! assert!(index29 < 12 << (2 * MAX_LEVEL as u64));
//!
//! assert_eq!(uniq_to_level_ipix(16).unwrap(), (1, 0));
//! ```

pub mod angle;
pub mod constants;
pub mod errors;
pub mod healpix;

pub use angle::Angle;
pub use errors::{MathErrorKind, SkyError, SkyResult};
