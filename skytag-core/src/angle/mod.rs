//! Typed angles, sexagesimal parsing and coordinate validation.
//!
//! | Submodule | Purpose |
//! |-----------|---------|
//! | `core` | [`Angle`] storage and unit conversions |
//! | [`parse`] | [`AngleUnits`] / [`ParseAngle`] for HMS, DMS and decimal strings |
//! | [`validate`] | Right ascension wrapping, declination range checks |

mod core;
pub mod parse;
pub mod validate;

pub use self::core::Angle;
pub use parse::{parse_dms, parse_hms, AngleUnits, ParseAngle};
pub use validate::{validate_declination, validate_right_ascension, wrap_0_2pi};
