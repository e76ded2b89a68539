//! Error types for angle handling and HEALPix arithmetic.
//!
//! [`SkyError`] covers the failure modes of the foundation layer: malformed
//! angle strings, out-of-range coordinates and invalid HEALPix arguments.
//!
//! | Variant | Use Case |
//! |---------|----------|
//! | [`Parse`](SkyError::Parse) | Angle strings that match no accepted notation |
//! | [`MathError`](SkyError::MathError) | Non-finite or out-of-range coordinates |
//! | [`Healpix`](SkyError::Healpix) | UNIQ values or levels outside the supported hierarchy |
//!
//! ```
//! use skytag_core::{MathErrorKind, SkyError};
//!
//! fn checked_level(level: u8) -> Result<u8, SkyError> {
//!     if level > 29 {
//!         return Err(SkyError::healpix("level", &format!("{} exceeds 29", level)));
//!     }
//!     Ok(level)
//! }
//!
//! assert!(checked_level(30).is_err());
//! ```

use thiserror::Error;

/// Classification of numerical failures.
#[derive(Debug, Clone, PartialEq)]
pub enum MathErrorKind {
    /// Input value is invalid for the operation.
    InvalidInput,
    /// Result or input is NaN or infinity.
    NotFinite,
    /// Value outside valid domain (e.g., declination > 90°).
    OutOfRange,
}

#[derive(Error, Debug)]
pub enum SkyError {
    /// Text that could not be read as an angle.
    #[error("Cannot parse '{input}' as {expected}")]
    Parse { input: String, expected: String },

    /// Numerical computation or validation failure.
    #[error("Math error in {operation} ({kind:?}): {message}")]
    MathError {
        operation: String,
        kind: MathErrorKind,
        message: String,
    },

    /// Invalid HEALPix argument (UNIQ, level, pixel index).
    #[error("HEALPix error ({context}): {message}")]
    Healpix { context: String, message: String },
}

/// Convenience alias for `Result<T, SkyError>`.
pub type SkyResult<T> = Result<T, SkyError>;

impl SkyError {
    /// Creates a [`Parse`](Self::Parse) error.
    pub fn parse(input: &str, expected: &str) -> Self {
        Self::Parse {
            input: input.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Creates a [`MathError`](Self::MathError) with the given kind.
    pub fn math_error(operation: &str, kind: MathErrorKind, reason: &str) -> Self {
        Self::MathError {
            operation: operation.to_string(),
            kind,
            message: reason.to_string(),
        }
    }

    /// Creates a [`Healpix`](Self::Healpix) error.
    pub fn healpix(context: &str, reason: &str) -> Self {
        Self::Healpix {
            context: context.to_string(),
            message: reason.to_string(),
        }
    }
}
