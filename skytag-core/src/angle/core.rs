//! Core angle type.
//!
//! [`Angle`] stores radians and converts to and from the units that show up
//! on the command line and in sky-map metadata: degrees for both axes, hours
//! for right ascension.
//!
//! ```
//! use skytag_core::Angle;
//!
//! let ra = Angle::from_hours(6.0);
//! assert!((ra.degrees() - 90.0).abs() < 1e-10);
//!
//! let (sin, cos) = Angle::from_degrees(30.0).sin_cos();
//! assert!((sin - 0.5).abs() < 1e-12);
//! assert!((cos - 0.75_f64.sqrt()).abs() < 1e-12);
//! ```

use crate::constants::{DEGREES_PER_HOUR, HALF_PI, PI};
use crate::SkyError;

/// An angular measurement stored as radians.
///
/// `Eq` and `Ord` are not implemented because f64 can be NaN.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Angle {
    rad: f64,
}

impl Angle {
    pub const ZERO: Self = Self { rad: 0.0 };

    pub const PI: Self = Self { rad: PI };

    pub const HALF_PI: Self = Self { rad: HALF_PI };

    #[inline]
    pub const fn from_radians(rad: f64) -> Self {
        Self { rad }
    }

    #[inline]
    pub fn from_degrees(deg: f64) -> Self {
        Self {
            rad: deg.to_radians(),
        }
    }

    /// Creates an angle from hours (1h = 15°).
    #[inline]
    pub fn from_hours(h: f64) -> Self {
        Self {
            rad: (h * DEGREES_PER_HOUR).to_radians(),
        }
    }

    #[inline]
    pub fn radians(self) -> f64 {
        self.rad
    }

    #[inline]
    pub fn degrees(self) -> f64 {
        self.rad.to_degrees()
    }

    #[inline]
    pub fn hours(self) -> f64 {
        self.degrees() / DEGREES_PER_HOUR
    }

    #[inline]
    pub fn sin(self) -> f64 {
        libm::sin(self.rad)
    }

    #[inline]
    pub fn cos(self) -> f64 {
        libm::cos(self.rad)
    }

    #[inline]
    pub fn sin_cos(self) -> (f64, f64) {
        libm::sincos(self.rad)
    }

    /// Wraps into [0°, 360°). Fails only for non-finite input.
    pub fn validate_right_ascension(self) -> Result<Self, SkyError> {
        super::validate::validate_right_ascension(self)
    }

    /// Checks the [-90°, +90°] range.
    pub fn validate_declination(self) -> Result<Self, SkyError> {
        super::validate::validate_declination(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unit_round_trips() {
        assert_relative_eq!(Angle::from_degrees(180.0).radians(), PI, epsilon = 1e-15);
        assert_relative_eq!(Angle::from_hours(24.0).degrees(), 360.0, epsilon = 1e-12);
        assert_relative_eq!(Angle::from_degrees(45.0).hours(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_trig_uses_radians() {
        let a = Angle::HALF_PI;
        assert_relative_eq!(a.sin(), 1.0, epsilon = 1e-15);
        assert!(a.cos().abs() < 1e-15);
        assert_eq!(Angle::ZERO.sin_cos(), (0.0, 1.0));
    }

    #[test]
    fn test_comparison() {
        assert!(Angle::from_degrees(10.0) < Angle::from_degrees(20.0));
        assert_eq!(Angle::from_radians(PI), Angle::PI);
    }
}
