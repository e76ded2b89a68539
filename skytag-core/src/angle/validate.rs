use super::Angle;
use crate::constants::{HALF_PI, TWOPI};
use crate::{MathErrorKind, SkyError};

/// Wraps radians into [0, 2π).
#[inline]
pub fn wrap_0_2pi(rad: f64) -> f64 {
    let wrapped = libm::fmod(rad, TWOPI);
    let wrapped = if wrapped < 0.0 { wrapped + TWOPI } else { wrapped };
    // fmod of a tiny negative value can round back up to exactly 2π
    if wrapped >= TWOPI {
        0.0
    } else {
        wrapped
    }
}

pub fn validate_right_ascension(angle: Angle) -> Result<Angle, SkyError> {
    let rad = angle.radians();
    if rad.is_finite() {
        return Ok(Angle::from_radians(wrap_0_2pi(rad)));
    }

    Err(SkyError::math_error(
        "validate_right_ascension",
        MathErrorKind::NotFinite,
        "RA not finite",
    ))
}

/// Validates a declination against [-90°, +90°].
pub fn validate_declination(angle: Angle) -> Result<Angle, SkyError> {
    let rad = angle.radians();
    if !rad.is_finite() {
        return Err(SkyError::math_error(
            "validate_declination",
            MathErrorKind::NotFinite,
            "Dec not finite",
        ));
    }

    if (-HALF_PI..=HALF_PI).contains(&rad) {
        return Ok(angle);
    }

    Err(SkyError::math_error(
        "validate_declination",
        MathErrorKind::OutOfRange,
        &format!("Dec {:.2}° out of range [-90°, +90°]", angle.degrees()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_right_ascension_wraps() {
        let ra = validate_right_ascension(Angle::from_degrees(400.0)).unwrap();
        assert_relative_eq!(ra.degrees(), 40.0, epsilon = 1e-10);

        let ra = validate_right_ascension(Angle::from_degrees(-10.0)).unwrap();
        assert_relative_eq!(ra.degrees(), 350.0, epsilon = 1e-10);

        let ra = validate_right_ascension(Angle::from_degrees(360.0)).unwrap();
        assert!(ra.degrees().abs() < 1e-10);
    }

    #[test]
    fn test_right_ascension_rejects_nan() {
        let err = validate_right_ascension(Angle::from_degrees(f64::NAN)).unwrap_err();
        assert!(matches!(
            err,
            SkyError::MathError {
                kind: MathErrorKind::NotFinite,
                ..
            }
        ));
    }

    #[test]
    fn test_declination_range() {
        assert!(validate_declination(Angle::from_degrees(90.0)).is_ok());
        assert!(validate_declination(Angle::from_degrees(-90.0)).is_ok());
        assert!(validate_declination(Angle::from_degrees(0.0)).is_ok());

        let err = validate_declination(Angle::from_degrees(95.0)).unwrap_err();
        assert!(err.to_string().contains("95.00°"));
        assert!(validate_declination(Angle::from_degrees(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_wrap_stays_in_range() {
        for rad in [-1e-18, -TWOPI, TWOPI, 3.0 * TWOPI + 0.5, 0.0] {
            let w = wrap_0_2pi(rad);
            assert!((0.0..TWOPI).contains(&w), "{} -> {}", rad, w);
        }
    }
}
