//! Angle parsing from the notations people type for sky positions.
//!
//! - **HMS (Hours-Minutes-Seconds)**: right ascension, 1 hour = 15 degrees.
//! - **DMS (Degrees-Minutes-Seconds)**: declination.
//! - **Decimal**: plain numbers with an explicit unit.
//!
//! Both sexagesimal forms accept:
//!
//! ```text
//! Colon-separated:  12:34:56.789
//! Letter markers:   12h34m56.789s  or  45d30m15s
//! Verbose:          12 hours 34 minutes 56 seconds
//! Symbol notation:  45d 30' 15"  or  45d 30' 15''
//! ```
//!
//! Signs are only valid at the beginning: `-12:34:56` works, `12:-34:56` does not.
//!
//! ```
//! use skytag_core::angle::{AngleUnits, ParseAngle};
//!
//! let ra = "12:34:56".hms().unwrap();
//! let dec = "-45:30:15".dms().unwrap();
//! let plain = "30.5".deg().unwrap();
//! assert!((plain.degrees() - 30.5).abs() < 1e-12);
//!
//! // Auto-detection tries HMS, then DMS, then decimal degrees.
//! let guessed = "45.5".to_angle().unwrap();
//! assert_eq!(guessed.degrees(), 45.5);
//! # let _ = (ra, dec);
//! ```

use super::Angle;
use crate::SkyError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Parse strings as angles with an explicit unit.
pub trait AngleUnits {
    /// Parse as decimal degrees.
    fn deg(&self) -> Result<Angle, SkyError>;
    /// Parse as decimal hours (1 hour = 15 degrees).
    fn hours(&self) -> Result<Angle, SkyError>;
    /// Parse degrees-minutes-seconds. See module docs for accepted formats.
    fn dms(&self) -> Result<Angle, SkyError>;
    /// Parse hours-minutes-seconds. See module docs for accepted formats.
    fn hms(&self) -> Result<Angle, SkyError>;
}

impl AngleUnits for str {
    #[inline]
    fn deg(&self) -> Result<Angle, SkyError> {
        parse_decimal(self).map(Angle::from_degrees)
    }

    #[inline]
    fn hours(&self) -> Result<Angle, SkyError> {
        parse_decimal(self).map(Angle::from_hours)
    }

    #[inline]
    fn dms(&self) -> Result<Angle, SkyError> {
        parse_dms(self)
    }

    #[inline]
    fn hms(&self) -> Result<Angle, SkyError> {
        parse_hms(self)
    }
}

/// Auto-detect and parse an angle.
///
/// Detection order: HMS -> DMS -> decimal degrees. For coordinates with
/// known semantics prefer `.hms()` / `.dms()` from [`AngleUnits`].
pub trait ParseAngle {
    fn to_angle(&self) -> Result<Angle, SkyError>;
}

impl ParseAngle for str {
    fn to_angle(&self) -> Result<Angle, SkyError> {
        parse_hms(self)
            .or_else(|_| parse_dms(self))
            .or_else(|_| parse_decimal(self).map(Angle::from_degrees))
    }
}

fn parse_decimal(s: &str) -> Result<f64, SkyError> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| SkyError::parse(s, "number"))
}

static HMS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?xi)
        ^\s*
        ([+-])?                          # optional sign
        (\d{1,3})                        # hours
        (?:[:h\s]+)                      # colons, h, spaces
        (\d{1,2})                        # minutes
        (?:[:m\s']+)                     # colons, m, spaces, apostrophes
        (\d{1,2}(?:\.\d+)?)              # seconds with optional decimal
        (?:[s\s"']+)?                    # optional trailing markers
        \s*$
        "#,
    )
    .expect("HMS pattern is valid")
});

static DMS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?xi)
        ^\s*
        ([+-])?                          # optional sign
        (\d{1,3})                        # degrees
        (?:[d\s:]+)                      # d, colon, spaces
        (\d{1,2})                        # minutes
        (?:['m\s:]+)                     # apostrophes, m, spaces, colon
        (\d{1,2}(?:\.\d+)?)              # seconds with optional decimal
        (?:["'s\s]+)?                    # optional trailing markers
        \s*$
        "#,
    )
    .expect("DMS pattern is valid")
});

static COLON_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*([+-])?(\d{1,4}):(\d{1,3}):(\d{1,3}(?:\.\d+)?)\s*$"#)
        .expect("colon pattern is valid")
});

/// Parse a string as hours-minutes-seconds.
///
/// The result can exceed 24h if the input does; wrap it with
/// [`validate_right_ascension`](super::validate_right_ascension).
pub fn parse_hms(s: &str) -> Result<Angle, SkyError> {
    let normalized = normalize_input(s);
    let caps = COLON_REGEX
        .captures(&normalized)
        .or_else(|| HMS_REGEX.captures(&normalized))
        .ok_or_else(|| SkyError::parse(s, "HMS format"))?;
    let total_hours = sexagesimal_total(&caps, s, "HMS format")?;
    Ok(Angle::from_hours(total_hours))
}

/// Parse a string as degrees-minutes-seconds.
pub fn parse_dms(s: &str) -> Result<Angle, SkyError> {
    let normalized = normalize_input(s);
    let caps = COLON_REGEX
        .captures(&normalized)
        .or_else(|| DMS_REGEX.captures(&normalized))
        .ok_or_else(|| SkyError::parse(s, "DMS format"))?;
    let total_degrees = sexagesimal_total(&caps, s, "DMS format")?;
    Ok(Angle::from_degrees(total_degrees))
}

fn sexagesimal_total(caps: &regex::Captures, original: &str, expected: &str) -> Result<f64, SkyError> {
    let sign = caps
        .get(1)
        .map_or(1.0, |m| if m.as_str() == "-" { -1.0 } else { 1.0 });
    let field = |i: usize| -> Result<f64, SkyError> {
        caps[i]
            .parse::<f64>()
            .map_err(|_| SkyError::parse(original, expected))
    };
    let whole = field(2)?;
    let minutes = field(3)?;
    let seconds = field(4)?;

    Ok(sign * (whole + minutes / 60.0 + seconds / 3600.0))
}

/// Spelled-out unit words and their single-letter markers, longest first.
const UNIT_WORDS: &[(&str, &str)] = &[
    ("arcminutes", "m"),
    ("arcseconds", "s"),
    ("arcminute", "m"),
    ("arcsecond", "s"),
    ("degrees", "d"),
    ("minutes", "m"),
    ("seconds", "s"),
    ("arcmin", "m"),
    ("arcsec", "s"),
    ("degree", "d"),
    ("minute", "m"),
    ("second", "s"),
    ("hours", "h"),
    ("hour", "h"),
    ("deg", "d"),
    ("min", "m"),
    ("sec", "s"),
    ("hrs", "h"),
    ("hr", "h"),
    ("*", "d"),
    ("''", "\""),
];

fn normalize_input(s: &str) -> String {
    UNIT_WORDS
        .iter()
        .fold(s.trim().to_string(), |acc, &(word, marker)| acc.replace(word, marker))
}
