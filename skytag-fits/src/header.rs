//! FITS header cards and keyword lookup.
//!
//! A header is a run of 80-byte ASCII cards terminated by `END`. Value cards
//! carry `= ` in columns 9-10; everything after an unquoted `/` is comment.

use crate::{FitsError, Result, CARD_SIZE};
use std::collections::HashMap;
use std::fmt;
use std::str;

#[derive(Debug, Clone, PartialEq)]
pub enum KeywordValue {
    Logical(bool),
    Integer(i64),
    Real(f64),
    String(String),
}

impl KeywordValue {
    pub fn as_logical(&self) -> Option<bool> {
        match self {
            Self::Logical(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to reals; `MJD-OBS = 60063` is as valid as `60063.0`.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for KeywordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logical(b) => write!(f, "{}", if *b { "T" } else { "F" }),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Real(r) => write!(f, "{}", r),
            Self::String(s) => write!(f, "'{}'", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub name: String,
    pub value: Option<KeywordValue>,
    pub comment: Option<String>,
}

impl Keyword {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            comment: None,
        }
    }

    pub fn with_value(mut self, value: KeywordValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Header {
    keywords: Vec<Keyword>,
    keyword_index: HashMap<String, usize>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a keyword. Lookup by name returns the first occurrence.
    pub fn add_keyword(&mut self, keyword: Keyword) {
        let index = self.keywords.len();
        self.keyword_index
            .entry(keyword.name.clone())
            .or_insert(index);
        self.keywords.push(keyword);
    }

    pub fn get_keyword(&self, name: &str) -> Option<&Keyword> {
        self.keyword_index
            .get(name)
            .and_then(|&index| self.keywords.get(index))
    }

    pub fn get_keyword_value(&self, name: &str) -> Option<&KeywordValue> {
        self.get_keyword(name)?.value.as_ref()
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        self.get_keyword_value(name)?.as_integer()
    }

    pub fn get_real(&self, name: &str) -> Option<f64> {
        self.get_keyword_value(name)?.as_real()
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.get_keyword_value(name)?.as_string()
    }

    pub fn require_integer(&self, name: &str) -> Result<i64> {
        match self.get_keyword_value(name) {
            Some(value) => value
                .as_integer()
                .ok_or_else(|| FitsError::InvalidKeywordValue {
                    keyword: name.to_string(),
                    value: value.to_string(),
                }),
            None => Err(FitsError::KeywordNotFound {
                keyword: name.to_string(),
            }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.keyword_index.contains_key(name)
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn is_primary(&self) -> bool {
        self.get_keyword_value("SIMPLE")
            .and_then(KeywordValue::as_logical)
            .unwrap_or(false)
    }

    pub fn is_binary_table(&self) -> bool {
        self.get_string("XTENSION")
            .is_some_and(|x| x.trim() == "BINTABLE")
    }

    /// Parses header bytes up to and including the `END` card.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut header = Header::new();

        for chunk in data.chunks(CARD_SIZE) {
            let raw: &[u8; CARD_SIZE] = chunk
                .try_into()
                .map_err(|_| FitsError::HeaderParse("Truncated header card".to_string()))?;

            if is_end_card(raw) {
                return Ok(header);
            }

            let card = HeaderCard::parse(raw)?;
            if card.keyword.is_empty() {
                continue;
            }
            header.add_keyword(card.to_keyword()?);
        }

        Err(FitsError::HeaderParse("Missing END card".to_string()))
    }
}

pub(crate) fn is_end_card(raw: &[u8]) -> bool {
    raw.len() >= 8 && &raw[0..8] == b"END     "
}

/// One 80-column card split into keyword, raw value text and comment.
#[derive(Debug, Clone)]
pub struct HeaderCard {
    pub keyword: String,
    pub value: Option<String>,
    pub comment: Option<String>,
}

impl HeaderCard {
    pub fn parse(data: &[u8; CARD_SIZE]) -> Result<Self> {
        if !data.is_ascii() {
            return Err(FitsError::InvalidFormat(
                "Non-ASCII byte in header card".to_string(),
            ));
        }
        let card_str = str::from_utf8(data)
            .map_err(|_| FitsError::InvalidFormat("Invalid UTF-8 in header card".to_string()))?;

        let mut card = HeaderCard {
            keyword: card_str[0..8].trim().to_string(),
            value: None,
            comment: None,
        };

        if &card_str[8..10] == "= " {
            let (value, comment) = split_value_comment(&card_str[10..]);
            card.value = value;
            card.comment = comment;
        } else {
            let rest = card_str[8..].trim();
            if !rest.is_empty() {
                card.comment = Some(rest.to_string());
            }
        }

        Ok(card)
    }

    pub fn to_keyword(&self) -> Result<Keyword> {
        let mut keyword = Keyword::new(self.keyword.clone());

        if let Some(comment) = &self.comment {
            keyword = keyword.with_comment(comment.clone());
        }

        if let Some(value_str) = &self.value {
            keyword = keyword.with_value(parse_value(value_str));
        }

        Ok(keyword)
    }
}

fn split_value_comment(field: &str) -> (Option<String>, Option<String>) {
    let trimmed = field.trim_start();

    let (value, remainder) = if trimmed.starts_with('\'') {
        let end = closing_quote(trimmed);
        (&trimmed[..end], &trimmed[end..])
    } else {
        match trimmed.find('/') {
            Some(pos) => (&trimmed[..pos], &trimmed[pos..]),
            None => (trimmed, ""),
        }
    };

    let comment = remainder
        .trim_start()
        .strip_prefix('/')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    let value = value.trim();
    let value = (!value.is_empty()).then(|| value.to_string());
    (value, comment)
}

/// Byte index just past the quote closing a string that starts at 0.
/// Doubled quotes are escapes. Unterminated strings run to the end.
fn closing_quote(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

fn parse_value(value_str: &str) -> KeywordValue {
    let trimmed = value_str.trim();

    match trimmed {
        "T" => return KeywordValue::Logical(true),
        "F" => return KeywordValue::Logical(false),
        _ => {}
    }

    if let Some(inner) = trimmed.strip_prefix('\'') {
        let inner = inner.strip_suffix('\'').unwrap_or(inner);
        return KeywordValue::String(inner.replace("''", "'").trim_end().to_string());
    }

    if let Ok(int_val) = trimmed.parse::<i64>() {
        return KeywordValue::Integer(int_val);
    }

    // Fortran-style exponents: 1.5D+02
    if let Ok(float_val) = trimmed.replace(['D', 'd'], "E").parse::<f64>() {
        return KeywordValue::Real(float_val);
    }

    KeywordValue::String(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(text: &str) -> [u8; CARD_SIZE] {
        let mut raw = [b' '; CARD_SIZE];
        raw[..text.len()].copy_from_slice(text.as_bytes());
        raw
    }

    fn keyword(text: &str) -> Keyword {
        HeaderCard::parse(&card(text)).unwrap().to_keyword().unwrap()
    }

    #[test]
    fn test_value_types() {
        assert_eq!(
            keyword("SIMPLE  =                    T").value,
            Some(KeywordValue::Logical(true))
        );
        assert_eq!(
            keyword("NAXIS2  =                19200 / length of dimension 2").value,
            Some(KeywordValue::Integer(19200))
        );
        assert_eq!(
            keyword("MJD-OBS =     60063.0823219648 / modified Julian date").value,
            Some(KeywordValue::Real(60063.0823219648))
        );
        assert_eq!(
            keyword("DISTMEAN=   1.5D+02").value,
            Some(KeywordValue::Real(150.0))
        );
    }

    #[test]
    fn test_string_with_slash_and_escaped_quote() {
        let kw = keyword("OBJECT  = 'S230404a/b'         / event id");
        assert_eq!(kw.value, Some(KeywordValue::String("S230404a/b".to_string())));
        assert_eq!(kw.comment.as_deref(), Some("event id"));

        let kw = keyword("CREATOR = 'O''Brien '");
        assert_eq!(kw.value.unwrap().as_string(), Some("O'Brien"));
    }

    #[test]
    fn test_comment_cards() {
        let kw = keyword("COMMENT   written by the pipeline");
        assert_eq!(kw.value, None);
        assert_eq!(kw.comment.as_deref(), Some("written by the pipeline"));
    }

    #[test]
    fn test_integer_widens_to_real() {
        assert_eq!(KeywordValue::Integer(60063).as_real(), Some(60063.0));
        assert_eq!(KeywordValue::Real(1.5).as_integer(), None);
    }

    #[test]
    fn test_parse_header_until_end() {
        let mut bytes = Vec::new();
        for text in [
            "XTENSION= 'BINTABLE'",
            "NAXIS2  =                   12",
            "NAXIS2  =                   99",
            "END",
            "IGNORED =                    1",
        ] {
            bytes.extend_from_slice(&card(text));
        }

        let header = Header::parse(&bytes).unwrap();
        assert!(header.is_binary_table());
        assert!(!header.is_primary());
        assert_eq!(header.get_integer("NAXIS2"), Some(12));
        assert!(!header.contains("IGNORED"));
        assert_eq!(header.len(), 3);
    }

    #[test]
    fn test_missing_end_is_an_error() {
        let bytes = card("SIMPLE  =                    T").to_vec();
        assert!(matches!(
            Header::parse(&bytes),
            Err(FitsError::HeaderParse(_))
        ));
    }

    #[test]
    fn test_require_integer() {
        let mut header = Header::new();
        header.add_keyword(Keyword::new("TFIELDS").with_value(KeywordValue::Integer(2)));
        header.add_keyword(Keyword::new("EXTNAME").with_value(KeywordValue::String("SKY".to_string())));

        assert_eq!(header.require_integer("TFIELDS").unwrap(), 2);
        assert!(matches!(
            header.require_integer("NAXIS1"),
            Err(FitsError::KeywordNotFound { .. })
        ));
        assert!(matches!(
            header.require_integer("EXTNAME"),
            Err(FitsError::InvalidKeywordValue { .. })
        ));
    }
}
