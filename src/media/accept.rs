//! `Accept` header parsing.
//!
//! # Responsibilities
//! - Split an `Accept` header (possibly repeated) into entries
//! - Parse each entry's media type and quality factor
//! - Order entries by client preference
//!
//! # Design Decisions
//! - Any malformed entry rejects the whole header (no partial parsing)
//! - Quality factors are kept as integer thousandths to get a total order
//! - Entries with `q=0` are kept here; the negotiator decides what they mean

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

use crate::media::media_type::{MediaType, MediaTypeError, Specificity};

/// Error returned for a malformed `Accept` header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcceptError {
    #[error("invalid media range: {0}")]
    MediaType(#[from] MediaTypeError),

    #[error("invalid quality factor `{0}`")]
    Quality(String),

    #[error("unterminated quoted string in Accept header")]
    UnterminatedQuote,
}

/// A quality factor in thousandths, `0..=1000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u16);

impl Quality {
    pub const MAX: Quality = Quality(1000);
    pub const ZERO: Quality = Quality(0);

    /// Parse an RFC 7231 `qvalue`: `0[.ddd]` or `1[.000]`.
    pub fn parse(input: &str) -> Result<Self, AcceptError> {
        let invalid = || AcceptError::Quality(input.to_string());
        let s = input.trim();
        let (whole, fraction) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if fraction.len() > 3 || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let mut thousandths: u16 = 0;
        for (i, digit) in fraction.bytes().enumerate() {
            thousandths += u16::from(digit - b'0') * [100, 10, 1][i];
        }
        match whole {
            "0" => Ok(Quality(thousandths)),
            "1" if thousandths == 0 => Ok(Quality::MAX),
            _ => Err(invalid()),
        }
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Quality::MAX
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 1000 {
            f.write_str("1")
        } else {
            let digits = format!("{:03}", self.0);
            write!(f, "0.{}", digits.trim_end_matches('0'))
        }
    }
}

/// One comma-separated item of an `Accept` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptEntry {
    media_type: MediaType,
    quality: Quality,
    position: usize,
}

impl AcceptEntry {
    /// Parse a single media range such as `text/html;q=0.8`.
    pub fn parse(input: &str, position: usize) -> Result<Self, AcceptError> {
        let parsed = MediaType::parse(input)?;
        let quality = match parsed.param("q") {
            Some(q) => Quality::parse(q)?,
            None => Quality::default(),
        };
        Ok(Self {
            media_type: parsed.without_param("q"),
            quality,
            position,
        })
    }

    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn specificity(&self) -> Specificity {
        self.media_type.specificity()
    }

    /// Preference order: higher `q` first, then more specific, then earlier
    /// in the header.
    fn preference(&self, other: &Self) -> Ordering {
        other
            .quality
            .cmp(&self.quality)
            .then_with(|| other.specificity().cmp(&self.specificity()))
            .then_with(|| self.position.cmp(&other.position))
    }
}

/// The parsed, preference-ordered entries of an `Accept` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptHeader {
    entries: Vec<AcceptEntry>,
}

impl AcceptHeader {
    /// The implicit header used when the request has none: `*/*; q=1`.
    pub fn any() -> Self {
        Self {
            entries: vec![AcceptEntry {
                media_type: MediaType::any(),
                quality: Quality::MAX,
                position: 0,
            }],
        }
    }

    /// Parse one or more raw `Accept` header values.
    ///
    /// Repeated headers are treated as one comma-joined list. Empty list
    /// items are skipped; a header with no items at all is treated as absent.
    pub fn parse<'a, I>(values: I) -> Result<Self, AcceptError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut entries = Vec::new();
        for value in values {
            for item in split_list(value)? {
                if item.trim().is_empty() {
                    continue;
                }
                let position = entries.len();
                entries.push(AcceptEntry::parse(item, position)?);
            }
        }
        if entries.is_empty() {
            return Ok(Self::any());
        }
        entries.sort_by(|a, b| a.preference(b));
        Ok(Self { entries })
    }

    /// Entries in preference order.
    pub fn entries(&self) -> &[AcceptEntry] {
        &self.entries
    }
}

impl Default for AcceptHeader {
    fn default() -> Self {
        Self::any()
    }
}

/// Split a header value on commas that are not inside quoted strings.
fn split_list(value: &str) -> Result<Vec<&str>, AcceptError> {
    let mut items = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (idx, c) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                items.push(&value[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if in_quotes {
        return Err(AcceptError::UnterminatedQuote);
    }
    items.push(&value[start..]);
    Ok(items)
}
