//! Media type parsing and comparison.
//!
//! # Responsibilities
//! - Parse `type/subtype[;param=value]*` descriptors
//! - Compare a declared type against a request `Content-Type`
//! - Compare a declared type against an `Accept` entry
//! - Rank types by specificity for tie-breaking
//!
//! # Design Decisions
//! - Type, subtype and parameter names are lower-cased at parse time
//! - The `charset` value is lower-cased too; other values stay case-sensitive
//! - Parameters live in a `BTreeMap` so equality ignores declaration order
//! - Specificity never decides compatibility, only ranking

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The wildcard token for type and subtype.
pub const WILDCARD: &str = "*";

/// Error returned when a media type string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaTypeError {
    #[error("media type `{0}` is missing a `/` separator")]
    MissingSlash(String),

    #[error("media type `{0}` has an empty type")]
    EmptyType(String),

    #[error("media type `{0}` has an empty subtype")]
    EmptySubtype(String),

    #[error("media type `{0}` has a wildcard type with a concrete subtype")]
    WildcardType(String),

    #[error("media type `{input}` contains invalid token `{token}`")]
    InvalidToken { input: String, token: String },

    #[error("media type `{0}` has a malformed parameter")]
    MalformedParameter(String),

    #[error("media type `{0}` has an unterminated quoted string")]
    UnterminatedQuote(String),
}

/// A parsed media type such as `text/html; charset=utf-8`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType {
    type_: String,
    subtype: String,
    params: BTreeMap<String, String>,
}

/// Ranking used to break ties between compatible media types.
///
/// Field order is significant: the derived `Ord` compares a concrete subtype
/// first, then a concrete type, then the number of parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity {
    concrete_subtype: bool,
    concrete_type: bool,
    params: usize,
}

impl MediaType {
    /// The unconstrained `*/*` type.
    pub fn any() -> Self {
        Self {
            type_: WILDCARD.to_string(),
            subtype: WILDCARD.to_string(),
            params: BTreeMap::new(),
        }
    }

    /// Parse a media type string.
    pub fn parse(input: &str) -> Result<Self, MediaTypeError> {
        let trimmed = input.trim();
        let (essence, rest) = match trimmed.find(';') {
            Some(idx) => (&trimmed[..idx], Some(&trimmed[idx + 1..])),
            None => (trimmed, None),
        };
        let essence = essence.trim();

        let (type_, subtype) = match essence.split_once('/') {
            Some((t, s)) => (t.trim(), s.trim()),
            // A bare `*` is shorthand for `*/*`.
            None if essence == WILDCARD => (WILDCARD, WILDCARD),
            None => return Err(MediaTypeError::MissingSlash(input.to_string())),
        };

        if type_.is_empty() {
            return Err(MediaTypeError::EmptyType(input.to_string()));
        }
        if subtype.is_empty() {
            return Err(MediaTypeError::EmptySubtype(input.to_string()));
        }
        for token in [type_, subtype] {
            if !is_token(token) {
                return Err(MediaTypeError::InvalidToken {
                    input: input.to_string(),
                    token: token.to_string(),
                });
            }
        }
        if type_ == WILDCARD && subtype != WILDCARD {
            return Err(MediaTypeError::WildcardType(input.to_string()));
        }

        let params = match rest {
            Some(rest) => parse_params(input, rest)?,
            None => BTreeMap::new(),
        };

        Ok(Self {
            type_: type_.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            params,
        })
    }

    /// The primary type, e.g. `text`.
    pub fn type_(&self) -> &str {
        &self.type_
    }

    /// The subtype, e.g. `html`.
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// Look up a parameter value by (case-insensitive) name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Iterate over the parameters in name order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of declared parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Returns a copy of this type with the named parameter removed.
    pub fn without_param(&self, name: &str) -> Self {
        let mut copy = self.clone();
        copy.params.remove(&name.to_ascii_lowercase());
        copy
    }

    /// True for exactly `*/*` with no parameters.
    pub fn is_any(&self) -> bool {
        self.type_ == WILDCARD && self.subtype == WILDCARD && self.params.is_empty()
    }

    /// True if the type or subtype is `*`.
    pub fn has_wildcard(&self) -> bool {
        self.type_ == WILDCARD || self.subtype == WILDCARD
    }

    pub fn specificity(&self) -> Specificity {
        Specificity {
            concrete_subtype: self.subtype != WILDCARD,
            concrete_type: self.type_ != WILDCARD,
            params: self.params.len(),
        }
    }

    /// Content-Type direction: does this declared `consumes` type accept a
    /// request body of type `request`?
    ///
    /// Wildcards are only honoured on the declared side, and every parameter
    /// declared here must appear in `request` with the same value. Extra
    /// request parameters are ignored.
    pub fn matches_request_type(&self, request: &MediaType) -> bool {
        (self.type_ == WILDCARD || self.type_ == request.type_)
            && (self.subtype == WILDCARD || self.subtype == request.subtype)
            && self
                .params
                .iter()
                .all(|(k, v)| request.params.get(k) == Some(v))
    }

    /// Accept direction: does this declared `produces` type satisfy the
    /// client's acceptable type `accepted`?
    ///
    /// A wildcard on either side is compatible. Parameters only conflict when
    /// both sides name the same parameter with different values, so a handler
    /// declaring `text/plain; charset=utf-8` satisfies `Accept: text/plain`.
    pub fn satisfies(&self, accepted: &MediaType) -> bool {
        token_compatible(&self.type_, &accepted.type_)
            && token_compatible(&self.subtype, &accepted.subtype)
            && accepted
                .params
                .iter()
                .all(|(k, v)| self.params.get(k).map_or(true, |mine| mine == v))
    }

    /// True if some request type could be matched by both `self` and `other`:
    /// compatible type and subtype, and no shared parameter with differing
    /// values.
    pub(crate) fn overlaps(&self, other: &MediaType) -> bool {
        token_compatible(&self.type_, &other.type_)
            && token_compatible(&self.subtype, &other.subtype)
            && self
                .params
                .iter()
                .all(|(k, v)| other.params.get(k).map_or(true, |theirs| theirs == v))
    }
}

impl Default for MediaType {
    fn default() -> Self {
        Self::any()
    }
}

impl FromStr for MediaType {
    type Err = MediaTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)?;
        for (name, value) in &self.params {
            if is_token(value) {
                write!(f, "; {}={}", name, value)?;
            } else {
                write!(f, "; {}=\"", name)?;
                for c in value.chars() {
                    if c == '"' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                f.write_str("\"")?;
            }
        }
        Ok(())
    }
}

fn token_compatible(a: &str, b: &str) -> bool {
    a == WILDCARD || b == WILDCARD || a == b
}

/// RFC 7230 `tchar`.
fn is_tchar(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_tchar)
}

fn parse_params(input: &str, rest: &str) -> Result<BTreeMap<String, String>, MediaTypeError> {
    let malformed = || MediaTypeError::MalformedParameter(input.to_string());
    let mut params = BTreeMap::new();
    let mut chars = rest.char_indices().peekable();

    loop {
        // Skip separators and whitespace between parameters.
        while let Some(&(_, c)) = chars.peek() {
            if c == ';' || c.is_ascii_whitespace() {
                chars.next();
            } else {
                break;
            }
        }
        let Some(&(start, _)) = chars.peek() else {
            return Ok(params);
        };

        let mut name_end = None;
        for (idx, c) in chars.by_ref() {
            if c == '=' {
                name_end = Some(idx);
                break;
            }
            if c == ';' {
                break;
            }
        }
        let name_end = name_end.ok_or_else(malformed)?;
        let name = rest[start..name_end].trim();
        if !is_token(name) {
            return Err(malformed());
        }

        while let Some(&(_, c)) = chars.peek() {
            if c.is_ascii_whitespace() {
                chars.next();
            } else {
                break;
            }
        }

        let value = match chars.peek() {
            Some(&(_, '"')) => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some((_, escaped)) => value.push(escaped),
                            None => break,
                        },
                        '"' => {
                            closed = true;
                            break;
                        }
                        other => value.push(other),
                    }
                }
                if !closed {
                    return Err(MediaTypeError::UnterminatedQuote(input.to_string()));
                }
                // Only whitespace may follow a quoted value before the next `;`.
                while let Some(&(_, c)) = chars.peek() {
                    if c == ';' {
                        break;
                    }
                    if !c.is_ascii_whitespace() {
                        return Err(malformed());
                    }
                    chars.next();
                }
                value
            }
            Some(&(value_start, _)) => {
                let mut value_end = rest.len();
                while let Some(&(idx, c)) = chars.peek() {
                    if c == ';' {
                        value_end = idx;
                        break;
                    }
                    chars.next();
                }
                let value = rest[value_start..value_end].trim();
                if !is_token(value) {
                    return Err(malformed());
                }
                value.to_string()
            }
            None => return Err(malformed()),
        };

        let name = name.to_ascii_lowercase();
        let value = if name == "charset" {
            value.to_ascii_lowercase()
        } else {
            value
        };
        params.insert(name, value);
    }
}
