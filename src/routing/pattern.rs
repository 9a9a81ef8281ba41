//! Path pattern compilation and matching.
//!
//! # Responsibilities
//! - Parse declared paths such as `/timeline/{framework}/{testType}`
//! - Support regex-constrained captures (`{uuid:[\w-]+}.json`)
//! - Support one trailing wildcard (`/assets/*`) spanning slashes
//! - Extract captured values into `PathParams`
//!
//! # Design Decisions
//! - Each segment compiles to an anchored regex at startup
//! - The path is split on `/` before matching, so a capture never crosses a
//!   segment boundary, whatever its constraint
//! - Equality is structural over the parsed segments, not the source text

use std::collections::HashSet;
use std::fmt;

use regex::Regex;
use thiserror::Error;

/// Constraint used by `{name}` captures without an explicit regex.
pub const DEFAULT_CONSTRAINT: &str = "[^/]+";

/// Name under which the trailing wildcard capture is exposed.
pub const WILDCARD_PARAM: &str = "*";

/// Error returned for an invalid path pattern.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("path pattern `{0}` must start with `/`")]
    MissingLeadingSlash(String),

    #[error("path pattern `{0}` has an unbalanced `{{` or `}}`")]
    UnbalancedBrace(String),

    #[error("path pattern `{pattern}` has an invalid capture name `{name}`")]
    InvalidName { pattern: String, name: String },

    #[error("path pattern `{pattern}` declares `{name}` more than once")]
    DuplicateName { pattern: String, name: String },

    #[error("path pattern `{0}` has a wildcard that is not the whole final segment")]
    MisplacedWildcard(String),

    #[error("path pattern `{pattern}` has an invalid constraint: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Piece {
    Literal(String),
    Capture { name: String, constraint: String },
    Wildcard,
}

/// A compiled, immutable path pattern.
#[derive(Clone)]
pub struct PathPattern {
    source: String,
    segments: Vec<Vec<Piece>>,
    matchers: Vec<SegmentMatcher>,
    wildcard: bool,
}

impl PathPattern {
    /// Compile a declared path.
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let Some(body) = source.strip_prefix('/') else {
            return Err(PatternError::MissingLeadingSlash(source.to_string()));
        };

        let raw_segments = split_segments(source, body)?;
        let last = raw_segments.len() - 1;
        let mut segments = Vec::with_capacity(raw_segments.len());
        let mut seen = HashSet::new();

        for (idx, raw) in raw_segments.iter().enumerate() {
            if *raw == WILDCARD_PARAM {
                if idx != last {
                    return Err(PatternError::MisplacedWildcard(source.to_string()));
                }
                segments.push(vec![Piece::Wildcard]);
                continue;
            }
            let pieces = parse_segment(source, raw)?;
            for piece in &pieces {
                if let Piece::Capture { name, .. } = piece {
                    if !seen.insert(name.clone()) {
                        return Err(PatternError::DuplicateName {
                            pattern: source.to_string(),
                            name: name.clone(),
                        });
                    }
                }
            }
            segments.push(pieces);
        }

        let mut matchers = Vec::with_capacity(segments.len());
        let mut wildcard = false;
        for pieces in &segments {
            if pieces.as_slice() == [Piece::Wildcard] {
                wildcard = true;
                continue;
            }
            matchers.push(SegmentMatcher::compile(source, pieces)?);
        }

        Ok(Self {
            source: source.to_string(),
            segments,
            matchers,
            wildcard,
        })
    }

    /// The path as declared.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match a request path, returning captured values on success.
    ///
    /// The path is split on `/` first, so a capture only ever sees its own
    /// segment whatever its constraint; only the wildcard spans slashes.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let body = path.strip_prefix('/')?;
        let parts: Vec<&str> = if self.wildcard {
            body.splitn(self.matchers.len() + 1, '/').collect()
        } else {
            body.split('/').collect()
        };
        let expected = self.matchers.len() + usize::from(self.wildcard);
        if parts.len() != expected {
            return None;
        }

        let mut values = Vec::new();
        for (matcher, part) in self.matchers.iter().zip(&parts) {
            matcher.capture(part, &mut values)?;
        }
        if self.wildcard {
            values.push((WILDCARD_PARAM.to_string(), parts[expected - 1].to_string()));
        }
        Some(PathParams { values })
    }
}

/// Anchored regex for one `/`-delimited segment.
#[derive(Clone)]
struct SegmentMatcher {
    regex: Regex,
    names: Vec<String>,
}

impl SegmentMatcher {
    fn compile(source: &str, pieces: &[Piece]) -> Result<Self, PatternError> {
        let mut expr = String::from("^");
        let mut names = Vec::new();
        for piece in pieces {
            match piece {
                Piece::Literal(text) => expr.push_str(&regex::escape(text)),
                Piece::Capture { name, constraint } => {
                    expr.push_str(&format!("(?P<p{}>(?:{}))", names.len(), constraint));
                    names.push(name.clone());
                }
                Piece::Wildcard => {
                    return Err(PatternError::MisplacedWildcard(source.to_string()));
                }
            }
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|source_err| PatternError::InvalidRegex {
            pattern: source.to_string(),
            source: source_err,
        })?;
        Ok(Self { regex, names })
    }

    fn capture(&self, segment: &str, values: &mut Vec<(String, String)>) -> Option<()> {
        let caps = self.regex.captures(segment)?;
        for (idx, name) in self.names.iter().enumerate() {
            if let Some(m) = caps.name(&format!("p{}", idx)) {
                values.push((name.clone(), m.as_str().to_string()));
            }
        }
        Some(())
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for PathPattern {}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathPattern").field(&self.source).finish()
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Values captured from the request path.
///
/// Inserted into the request extensions before the handler runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    values: Vec<(String, String)>,
}

impl PathParams {
    /// Value of a named capture, or of the wildcard under `"*"`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Split on `/` outside of braces; regex constraints may contain either.
fn split_segments<'a>(source: &str, body: &'a str) -> Result<Vec<&'a str>, PatternError> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| PatternError::UnbalancedBrace(source.to_string()))?;
            }
            '/' if depth == 0 => {
                segments.push(&body[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(PatternError::UnbalancedBrace(source.to_string()));
    }
    segments.push(&body[start..]);
    Ok(segments)
}

fn parse_segment(source: &str, raw: &str) -> Result<Vec<Piece>, PatternError> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '{' {
            literal.push(c);
            continue;
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(std::mem::take(&mut literal)));
        }

        // Braces were balanced by `split_segments`, so this finds the match.
        let mut depth = 1usize;
        let mut inner = String::new();
        for c in chars.by_ref() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            inner.push(c);
        }

        let (name, constraint) = match inner.split_once(':') {
            Some((name, constraint)) => (name.trim(), constraint.trim()),
            None => (inner.trim(), DEFAULT_CONSTRAINT),
        };
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(PatternError::InvalidName {
                pattern: source.to_string(),
                name: name.to_string(),
            });
        }
        pieces.push(Piece::Capture {
            name: name.to_string(),
            constraint: constraint.to_string(),
        });
    }

    if !literal.is_empty() || pieces.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    Ok(pieces)
}
