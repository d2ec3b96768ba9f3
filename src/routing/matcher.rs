//! Path pattern matching.
//!
//! # Responsibilities
//! - Parse a registered path pattern into segments
//! - Compare a request path against a pattern segment by segment
//! - Extract parameter values
//!
//! # Design Decisions
//! - Segment counts must be equal: no prefix matches, no trailing-slash
//!   normalisation (`/a/` has a second, empty segment)
//! - Parameter values are passed through raw (no percent-decoding)
//! - Purely literal patterns take a string-equality fast path
//! - No regex in hot path

use std::collections::hash_map;
use std::collections::HashMap;
use std::fmt;

use crate::routing::error::PatternError;

/// One `/`-delimited unit of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the request segment.
    Literal(String),
    /// `:name`, captures the request segment.
    Param(String),
    /// `*`, matches any single segment without capturing.
    Wildcard,
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if raw == "*" {
            Segment::Wildcard
        } else if let Some(name) = raw.strip_prefix(':') {
            Segment::Param(name.to_string())
        } else {
            Segment::Literal(raw.to_string())
        }
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Segment::Literal(expected) => expected == value,
            Segment::Param(_) | Segment::Wildcard => true,
        }
    }
}

/// Parameters captured by a successful match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(HashMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.0.iter()
    }

    pub(crate) fn insert(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), value.to_string());
    }

    pub fn into_inner(self) -> HashMap<String, String> {
        self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A parsed path pattern such as `/users/:uid/posts/:pid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
    dynamic: bool,
}

impl PathPattern {
    /// Parse and validate a pattern.
    ///
    /// Rejected: empty input, a missing leading `/`, interior empty segments
    /// (`/a//b`), unnamed parameters (`/a/:`) and repeated parameter names.
    /// The root pattern `/` and a single trailing slash (`/a/`) are literal
    /// shapes and are accepted.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }
        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(PatternError::MissingLeadingSlash(pattern.to_string()));
        };

        let raw_segments: Vec<&str> = rest.split('/').collect();
        let last = raw_segments.len() - 1;
        let mut segments = Vec::with_capacity(raw_segments.len());
        let mut seen: Vec<&str> = Vec::new();

        for (position, raw) in raw_segments.iter().copied().enumerate() {
            if raw.is_empty() && position != last {
                return Err(PatternError::EmptySegment {
                    pattern: pattern.to_string(),
                    position,
                });
            }
            let segment = Segment::parse(raw);
            if let Segment::Param(name) = &segment {
                if name.is_empty() {
                    return Err(PatternError::UnnamedParameter {
                        pattern: pattern.to_string(),
                        position,
                    });
                }
                if seen.contains(&name.as_str()) {
                    return Err(PatternError::DuplicateParameter {
                        pattern: pattern.to_string(),
                        name: name.clone(),
                    });
                }
                seen.push(&raw[1..]);
            }
            segments.push(segment);
        }

        let dynamic = segments.iter().any(|s| !matches!(s, Segment::Literal(_)));
        Ok(Self {
            raw: pattern.to_string(),
            segments,
            dynamic,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True if the pattern has a parameter or wildcard segment.
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Match a request path.
    ///
    /// Returns `None` on no match, otherwise the captured parameters (empty
    /// when the pattern has no parameter segments).
    pub fn matches(&self, path: &str) -> Option<Params> {
        if !self.dynamic {
            return (self.raw == path).then(Params::new);
        }
        self.match_segments(path)
    }

    fn match_segments(&self, path: &str) -> Option<Params> {
        let rest = path.strip_prefix('/')?;
        let values: Vec<&str> = rest.split('/').collect();
        if values.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (segment, value) in self.segments.iter().zip(values) {
            if !segment.matches(value) {
                return None;
            }
            if let Segment::Param(name) = segment {
                params.insert(name, value);
            }
        }
        Some(params)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
