//! Extraction path parsing and matching
//!
//! An extraction path names where in the streamed document the records live.
//! It is a dotted sequence of segments; `*` matches any single key or array
//! index. A leading `$.` (JSONPath flavor) is accepted and stripped, so
//! `$.quizzes.*` and `quizzes.*` are equivalent.

use super::ParseError;

/// One segment of an extraction path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Matches an object key with exactly this name, or an array index when
    /// the name is that index's decimal form
    Key(String),
    /// Matches any single key or index
    Wildcard,
}

/// A parsed, validated extraction path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPath {
    segments: Vec<PathSegment>,
}

/// The location of a value inside the document, as seen by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueSegment<'a> {
    /// Value sits under this object key
    Key(&'a str),
    /// Value is this element of an array
    Index(usize),
}

impl ExtractionPath {
    /// Parse a dotted path string
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let invalid = |reason: &str| ParseError::InvalidPath {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = raw.strip_prefix("$.").unwrap_or(raw);
        if trimmed.is_empty() {
            return Err(invalid("path must contain at least one segment"));
        }

        let mut segments = Vec::new();
        for part in trimmed.split('.') {
            match part {
                "" => return Err(invalid("empty segment")),
                "*" => segments.push(PathSegment::Wildcard),
                key => segments.push(PathSegment::Key(key.to_string())),
            }
        }
        Ok(Self { segments })
    }

    /// Number of segments in the path
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the path has no segments (never true for a parsed path)
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether a value at `location` is selected by this path
    pub(crate) fn matches(&self, location: &[ValueSegment<'_>]) -> bool {
        if location.len() != self.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(location)
            .all(|(pattern, actual)| match (pattern, actual) {
                (PathSegment::Wildcard, _) => true,
                (PathSegment::Key(want), ValueSegment::Key(got)) => want == got,
                (PathSegment::Key(want), ValueSegment::Index(idx)) => {
                    want.parse::<usize>() == Ok(*idx)
                }
            })
    }
}

impl std::fmt::Display for ExtractionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            match segment {
                PathSegment::Key(key) => write!(f, "{}", key)?,
                PathSegment::Wildcard => write!(f, "*")?,
            }
        }
        Ok(())
    }
}
