//! Incremental record boundary parsing
//!
//! This module turns a growing character stream into discrete quiz records
//! without ever re-parsing from the start. The stream is a JSON document;
//! records live at a configured [`ExtractionPath`] (for example `quizzes.*`,
//! every element of the array under the top-level `quizzes` key).
//!
//! # How it works
//!
//! [`BoundaryParser`] runs a structural scanner over every character it is
//! fed: object/array nesting, key/value alternation, string escapes. When a
//! value *starts* at a position whose path matches the extraction path, the
//! scanner begins capturing the raw text of that value; the moment the
//! value's closing delimiter is consumed, the captured span is deserialized
//! with `serde_json` and emitted. Chunk boundaries can fall anywhere —
//! inside string literals, escapes, numbers, or nested structures — because
//! all scanner state persists between [`feed`](BoundaryParser::feed) calls.
//!
//! A structural error poisons the parser: ingestion for that session is
//! over, but records emitted before the error remain valid.

pub mod boundary;
pub mod path;

pub use boundary::BoundaryParser;
pub use path::ExtractionPath;

use thiserror::Error;

/// Errors produced by the incremental parser
#[derive(Error, Debug)]
pub enum ParseError {
    /// The stream violated JSON structure
    #[error("unexpected character {found:?} at byte {pos}")]
    Unexpected { pos: usize, found: char },

    /// Input continued after the top-level value closed
    #[error("trailing data after the top-level value at byte {pos}")]
    TrailingData { pos: usize },

    /// A captured element did not deserialize into a quiz record
    #[error("element at byte {pos} is not a valid quiz record: {source}")]
    InvalidRecord {
        pos: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The extraction path string could not be parsed
    #[error("invalid extraction path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// A previous feed already failed; the stream is unrecoverable
    #[error("parser already failed, stream aborted")]
    Poisoned,
}
