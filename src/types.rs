//! Core data types for the quizstack engine
//!
//! This module contains the fundamental data structures shared between the
//! ingestion pipeline, the deck, and the host-facing engine surface.
//!
//! # Main Types
//!
//! - [`QuizRecord`] - A single quiz card as it arrives from the stream
//! - [`StreamProgress`] - How far ingestion has advanced through the stream
//! - [`DeckEntry`] - A card's position-independent identity within the deck
//! - [`ReleaseOffset`] / [`GestureOutcome`] - The drag-release contract
//!
//! # Identity
//!
//! A record's identity is its `id` string. Two records with the same id are
//! the same logical entity: the ingestion driver delivers each id at most
//! once, and the deck never holds two entries for one id.

use serde::{Deserialize, Serialize};

/// A quiz card record, immutable once emitted by the parser
///
/// Unknown fields in the stream are tolerated and dropped; only the four
/// fields below are retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRecord {
    /// Unique, stable identity of the record
    pub id: String,
    /// Question text
    pub question: String,
    /// Ordered answer options (well-formed data has at least one)
    pub options: Vec<String>,
    /// The correct answer
    pub answer: String,
}

/// Ingestion progress through the current stream session
///
/// Monotonic within a session: `bytes_consumed` never decreases and
/// `complete` transitions false to true exactly once. A new session resets
/// the whole struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamProgress {
    /// Raw bytes of the stream consumed so far
    pub bytes_consumed: usize,
    /// Total bytes the source expects to deliver, when known up front
    pub total_bytes_expected: Option<usize>,
    /// Whether the source has been fully drained
    pub complete: bool,
}

impl StreamProgress {
    /// Fraction of the stream consumed, when the total is known
    pub fn fraction(&self) -> Option<f64> {
        self.total_bytes_expected.map(|total| {
            if total == 0 {
                1.0
            } else {
                self.bytes_consumed as f64 / total as f64
            }
        })
    }
}

/// One card's slot in the deck
///
/// The rotation seed is assigned once per id on first insertion and stays
/// stable for the life of the process, even if the entry is reordered
/// arbitrarily or re-enters after a session restart.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckEntry {
    /// Record id this entry stands for
    pub id: String,
    /// Memoized visual rotation angle in degrees, zero when random rotation
    /// is disabled
    pub rotation_seed: f32,
    /// Monotonic counter value from when the entry was first created
    pub insertion_order: u64,
}

/// A drag release vector reported by the host's gesture layer
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReleaseOffset {
    /// Horizontal displacement at release
    pub dx: f32,
    /// Vertical displacement at release
    pub dy: f32,
}

impl ReleaseOffset {
    /// Create a release offset from its components
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

/// Outcome of interpreting a drag release against the sensitivity threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// The card was flung far enough: demote it to the back of the deck
    Dismiss,
    /// The card snaps back to its origin; the deck is untouched
    SnapBack,
}
