//! Ingestion driver
//!
//! Owns one ingestion session at a time: the incremental parser, the set of
//! record ids already delivered, the pacing deadline, and the progress
//! snapshot. The engine worker pumps the driver from its loop; the driver
//! never spawns anything and never blocks.
//!
//! Delivery guarantees:
//! - a record id is surfaced at most once per session, duplicates are
//!   dropped at this layer before the deck ever sees them
//! - `cancel` takes effect before the next chunk; nothing already delivered
//!   is retracted, and progress freezes at its last value
//! - a parse failure ends the session; records surfaced before the failure
//!   stand

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::error::{QuizStackError, Result, ResultExt};
use crate::ingest::source::ChunkSource;
use crate::parser::{BoundaryParser, ExtractionPath};
use crate::types::{QuizRecord, StreamProgress};

/// Upper bound on chunks consumed in a single pump, so an unpaced session
/// cannot starve command processing in the worker loop
const MAX_CHUNKS_PER_PUMP: usize = 256;

/// What one pump produced
///
/// A failure does not void the records surfaced before it in the same pump;
/// they are delivered alongside it.
#[derive(Debug, Default)]
pub struct PumpOutcome {
    /// Newly completed records, in stream order, duplicates already removed
    pub records: Vec<QuizRecord>,
    /// The source was exhausted during this pump
    pub completed: bool,
    /// The parse error that ended the session, if one occurred
    pub failure: Option<QuizStackError>,
}

/// Single-session ingestion state machine
#[derive(Debug)]
pub struct IngestionDriver {
    path: ExtractionPath,
    pace: Duration,
    parser: BoundaryParser,
    seen_ids: HashSet<String>,
    progress: StreamProgress,
    active: bool,
    next_chunk_at: Instant,
}

impl IngestionDriver {
    /// Create an idle driver; `pace` of zero means unpaced batch draining
    pub fn new(path: ExtractionPath, pace: Duration) -> Self {
        Self {
            parser: BoundaryParser::new(path.clone()),
            path,
            pace,
            seen_ids: HashSet::new(),
            progress: StreamProgress::default(),
            active: false,
            next_chunk_at: Instant::now(),
        }
    }

    /// Begin a fresh session, rewinding the source and resetting all state
    pub fn start(&mut self, source: &mut dyn ChunkSource, now: Instant) -> Result<()> {
        source.open().context("Failed to open chunk source")?;
        self.parser = BoundaryParser::new(self.path.clone());
        self.seen_ids.clear();
        self.progress = StreamProgress {
            bytes_consumed: 0,
            total_bytes_expected: source.len_hint(),
            complete: false,
        };
        self.active = true;
        self.next_chunk_at = now;
        Ok(())
    }

    /// Stop consuming; effective before the next chunk, progress frozen
    pub fn cancel(&mut self) {
        self.active = false;
    }

    /// Whether a session is consuming chunks
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Snapshot of the current session's progress
    pub fn progress(&self) -> StreamProgress {
        self.progress
    }

    /// When the next chunk is due, while a session is active
    pub fn next_due(&self) -> Option<Instant> {
        self.active.then_some(self.next_chunk_at)
    }

    /// Consume every chunk due at `now` and return completed records
    ///
    /// With a nonzero pace at most one chunk is due per deadline; unpaced
    /// sessions drain up to [`MAX_CHUNKS_PER_PUMP`] chunks per call. A parse
    /// failure deactivates the session.
    pub fn pump(&mut self, source: &mut dyn ChunkSource, now: Instant) -> PumpOutcome {
        let mut outcome = PumpOutcome::default();
        let mut budget = MAX_CHUNKS_PER_PUMP;

        while self.active && budget > 0 && now >= self.next_chunk_at {
            budget -= 1;
            let Some(chunk) = source.next_chunk() else {
                self.progress.complete = true;
                self.active = false;
                outcome.completed = true;
                break;
            };
            self.progress.bytes_consumed += chunk.len();
            let records = match self.parser.feed(&chunk) {
                Ok(records) => records,
                Err(err) => {
                    self.active = false;
                    outcome.failure = Some(err.into());
                    break;
                }
            };
            for record in records {
                if self.seen_ids.insert(record.id.clone()) {
                    outcome.records.push(record);
                } else {
                    tracing::debug!(id = %record.id, "Dropping duplicate record");
                }
            }
            if !self.pace.is_zero() {
                self.next_chunk_at = now + self.pace;
            }
        }
        outcome
    }
}
