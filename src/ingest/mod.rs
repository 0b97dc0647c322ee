//! Ingestion: chunk sources and the drive loop
//!
//! The stream is abstracted behind the [`ChunkSource`] capability so the
//! engine works the same whether chunks come from a simulated per-character
//! feed, a file, or a network socket. The [`IngestionDriver`] owns the
//! session state: it paces chunks, feeds the parser, tracks
//! [`StreamProgress`](crate::types::StreamProgress), and enforces
//! at-most-once delivery per record id.
//!
//! # Components
//!
//! - [`ChunkSource`] - restartable, cancellable lazy sequence of fragments
//! - [`PerCharSource`] - delivers a payload one character at a time (the
//!   simulated streaming feed from the reference system)
//! - [`FixedChunkSource`] - delivers a payload in fixed-size pieces
//! - [`IngestionDriver`] - session state machine pumped by the engine worker

pub mod driver;
pub mod source;

pub use driver::{IngestionDriver, PumpOutcome};
pub use source::{ChunkSource, FixedChunkSource, PerCharSource};
