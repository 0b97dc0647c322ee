//! # QuizStack-RS: Streaming Quiz Card Deck Engine
//!
//! An engine for browsing a deck of quiz cards while the deck is still
//! arriving. Records stream in as chunked JSON, become cards the instant
//! their closing delimiter is parsed, and join a cyclic stack the user can
//! rotate, flick through with gestures, or let autoplay cycle on a timer.
//!
//! ## Architecture
//!
//! - **Parser**: character-incremental JSON boundary scanner that emits each
//!   record at an extraction path the moment it completes
//! - **Ingest**: chunk sources plus a paced driver with at-most-once
//!   delivery and cancel-before-next-chunk semantics
//! - **Deck**: ordered cycle of card ids with rotate/promote/demote and
//!   reconciliation against the ingested order
//! - **Engine**: single worker thread serializing all mutation, talking to
//!   the host over crossbeam channels
//!
//! ## Example
//!
//! ```ignore
//! use quizstack_rs::{
//!     config::EngineConfig,
//!     engine::{EngineEvent, StackEngine},
//!     ingest::PerCharSource,
//! };
//!
//! fn main() -> anyhow::Result<()> {
//!     let payload = std::fs::read_to_string("quizzes.json")?;
//!     let source = Box::new(PerCharSource::new(payload));
//!     let (engine, handle) = StackEngine::new(EngineConfig::default(), source)?;
//!
//!     std::thread::spawn(move || engine.run());
//!     handle.start_ingestion()?;
//!
//!     loop {
//!         match handle.recv_event_timeout(std::time::Duration::from_secs(5))? {
//!             EngineEvent::RecordLoaded(record) => println!("{}", record.question),
//!             EngineEvent::IngestionComplete => break,
//!             _ => {}
//!         }
//!     }
//!     handle.shutdown()?;
//!     Ok(())
//! }
//! ```

pub mod autoplay;
pub mod config;
pub mod deck;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod ingest;
pub mod parser;
pub mod types;

pub use config::EngineConfig;
pub use engine::{EngineCommand, EngineEvent, EngineHandle, StackEngine};
pub use error::{QuizStackError, Result};
pub use types::{QuizRecord, StreamProgress};
