//! The stack engine and its host-facing handle
//!
//! All mutation flows through a single worker thread: commands arrive on a
//! bounded channel, the worker serializes ingestion pumps, deck edits, and
//! autoplay polls, and pushes events back on a second bounded channel. The
//! host keeps an [`EngineHandle`] for sending commands, draining events, and
//! taking consistent snapshots of shared state.
//!
//! Because every deck mutation happens on the worker thread, interleavings
//! like "autoplay fires while a record arrives" resolve in a definite order
//! and the deck's cycle invariant can never be observed half-applied.

mod worker;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};

use crate::config::EngineConfig;
use crate::deck::Deck;
use crate::error::{QuizStackError, Result};
use crate::ingest::ChunkSource;
use crate::types::{QuizRecord, StreamProgress};

use worker::EngineWorker;

const COMMAND_CHANNEL_CAPACITY: usize = 256;
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Commands the host sends to the engine worker
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    /// Begin (or restart) an ingestion session from the configured source
    StartIngestion,
    /// Stop the active ingestion session, keeping everything already loaded
    CancelIngestion,
    /// Advance the cycle: topmost card moves to the back
    Next,
    /// Reverse the cycle: back card returns to the top
    Prev,
    /// A drag gesture was released at this offset from its start
    DragRelease { dx: f32, dy: f32 },
    /// Pointer entered the stack area
    HoverEnter,
    /// Pointer left the stack area
    HoverLeave,
    /// Enable or disable autoplay
    SetAutoplay(bool),
    /// Change the autoplay interval, in milliseconds
    SetAutoplayDelay(u64),
    /// Stop the worker thread
    Shutdown,
}

/// Events the engine worker pushes to the host
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A record completed parsing and joined the deck
    RecordLoaded(QuizRecord),
    /// The deck order changed; carries the new back-to-top id order
    DeckChanged(Vec<String>),
    /// The stream was fully consumed
    IngestionComplete,
    /// The session ended on an error; prior records stand
    IngestionFailed(String),
    /// The worker has stopped
    Shutdown,
}

/// Lock a mutex, recovering the data from a poisoned lock
///
/// Worker panics must not wedge host snapshot queries, so poisoning is
/// swallowed and the inner value used as-is.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Records retained for the session, addressable by id and by arrival order
#[derive(Debug, Default)]
pub(crate) struct RecordLog {
    records: Vec<QuizRecord>,
    index: HashMap<String, usize>,
}

impl RecordLog {
    pub(crate) fn insert(&mut self, record: QuizRecord) -> bool {
        if self.index.contains_key(&record.id) {
            return false;
        }
        self.index.insert(record.id.clone(), self.records.len());
        self.records.push(record);
        true
    }

    pub(crate) fn get(&self, id: &str) -> Option<&QuizRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub(crate) fn all(&self) -> &[QuizRecord] {
        &self.records
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }
}

/// State shared between the worker thread and handle snapshot queries
#[derive(Debug)]
pub(crate) struct SharedState {
    pub(crate) deck: Mutex<Deck>,
    pub(crate) progress: Mutex<StreamProgress>,
    pub(crate) records: Mutex<RecordLog>,
}

impl SharedState {
    fn new(random_rotation: bool) -> Self {
        Self {
            deck: Mutex::new(Deck::new(random_rotation)),
            progress: Mutex::new(StreamProgress::default()),
            records: Mutex::new(RecordLog::default()),
        }
    }
}

/// The engine itself; consumed by [`run`](StackEngine::run) on a worker thread
pub struct StackEngine {
    worker: EngineWorker,
    running: Arc<AtomicBool>,
}

impl StackEngine {
    /// Build an engine over `source` and return it with its host handle
    pub fn new(
        config: EngineConfig,
        source: Box<dyn ChunkSource>,
    ) -> Result<(Self, EngineHandle)> {
        let path = config.validate()?;
        let (command_tx, command_rx) = bounded(COMMAND_CHANNEL_CAPACITY);
        let (event_tx, event_rx) = bounded(EVENT_CHANNEL_CAPACITY);
        let shared = Arc::new(SharedState::new(config.random_rotation));
        let running = Arc::new(AtomicBool::new(true));

        let worker = EngineWorker::new(
            config,
            path,
            source,
            command_rx,
            event_tx,
            Arc::clone(&running),
            Arc::clone(&shared),
        );
        let handle = EngineHandle {
            command_tx,
            event_rx,
            shared,
            running: Arc::clone(&running),
        };
        Ok((Self { worker, running }, handle))
    }

    /// Run the worker loop until shutdown; call from a dedicated thread
    pub fn run(mut self) {
        self.worker.run();
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Host-side handle: command senders, event receiver, snapshot queries
#[derive(Clone)]
pub struct EngineHandle {
    command_tx: Sender<EngineCommand>,
    event_rx: Receiver<EngineEvent>,
    shared: Arc<SharedState>,
    running: Arc<AtomicBool>,
}

impl EngineHandle {
    /// Whether the worker loop is still alive
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Send a raw command to the worker
    pub fn send(&self, command: EngineCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|e| QuizStackError::Channel(format!("Failed to send command: {e}")))
    }

    pub fn start_ingestion(&self) -> Result<()> {
        self.send(EngineCommand::StartIngestion)
    }

    pub fn cancel_ingestion(&self) -> Result<()> {
        self.send(EngineCommand::CancelIngestion)
    }

    pub fn next(&self) -> Result<()> {
        self.send(EngineCommand::Next)
    }

    pub fn prev(&self) -> Result<()> {
        self.send(EngineCommand::Prev)
    }

    pub fn drag_release(&self, dx: f32, dy: f32) -> Result<()> {
        self.send(EngineCommand::DragRelease { dx, dy })
    }

    pub fn hover_enter(&self) -> Result<()> {
        self.send(EngineCommand::HoverEnter)
    }

    pub fn hover_leave(&self) -> Result<()> {
        self.send(EngineCommand::HoverLeave)
    }

    pub fn set_autoplay(&self, enabled: bool) -> Result<()> {
        self.send(EngineCommand::SetAutoplay(enabled))
    }

    pub fn set_autoplay_delay_ms(&self, delay_ms: u64) -> Result<()> {
        self.send(EngineCommand::SetAutoplayDelay(delay_ms))
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(EngineCommand::Shutdown)
    }

    /// Next pending event, if any
    pub fn try_recv_event(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Block for the next event up to `timeout`
    pub fn recv_event_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> std::result::Result<EngineEvent, RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }

    /// Current deck order, back first, topmost last
    pub fn deck_snapshot(&self) -> Vec<String> {
        lock(&self.shared.deck).ids()
    }

    /// Number of cards in the deck
    pub fn deck_len(&self) -> usize {
        lock(&self.shared.deck).len()
    }

    /// Id of the topmost card, if the deck is nonempty
    pub fn topmost_id(&self) -> Option<String> {
        lock(&self.shared.deck).topmost_id().map(str::to_string)
    }

    /// The rotation angle assigned to a card, if it has ever been dealt
    pub fn rotation_seed(&self, id: &str) -> Option<f32> {
        lock(&self.shared.deck).rotation_seed(id)
    }

    /// Snapshot of ingestion progress
    pub fn ingestion_progress(&self) -> StreamProgress {
        *lock(&self.shared.progress)
    }

    /// A loaded record by id
    pub fn record(&self, id: &str) -> Option<QuizRecord> {
        lock(&self.shared.records).get(id).cloned()
    }

    /// Every record loaded this session, in arrival order
    pub fn records(&self) -> Vec<QuizRecord> {
        lock(&self.shared.records).all().to_vec()
    }

    /// Number of records loaded this session
    pub fn record_count(&self) -> usize {
        lock(&self.shared.records).len()
    }
}
