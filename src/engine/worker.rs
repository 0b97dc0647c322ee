//! Engine worker thread
//!
//! One loop iteration: drain pending commands, pump ingestion for chunks
//! that have come due, poll autoplay, then sleep until the earliest of the
//! next chunk deadline and the autoplay deadline. Every deck mutation
//! happens here, on this thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::autoplay::AutoplayScheduler;
use crate::config::EngineConfig;
use crate::engine::{lock, EngineCommand, EngineEvent, SharedState};
use crate::gesture::interpret_release;
use crate::ingest::{ChunkSource, IngestionDriver};
use crate::parser::ExtractionPath;
use crate::types::{GestureOutcome, ReleaseOffset};

/// Cap on one sleep so fresh commands are picked up promptly
const MAX_IDLE_WAIT: Duration = Duration::from_millis(20);

pub(crate) struct EngineWorker {
    config: EngineConfig,
    source: Box<dyn ChunkSource>,
    driver: IngestionDriver,
    autoplay: AutoplayScheduler,
    /// Ids in first-arrival order for the current session; the deck is
    /// reconciled against this after every pump
    ingested_order: Vec<String>,
    command_rx: Receiver<EngineCommand>,
    event_tx: Sender<EngineEvent>,
    running: Arc<AtomicBool>,
    shared: Arc<SharedState>,
}

impl EngineWorker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        config: EngineConfig,
        path: ExtractionPath,
        source: Box<dyn ChunkSource>,
        command_rx: Receiver<EngineCommand>,
        event_tx: Sender<EngineEvent>,
        running: Arc<AtomicBool>,
        shared: Arc<SharedState>,
    ) -> Self {
        let driver = IngestionDriver::new(path, Duration::from_millis(config.chunk_pace_ms));
        let autoplay = AutoplayScheduler::new(
            config.autoplay,
            Duration::from_millis(config.autoplay_delay_ms),
        );
        Self {
            config,
            source,
            driver,
            autoplay,
            ingested_order: Vec::new(),
            command_rx,
            event_tx,
            running,
            shared,
        }
    }

    pub(crate) fn run(&mut self) {
        tracing::info!("Engine worker started");
        while self.running.load(Ordering::SeqCst) {
            self.process_commands();
            if !self.running.load(Ordering::SeqCst) {
                break;
            }
            let now = Instant::now();
            self.pump_ingestion(now);
            self.poll_autoplay(now);
            self.idle_wait();
        }
        let _ = self.event_tx.send(EngineEvent::Shutdown);
        tracing::info!("Engine worker stopped");
    }

    fn process_commands(&mut self) {
        loop {
            match self.command_rx.try_recv() {
                Ok(command) => self.handle_command(command),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::debug!("Command channel disconnected, stopping worker");
                    self.running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    }

    fn handle_command(&mut self, command: EngineCommand) {
        tracing::trace!(?command, "Handling command");
        match command {
            EngineCommand::StartIngestion => self.start_session(),
            EngineCommand::CancelIngestion => {
                self.driver.cancel();
                self.sync_progress();
                tracing::info!("Ingestion cancelled");
            }
            EngineCommand::Next => {
                let changed = lock(&self.shared.deck).rotate_forward();
                if changed {
                    self.emit_deck_changed();
                }
            }
            EngineCommand::Prev => {
                let changed = lock(&self.shared.deck).rotate_backward();
                if changed {
                    self.emit_deck_changed();
                }
            }
            EngineCommand::DragRelease { dx, dy } => {
                let offset = ReleaseOffset::new(dx, dy);
                match interpret_release(offset, self.config.sensitivity) {
                    GestureOutcome::Dismiss => self.demote_topmost("gesture"),
                    GestureOutcome::SnapBack => {
                        tracing::trace!(?offset, "Release within threshold, snapping back");
                    }
                }
            }
            EngineCommand::HoverEnter => {
                if self.config.pause_on_hover {
                    self.autoplay.pause();
                }
            }
            EngineCommand::HoverLeave => {
                if self.config.pause_on_hover {
                    self.autoplay.resume();
                }
            }
            EngineCommand::SetAutoplay(enabled) => {
                self.autoplay.set_enabled(enabled);
                tracing::debug!(enabled, "Autoplay toggled");
            }
            EngineCommand::SetAutoplayDelay(delay_ms) => {
                if delay_ms == 0 {
                    tracing::warn!("Ignoring zero autoplay delay");
                } else {
                    self.autoplay
                        .set_interval(Duration::from_millis(delay_ms), Instant::now());
                }
            }
            EngineCommand::Shutdown => {
                tracing::info!("Shutdown requested");
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Reset per-session state and open the source
    fn start_session(&mut self) {
        tracing::info!("Starting ingestion session");
        let had_entries = {
            let mut deck = lock(&self.shared.deck);
            let had = !deck.is_empty();
            deck.clear_entries();
            had
        };
        lock(&self.shared.records).clear();
        self.ingested_order.clear();

        if let Err(err) = self.driver.start(&mut *self.source, Instant::now()) {
            tracing::error!(error = %err, "Failed to start ingestion");
            let _ = self
                .event_tx
                .send(EngineEvent::IngestionFailed(err.to_string()));
        }
        self.sync_progress();
        if had_entries {
            self.emit_deck_changed();
        }
    }

    fn pump_ingestion(&mut self, now: Instant) {
        if !self.driver.is_active() {
            return;
        }
        let outcome = self.driver.pump(&mut *self.source, now);
        if !outcome.records.is_empty() {
            let deck_changed = {
                let mut records = lock(&self.shared.records);
                for record in &outcome.records {
                    self.ingested_order.push(record.id.clone());
                    records.insert(record.clone());
                }
                drop(records);
                lock(&self.shared.deck).reconcile(&self.ingested_order)
            };
            for record in outcome.records {
                tracing::debug!(id = %record.id, "Record loaded");
                self.try_send_event(EngineEvent::RecordLoaded(record));
            }
            if deck_changed {
                self.emit_deck_changed();
            }
        }
        self.sync_progress();
        if let Some(err) = outcome.failure {
            tracing::error!(error = %err, "Ingestion failed");
            let _ = self
                .event_tx
                .send(EngineEvent::IngestionFailed(err.to_string()));
        } else if outcome.completed {
            tracing::info!(records = self.ingested_order.len(), "Ingestion complete");
            let _ = self.event_tx.send(EngineEvent::IngestionComplete);
        }
    }

    fn poll_autoplay(&mut self, now: Instant) {
        let deck_len = lock(&self.shared.deck).len();
        self.autoplay.sync(deck_len, now);
        if self.autoplay.poll(now) {
            self.demote_topmost("autoplay");
        }
    }

    fn demote_topmost(&mut self, trigger: &str) {
        let (id, changed) = {
            let mut deck = lock(&self.shared.deck);
            let Some(id) = deck.topmost_id().map(str::to_string) else {
                return;
            };
            let changed = deck.demote(&id);
            (id, changed)
        };
        if changed {
            tracing::debug!(%id, trigger, "Card demoted");
            self.emit_deck_changed();
        }
    }

    fn sync_progress(&self) {
        *lock(&self.shared.progress) = self.driver.progress();
    }

    fn emit_deck_changed(&self) {
        let snapshot = lock(&self.shared.deck).ids();
        self.try_send_event(EngineEvent::DeckChanged(snapshot));
    }

    /// Per-record and deck-order events are droppable under backpressure;
    /// shared-state snapshots remain authoritative
    fn try_send_event(&self, event: EngineEvent) {
        if self.event_tx.try_send(event).is_err() {
            tracing::trace!("Event channel full, dropping event");
        }
    }

    fn idle_wait(&self) {
        let now = Instant::now();
        let mut deadline = self.driver.next_due();
        if let Some(fire) = self.autoplay.next_deadline() {
            deadline = Some(deadline.map_or(fire, |d| d.min(fire)));
        }
        let wait = match deadline {
            Some(deadline) => deadline.saturating_duration_since(now).min(MAX_IDLE_WAIT),
            None => MAX_IDLE_WAIT,
        };
        if wait.is_zero() {
            std::thread::yield_now();
        } else {
            std::thread::sleep(wait);
        }
    }
}
