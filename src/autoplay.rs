//! Autoplay scheduling
//!
//! Timer-driven demotion of the topmost card. The scheduler is poll-driven:
//! the engine worker calls [`sync`](AutoplayScheduler::sync) and
//! [`poll`](AutoplayScheduler::poll) from its single loop, so there is
//! exactly one deadline in existence at any time and two concurrent timers
//! cannot happen. Re-arming (enable, resume, interval change, deck growth
//! past one card) always starts a fresh full interval and never fires
//! immediately.
//!
//! Phase machine: `Idle -> Running` when enabled, unpaused, and the deck has
//! more than one card; `Running <-> Paused` on pause/resume; anything
//! `-> Idle` when disabled or the deck shrinks to one card or fewer.

use std::time::{Duration, Instant};

/// Where the scheduler currently is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoplayPhase {
    /// Disabled, or too few cards to cycle
    #[default]
    Idle,
    /// Armed with a live deadline
    Running,
    /// Eligible but paused by the host
    Paused,
}

/// Poll-driven autoplay state machine
#[derive(Debug)]
pub struct AutoplayScheduler {
    enabled: bool,
    paused: bool,
    interval: Duration,
    phase: AutoplayPhase,
    /// The single live deadline; `Some` exactly while Running
    next_fire: Option<Instant>,
}

impl AutoplayScheduler {
    /// Create a scheduler; it arms itself via `sync` once conditions hold
    pub fn new(enabled: bool, interval: Duration) -> Self {
        Self {
            enabled,
            paused: false,
            interval,
            phase: AutoplayPhase::Idle,
            next_fire: None,
        }
    }

    /// Current phase
    pub fn phase(&self) -> AutoplayPhase {
        self.phase
    }

    /// Whether a deadline is currently armed
    pub fn is_running(&self) -> bool {
        self.phase == AutoplayPhase::Running
    }

    /// Enable or disable autoplay; takes effect on the next `sync`
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Change the interval, tearing down and re-arming the one deadline
    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.interval = interval;
        if self.phase == AutoplayPhase::Running {
            self.next_fire = Some(now + interval);
        }
    }

    /// Pause; the in-flight interval is discarded
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume; the next `sync` arms a fresh full interval
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Reconcile the phase with the current deck size
    ///
    /// Called every worker iteration. Transitions into Running arm a fresh
    /// deadline; transitions out drop it.
    pub fn sync(&mut self, deck_len: usize, now: Instant) {
        let desired = if !self.enabled || deck_len <= 1 {
            AutoplayPhase::Idle
        } else if self.paused {
            AutoplayPhase::Paused
        } else {
            AutoplayPhase::Running
        };

        if desired == self.phase {
            return;
        }
        self.next_fire = match desired {
            AutoplayPhase::Running => Some(now + self.interval),
            _ => None,
        };
        self.phase = desired;
    }

    /// Whether a demote should happen now; re-arms on fire
    ///
    /// Fires at most once per call even if several intervals elapsed, so a
    /// stalled worker never bursts through the deck.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.phase != AutoplayPhase::Running {
            return false;
        }
        match self.next_fire {
            Some(deadline) if now >= deadline => {
                self.next_fire = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    /// The live deadline, for the worker's sleep calculation
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.phase == AutoplayPhase::Running {
            self.next_fire
        } else {
            None
        }
    }
}
