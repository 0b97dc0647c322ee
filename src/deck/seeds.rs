//! Per-card rotation seed memoization
//!
//! Each card id gets a visual rotation angle exactly once, the first time it
//! is seen, and keeps it for the life of the process — reorders, session
//! restarts, and re-sightings all reuse the original value. When random
//! rotation is disabled every seed is zero.

use rand::Rng;
use std::collections::HashMap;

/// Rotation seeds fall in `[-SEED_SPREAD, SEED_SPREAD)` degrees
pub const SEED_SPREAD: f32 = 5.0;

/// Lazily-populated, never-overwritten map from card id to rotation angle
#[derive(Debug, Default)]
pub struct RotationSeeds {
    seeds: HashMap<String, f32>,
    random: bool,
}

impl RotationSeeds {
    /// Create a seed store; `random` controls whether seeds are nonzero
    pub fn new(random: bool) -> Self {
        Self {
            seeds: HashMap::new(),
            random,
        }
    }

    /// The seed for `id`, assigning it on first sight
    pub fn seed_for(&mut self, id: &str) -> f32 {
        if let Some(&seed) = self.seeds.get(id) {
            return seed;
        }
        let seed = if self.random {
            rand::thread_rng().gen_range(-SEED_SPREAD..SEED_SPREAD)
        } else {
            0.0
        };
        self.seeds.insert(id.to_string(), seed);
        seed
    }

    /// The seed for `id`, if one was ever assigned
    pub fn get(&self, id: &str) -> Option<f32> {
        self.seeds.get(id).copied()
    }

    /// Number of ids ever seen
    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    /// Whether no id has been seen yet
    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }
}
