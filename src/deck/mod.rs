//! The cyclic card deck
//!
//! An order-preserving, duplicate-free sequence of card entries. Index 0 is
//! the back of the physical stack; the last index is the topmost, currently
//! interactable card. Every operation is a silent no-op when it cannot apply
//! (empty deck, single entry, unknown id) — commands race ingestion and may
//! legitimately arrive for cards that are not there yet.
//!
//! # Ordering rules
//!
//! - `append`/`reconcile` add new cards on the topmost side, in arrival
//!   order, without disturbing existing entries.
//! - `rotate_forward` moves the topmost card to the back; `rotate_backward`
//!   is its exact inverse. `demote(topmost)` and `rotate_forward` coincide.
//! - Entries are never removed within a session; cards cycle, they do not
//!   expire.

pub mod seeds;

pub use seeds::RotationSeeds;

use crate::types::DeckEntry;

/// The mutable deck of cards
#[derive(Debug)]
pub struct Deck {
    /// Back of the stack first, topmost card last
    entries: Vec<DeckEntry>,
    seeds: RotationSeeds,
    next_insertion: u64,
}

impl Deck {
    /// Create an empty deck
    pub fn new(random_rotation: bool) -> Self {
        Self {
            entries: Vec::new(),
            seeds: RotationSeeds::new(random_rotation),
            next_insertion: 0,
        }
    }

    /// Number of cards in the deck
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the deck has no cards
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, back to top
    pub fn entries(&self) -> &[DeckEntry] {
        &self.entries
    }

    /// All ids, back to top
    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }

    /// Id of the topmost card, if any
    pub fn topmost_id(&self) -> Option<&str> {
        self.entries.last().map(|e| e.id.as_str())
    }

    /// Whether an entry for `id` exists
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// The memoized rotation seed for `id`, if it was ever appended
    pub fn rotation_seed(&self, id: &str) -> Option<f32> {
        self.seeds.get(id)
    }

    /// Add a new card on the topmost side; no-op if the id is present
    ///
    /// Returns whether the deck changed. The rotation seed is assigned here,
    /// exactly once per id for the life of the process.
    pub fn append(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        let rotation_seed = self.seeds.seed_for(id);
        self.entries.push(DeckEntry {
            id: id.to_string(),
            rotation_seed,
            insertion_order: self.next_insertion,
        });
        self.next_insertion += 1;
        true
    }

    /// Move the topmost card to the back; no-op below two cards
    pub fn rotate_forward(&mut self) -> bool {
        if self.entries.len() <= 1 {
            return false;
        }
        let top = self.entries.pop().expect("len checked above");
        self.entries.insert(0, top);
        true
    }

    /// Move the back card to the top; inverse of [`rotate_forward`](Self::rotate_forward)
    pub fn rotate_backward(&mut self) -> bool {
        if self.entries.len() <= 1 {
            return false;
        }
        let back = self.entries.remove(0);
        self.entries.push(back);
        true
    }

    /// Move `id` to the topmost position; no-op if absent or already there
    pub fn promote(&mut self, id: &str) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        if index == self.entries.len() - 1 {
            return false;
        }
        let entry = self.entries.remove(index);
        self.entries.push(entry);
        true
    }

    /// Move `id` to the back; no-op if absent or already there
    ///
    /// This is the operation behind gesture dismissal and autoplay.
    pub fn demote(&mut self, id: &str) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        if index == 0 {
            return false;
        }
        let entry = self.entries.remove(index);
        self.entries.insert(0, entry);
        true
    }

    /// Merge a possibly-grown authoritative id list into the deck
    ///
    /// Ids missing from the deck are appended in the order given; existing
    /// entries never move; nothing is ever removed, even if an id vanished
    /// from the list. Returns whether anything changed, so callers can skip
    /// change notifications when the id sets already match.
    pub fn reconcile(&mut self, current_ids: &[String]) -> bool {
        let mut changed = false;
        for id in current_ids {
            if self.append(id) {
                changed = true;
            }
        }
        changed
    }

    /// Drop every entry while keeping the rotation seed memo
    ///
    /// Used when a new ingestion session starts: the cards are gone, but an
    /// id that comes back keeps its original seed.
    pub fn clear_entries(&mut self) {
        self.entries.clear();
    }
}
