//! Drag-release interpretation
//!
//! The host's gesture layer owns dragging, springs, and visuals; the core
//! only needs the release verdict. A release beyond the sensitivity
//! threshold on either axis dismisses the card (the engine demotes it);
//! anything else snaps back and leaves the deck untouched.

use crate::types::{GestureOutcome, ReleaseOffset};

/// Classify a drag release against the sensitivity threshold
pub fn interpret_release(offset: ReleaseOffset, sensitivity: f32) -> GestureOutcome {
    if offset.dx.abs() > sensitivity || offset.dy.abs() > sensitivity {
        GestureOutcome::Dismiss
    } else {
        GestureOutcome::SnapBack
    }
}
