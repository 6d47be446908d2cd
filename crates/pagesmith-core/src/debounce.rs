//! Coalescing of property-panel edits.
//!
//! Keystroke-level edits to one block collect in a single pending slot.
//! The slot is flushed into one tree update (and one history entry) when
//! its quiet window elapses, when another block is edited, or when the
//! editor performs any other discrete action.

use crate::node::NodeId;
use crate::tree::NodePatch;
use std::time::{Duration, Instant};

/// Edits waiting to be applied to one node.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEdit {
    pub node_id: NodeId,
    pub patch: NodePatch,
    /// When the slot flushes if nothing else arrives.
    pub deadline: Instant,
    /// Number of edits folded into `patch`.
    pub edits: usize,
}

/// Single-slot, latest-value-wins debouncer.
#[derive(Debug, Clone)]
pub struct EditDebouncer {
    window: Duration,
    pending: Option<PendingEdit>,
}

impl EditDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn pending(&self) -> Option<&PendingEdit> {
        self.pending.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }

    /// Queue an edit made at `now`.
    ///
    /// An edit to the node already pending is merged into it and pushes its
    /// deadline back. An edit to a different node evicts the pending one,
    /// which is returned so the caller can apply it first.
    pub fn push(&mut self, node_id: NodeId, patch: NodePatch, now: Instant) -> Option<PendingEdit> {
        let deadline = now + self.window;
        if let Some(pending) = self.pending.as_mut() {
            if pending.node_id == node_id {
                pending.patch.merge(patch);
                pending.deadline = deadline;
                pending.edits += 1;
                return None;
            }
        }
        self.pending.replace(PendingEdit {
            node_id,
            patch,
            deadline,
            edits: 1,
        })
    }

    /// Take the pending edit if its window has elapsed at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<PendingEdit> {
        if self.pending.as_ref().is_some_and(|p| p.deadline <= now) {
            self.pending.take()
        } else {
            None
        }
    }

    /// Take the pending edit regardless of its deadline.
    pub fn flush(&mut self) -> Option<PendingEdit> {
        self.pending.take()
    }

    /// Drop the pending edit without applying it.
    pub fn discard(&mut self) {
        self.pending = None;
    }
}
