//! Bounded undo/redo history of whole-tree snapshots.
//!
//! Snapshots are root lists of shared nodes, so keeping one costs one
//! reference per root block no matter how deep the page is.

use crate::node::NodeRef;

/// Maximum number of snapshots to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// An immutable root list recorded for undo/redo.
pub type Snapshot = Vec<NodeRef>;

/// Linear history with a single cursor.
///
/// `entries[cursor]` is the snapshot currently displayed. Committing after
/// an undo discards everything past the cursor.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Snapshot>,
    cursor: usize,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl History {
    /// Create a history whose only entry is `initial`.
    pub fn new(initial: Snapshot) -> Self {
        Self::with_limit(initial, MAX_UNDO_HISTORY)
    }

    /// Create a history with a custom size cap (at least 1).
    pub fn with_limit(initial: Snapshot, limit: usize) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Record a new snapshot after the cursor.
    pub fn commit(&mut self, snapshot: Snapshot) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        self.cursor += 1;

        if self.entries.len() > self.limit {
            let overflow = self.entries.len() - self.limit;
            self.entries.drain(..overflow);
            self.cursor -= overflow;
        }
        log::debug!("history commit: {}/{}", self.cursor + 1, self.entries.len());
    }

    /// Step back one snapshot.
    /// Returns the snapshot to display, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        log::debug!("undo to {}/{}", self.cursor + 1, self.entries.len());
        self.entries.get(self.cursor)
    }

    /// Step forward one snapshot.
    /// Returns the snapshot to display, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        log::debug!("redo to {}/{}", self.cursor + 1, self.entries.len());
        self.entries.get(self.cursor)
    }

    /// Drop all entries and start over from `snapshot`.
    pub fn reset(&mut self, snapshot: Snapshot) {
        self.entries.clear();
        self.entries.push(snapshot);
        self.cursor = 0;
    }

    /// The snapshot under the cursor.
    pub fn current(&self) -> &Snapshot {
        &self.entries[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a history holds at least its initial snapshot.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{BlockKind, Node};
    use std::sync::Arc;

    fn snap(n: usize) -> Snapshot {
        (0..n).map(|_| Arc::new(Node::new(BlockKind::Text))).collect()
    }

    #[test]
    fn test_undo_empty_stack() {
        let mut history = History::default();
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let t1 = snap(1);
        let t2 = snap(2);
        let mut history = History::new(t1.clone());
        history.commit(t2.clone());

        assert_eq!(history.undo().unwrap(), &t1);
        assert_eq!(history.redo().unwrap(), &t2);
        assert_eq!(history.current(), &t2);
    }

    #[test]
    fn test_commit_truncates_redo() {
        let mut history = History::new(snap(0));
        history.commit(snap(1));
        history.commit(snap(2));
        history.undo();
        history.undo();
        assert!(history.can_redo());

        let fresh = snap(3);
        history.commit(fresh.clone());
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), &fresh);
    }

    #[test]
    fn test_history_bounds() {
        let mut history = History::new(snap(0));
        let snapshots: Vec<Snapshot> = (0..70).map(|i| snap(i % 3 + 1)).collect();
        for s in &snapshots {
            history.commit(s.clone());
        }
        assert_eq!(history.len(), MAX_UNDO_HISTORY);
        assert_eq!(history.cursor(), MAX_UNDO_HISTORY - 1);

        let mut oldest = None;
        for _ in 0..MAX_UNDO_HISTORY {
            if let Some(s) = history.undo() {
                oldest = Some(s.clone());
            }
        }
        // oldest retained is the 21st commit (70 - 50 + 1 = index 20)
        assert_eq!(oldest.unwrap(), snapshots[20]);
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
    }

    #[test]
    fn test_reset() {
        let mut history = History::new(snap(0));
        history.commit(snap(1));
        let imported = snap(4);
        history.reset(imported.clone());
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert_eq!(history.current(), &imported);
    }

    #[test]
    fn test_custom_limit() {
        let mut history = History::with_limit(snap(0), 3);
        for _ in 0..5 {
            history.commit(snap(1));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.limit(), 3);
    }
}
