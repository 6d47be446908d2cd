//! Selection and hover tracking for the editing session.

use crate::node::{NodeId, NodeRef};
use crate::tree;

/// Display state of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockState {
    #[default]
    Normal,
    /// Pointer is over the block.
    Hovered,
    /// Block is selected (shows its property panel and handles).
    Selected,
}

impl BlockState {
    pub fn is_selected(self) -> bool {
        self == BlockState::Selected
    }
}

/// At most one selected and one hovered block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    selected: Option<NodeId>,
    hovered: Option<NodeId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn hovered(&self) -> Option<&NodeId> {
        self.hovered.as_ref()
    }

    /// Select a block, replacing any previous selection.
    pub fn select(&mut self, id: NodeId) {
        self.selected = Some(id);
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn hover(&mut self, id: Option<NodeId>) {
        self.hovered = id;
    }

    pub fn is_selected(&self, id: &NodeId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    /// Selection wins over hover.
    pub fn state_of(&self, id: &NodeId) -> BlockState {
        if self.is_selected(id) {
            BlockState::Selected
        } else if self.hovered.as_ref() == Some(id) {
            BlockState::Hovered
        } else {
            BlockState::Normal
        }
    }

    /// Drop references to blocks that are no longer in `roots`.
    /// Returns true if the selection was cleared.
    pub fn retain_existing(&mut self, roots: &[NodeRef]) -> bool {
        if self.hovered.as_ref().is_some_and(|id| !tree::contains(roots, id)) {
            self.hovered = None;
        }
        if self.selected.as_ref().is_some_and(|id| !tree::contains(roots, id)) {
            self.selected = None;
            return true;
        }
        false
    }
}
