//! Drag-and-drop coordinator.
//!
//! A [`DragSession`] lives for exactly one pointer gesture. It resolves a
//! drop against stable target identities, never against coordinates, and
//! produces at most one [`DropAction`] for the editor to apply and commit.

use crate::blocks::default_node;
use crate::node::{BlockKind, Node, NodeId, NodeRef};
use crate::tree;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DragSource {
    /// A palette item; the node is only created on drop.
    Palette(BlockKind),
    /// A node already in the document.
    ExistingNode(NodeId),
}

/// A droppable surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropTarget {
    /// Gap before root block `index` (`len` means the end).
    RootGap(usize),
    /// Gap before child `index` of `parent`.
    SiblingGap { parent: NodeId, index: usize },
    /// Content area of a grid cell.
    GridCell(NodeId),
    /// Content area of one column of a column block.
    ColumnSlot(NodeId),
}

impl DropTarget {
    /// The container receiving the drop, `None` for the root list.
    pub fn container(&self) -> Option<&NodeId> {
        match self {
            DropTarget::RootGap(_) => None,
            DropTarget::SiblingGap { parent, .. } => Some(parent),
            DropTarget::GridCell(id) | DropTarget::ColumnSlot(id) => Some(id),
        }
    }
}

/// Phase of a live gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    /// Pressed, but not yet past the activation distance.
    #[default]
    Pending,
    Dragging,
}

/// The single mutation a successful drop performs.
#[derive(Debug, Clone, PartialEq)]
pub enum DropAction {
    Insert { node: Node, index: usize },
    InsertChild { parent: NodeId, node: Node, index: usize },
    Append { parent: NodeId, node: Node },
    Reorder { from: usize, to: usize },
}

impl DropAction {
    /// Run the action through the mutation engine.
    pub fn apply(self, roots: &[NodeRef]) -> Vec<NodeRef> {
        match self {
            DropAction::Insert { node, index } => tree::insert(roots, node, index),
            DropAction::InsertChild { parent, node, index } => {
                tree::insert_child(roots, &parent, node, index)
            }
            DropAction::Append { parent, node } => tree::append_child(roots, &parent, node),
            DropAction::Reorder { from, to } => tree::reorder(roots, from, to),
        }
    }

    /// Id of the node created by this drop, if any.
    pub fn created(&self) -> Option<&NodeId> {
        match self {
            DropAction::Insert { node, .. }
            | DropAction::InsertChild { node, .. }
            | DropAction::Append { node, .. } => Some(&node.id),
            DropAction::Reorder { .. } => None,
        }
    }
}

/// Why a gesture ended without a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Released before the activation distance.
    NotActivated,
    /// Released over nothing droppable.
    NoTarget,
    /// Moving an existing node into another nesting level.
    CrossLevel,
    /// The target container is no longer in the document.
    MissingTarget,
    /// The target block cannot hold children.
    NotAContainer,
    /// The dragged node is no longer in the document.
    MissingSource,
    /// The drop would leave the order as it is.
    Unchanged,
}

/// Result of releasing a drag.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    Dropped(DropAction),
    Cancelled(CancelReason),
}

/// Transient state of one drag gesture.
#[derive(Debug, Clone)]
pub struct DragSession {
    source: DragSource,
    origin: Point,
    pointer: Point,
    activation_distance: f64,
    phase: DragPhase,
    target: Option<DropTarget>,
}

impl DragSession {
    /// Start a gesture at pointer-down.
    pub fn new(source: DragSource, origin: Point, activation_distance: f64) -> Self {
        Self {
            source,
            origin,
            pointer: origin,
            activation_distance,
            phase: DragPhase::Pending,
            target: None,
        }
    }

    pub fn source(&self) -> &DragSource {
        &self.source
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == DragPhase::Dragging
    }

    pub fn target(&self) -> Option<&DropTarget> {
        self.target.as_ref()
    }

    pub fn pointer(&self) -> Point {
        self.pointer
    }

    /// Track the pointer. The gesture becomes a drag once it has travelled
    /// the activation distance and stays one afterwards.
    pub fn move_to(&mut self, pointer: Point) -> DragPhase {
        self.pointer = pointer;
        if self.phase == DragPhase::Pending
            && self.origin.distance(pointer) >= self.activation_distance
        {
            self.phase = DragPhase::Dragging;
            log::debug!("drag activated: {:?}", self.source);
        }
        self.phase
    }

    /// Report the surface under the pointer (`None` when over nothing).
    pub fn hover(&mut self, target: Option<DropTarget>) {
        self.target = target;
    }

    /// End the gesture and resolve the drop against `roots`.
    pub fn release(self, roots: &[NodeRef]) -> DragOutcome {
        if self.phase != DragPhase::Dragging {
            return DragOutcome::Cancelled(CancelReason::NotActivated);
        }
        let Some(target) = self.target else {
            return DragOutcome::Cancelled(CancelReason::NoTarget);
        };
        if let Some(container) = target.container() {
            match tree::find(roots, container) {
                None => return DragOutcome::Cancelled(CancelReason::MissingTarget),
                Some(node) if !node.kind.is_container() => {
                    return DragOutcome::Cancelled(CancelReason::NotAContainer);
                }
                Some(_) => {}
            }
        }

        match self.source {
            DragSource::Palette(kind) => DragOutcome::Dropped(place_new(default_node(kind), target)),
            DragSource::ExistingNode(id) => resolve_move(roots, &id, target),
        }
    }
}

fn place_new(node: Node, target: DropTarget) -> DropAction {
    match target {
        DropTarget::RootGap(index) => DropAction::Insert { node, index },
        DropTarget::SiblingGap { parent, index } => DropAction::InsertChild { parent, node, index },
        DropTarget::GridCell(parent) | DropTarget::ColumnSlot(parent) => {
            DropAction::Append { parent, node }
        }
    }
}

fn resolve_move(roots: &[NodeRef], id: &NodeId, target: DropTarget) -> DragOutcome {
    let Some(from) = tree::root_index(roots, id) else {
        return DragOutcome::Cancelled(if tree::contains(roots, id) {
            CancelReason::CrossLevel
        } else {
            CancelReason::MissingSource
        });
    };
    let DropTarget::RootGap(gap) = target else {
        return DragOutcome::Cancelled(CancelReason::CrossLevel);
    };
    // removing the node first shifts every later gap down by one
    let to = if gap > from { gap - 1 } else { gap };
    let to = to.min(roots.len().saturating_sub(1));
    if to == from {
        return DragOutcome::Cancelled(CancelReason::Unchanged);
    }
    DragOutcome::Dropped(DropAction::Reorder { from, to })
}
