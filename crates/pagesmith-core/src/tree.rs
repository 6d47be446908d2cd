//! Immutable mutation engine over block trees.
//!
//! Every operation takes the current root list and returns a new one. The
//! path from the root to the edited node is copied; every other subtree is
//! shared with the input through its [`Arc`]. An id that does not exist
//! yields a list whose entries are pointer-identical to the input, which
//! [`is_unchanged`] detects, so callers can skip recording a history entry.

use crate::node::{Node, NodeId, NodeRef, Props};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// A partial update of a node.
///
/// Keys in `props`/`style` overwrite existing keys; a `null` value removes
/// the key. `content` and `class_name` replace the current value when set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePatch {
    #[serde(default)]
    pub props: Props,
    #[serde(default)]
    pub style: Props,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
}

impl NodePatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch setting a single prop.
    pub fn prop(key: impl Into<String>, value: Value) -> Self {
        Self::new().with_prop(key, value)
    }

    /// Builder: set a prop.
    pub fn with_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.props.insert(key.into(), value);
        self
    }

    /// Builder: set a style override.
    pub fn with_style(mut self, key: impl Into<String>, value: Value) -> Self {
        self.style.insert(key.into(), value);
        self
    }

    /// Builder: set the text content.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Check if applying this patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
            && self.style.is_empty()
            && self.content.is_none()
            && self.class_name.is_none()
    }

    /// Fold a later patch into this one; the later value wins per field.
    pub fn merge(&mut self, later: NodePatch) {
        self.props.extend(later.props);
        self.style.extend(later.style);
        if later.content.is_some() {
            self.content = later.content;
        }
        if later.class_name.is_some() {
            self.class_name = later.class_name;
        }
    }

    /// Return a copy of `node` with this patch applied.
    pub fn apply(&self, node: &Node) -> Node {
        let mut node = node.clone();
        merge_map(&mut node.props, &self.props);
        merge_map(&mut node.style, &self.style);
        if let Some(content) = &self.content {
            node.content = Some(content.clone());
        }
        if let Some(class_name) = &self.class_name {
            node.class_name = Some(class_name.clone());
        }
        node
    }
}

fn merge_map(target: &mut Props, patch: &Props) {
    for (key, value) in patch {
        if value.is_null() {
            target.remove(key);
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Check if `after` is the same tree as `before` (no node was replaced).
pub fn is_unchanged(before: &[NodeRef], after: &[NodeRef]) -> bool {
    before.len() == after.len() && before.iter().zip(after).all(|(a, b)| Arc::ptr_eq(a, b))
}

/// Find a node anywhere in the tree.
pub fn find<'a>(nodes: &'a [NodeRef], id: &NodeId) -> Option<&'a NodeRef> {
    for node in nodes {
        if node.id == *id {
            return Some(node);
        }
        if let Some(found) = find(&node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Check if a node exists anywhere in the tree.
pub fn contains(nodes: &[NodeRef], id: &NodeId) -> bool {
    find(nodes, id).is_some()
}

/// Index of a root-level node.
pub fn root_index(nodes: &[NodeRef], id: &NodeId) -> Option<usize> {
    nodes.iter().position(|n| n.id == *id)
}

/// The parent of a nested node; `None` for root nodes and unknown ids.
pub fn parent_of<'a>(nodes: &'a [NodeRef], id: &NodeId) -> Option<&'a NodeRef> {
    for node in nodes {
        if node.children.iter().any(|c| c.id == *id) {
            return Some(node);
        }
        if let Some(parent) = parent_of(&node.children, id) {
            return Some(parent);
        }
    }
    None
}

/// Child indices leading from the root list to `id`.
pub fn path_to(nodes: &[NodeRef], id: &NodeId) -> Option<Vec<usize>> {
    for (index, node) in nodes.iter().enumerate() {
        if node.id == *id {
            return Some(vec![index]);
        }
        if let Some(mut rest) = path_to(&node.children, id) {
            rest.insert(0, index);
            return Some(rest);
        }
    }
    None
}

/// Every id in the tree, depth-first.
pub fn collect_ids(nodes: &[NodeRef]) -> Vec<NodeId> {
    let mut ids = Vec::new();
    for node in nodes {
        node.visit_ids(&mut |id| ids.push(id.clone()));
    }
    ids
}

/// Total number of nodes at every depth.
pub fn count(nodes: &[NodeRef]) -> usize {
    nodes.iter().map(|n| n.subtree_len()).sum()
}

/// Deep-clone a subtree, giving every node in the copy a fresh id.
pub fn with_fresh_ids(node: &Node) -> Node {
    let mut copy = node.clone();
    copy.id = NodeId::generate();
    copy.children = node
        .children
        .iter()
        .map(|child| Arc::new(with_fresh_ids(child)))
        .collect();
    copy
}

/// Give a fresh id to every node whose id already appeared earlier in a
/// depth-first walk. The first occurrence keeps its id; subtrees without
/// repeats are shared.
pub fn unique_ids(nodes: &[NodeRef]) -> Vec<NodeRef> {
    let mut seen = HashSet::new();
    reassign_repeats(nodes, &mut seen)
}

fn reassign_repeats(nodes: &[NodeRef], seen: &mut HashSet<NodeId>) -> Vec<NodeRef> {
    nodes
        .iter()
        .map(|node| {
            let repeated = !seen.insert(node.id.clone());
            let children = reassign_repeats(&node.children, seen);
            if !repeated && is_unchanged(&node.children, &children) {
                return Arc::clone(node);
            }
            let mut copy = Node::clone(node);
            if repeated {
                copy.id = NodeId::generate();
                seen.insert(copy.id.clone());
            }
            copy.children = children;
            Arc::new(copy)
        })
        .collect()
}

/// Copy the sibling list at the end of `path`, copying every ancestor on
/// the way, and let `op` edit it at the final index.
fn rewrite_at(
    nodes: &[NodeRef],
    path: &[usize],
    op: impl FnOnce(&mut Vec<NodeRef>, usize),
) -> Vec<NodeRef> {
    let mut out = nodes.to_vec();
    match path {
        [] => {}
        [index] => op(&mut out, *index),
        [index, rest @ ..] => {
            let parent = &nodes[*index];
            let mut copy = Node::clone(parent);
            copy.children = rewrite_at(&parent.children, rest, op);
            out[*index] = Arc::new(copy);
        }
    }
    out
}

/// Reject subtrees whose ids already occur in the tree.
fn collides(nodes: &[NodeRef], node: &Node) -> bool {
    let existing: HashSet<NodeId> = collect_ids(nodes).into_iter().collect();
    let mut clash = false;
    node.visit_ids(&mut |id| clash |= existing.contains(id));
    if clash {
        log::warn!("refusing to insert {}: id already in document", node.id);
    }
    clash
}

/// Insert a node into the root list; `index` is clamped to the list length.
pub fn insert(nodes: &[NodeRef], node: Node, index: usize) -> Vec<NodeRef> {
    if collides(nodes, &node) {
        return nodes.to_vec();
    }
    let mut out = nodes.to_vec();
    let index = index.min(out.len());
    out.insert(index, Arc::new(node));
    out
}

/// Insert a node into `parent`'s children at `index` (clamped).
pub fn insert_child(nodes: &[NodeRef], parent: &NodeId, node: Node, index: usize) -> Vec<NodeRef> {
    if !contains(nodes, parent) || collides(nodes, &node) {
        return nodes.to_vec();
    }
    update_with(nodes, parent, |p| {
        let mut p = p.clone();
        let index = index.min(p.children.len());
        p.children.insert(index, Arc::new(node));
        p
    })
}

/// Append a node to the end of `parent`'s children.
pub fn append_child(nodes: &[NodeRef], parent: &NodeId, node: Node) -> Vec<NodeRef> {
    insert_child(nodes, parent, node, usize::MAX)
}

/// Replace the node `id` with `f(node)`, wherever it is.
///
/// The replacement keeps the original id.
pub fn update_with(nodes: &[NodeRef], id: &NodeId, f: impl FnOnce(&Node) -> Node) -> Vec<NodeRef> {
    let Some(path) = path_to(nodes, id) else {
        return nodes.to_vec();
    };
    rewrite_at(nodes, &path, |siblings, index| {
        let mut replacement = f(siblings[index].as_ref());
        replacement.id = siblings[index].id.clone();
        siblings[index] = Arc::new(replacement);
    })
}

/// Apply a patch to the node `id`; unknown ids are ignored.
pub fn update(nodes: &[NodeRef], id: &NodeId, patch: &NodePatch) -> Vec<NodeRef> {
    update_with(nodes, id, |node| patch.apply(node))
}

/// Remove the node `id` and its whole subtree.
pub fn delete(nodes: &[NodeRef], id: &NodeId) -> Vec<NodeRef> {
    let Some(path) = path_to(nodes, id) else {
        return nodes.to_vec();
    };
    rewrite_at(nodes, &path, |siblings, index| {
        siblings.remove(index);
    })
}

/// Deep-copy the node `id` with fresh ids and insert the copy right after it.
///
/// Returns the new tree and the id of the copy's root.
pub fn duplicate(nodes: &[NodeRef], id: &NodeId) -> (Vec<NodeRef>, Option<NodeId>) {
    let Some(path) = path_to(nodes, id) else {
        return (nodes.to_vec(), None);
    };
    let Some(original) = find(nodes, id) else {
        return (nodes.to_vec(), None);
    };
    let copy = with_fresh_ids(original);
    let copy_id = copy.id.clone();
    let out = rewrite_at(nodes, &path, |siblings, index| {
        siblings.insert(index + 1, Arc::new(copy));
    });
    (out, Some(copy_id))
}

/// Move a root node from `from` to `to` (stable move, not a swap).
pub fn reorder(nodes: &[NodeRef], from: usize, to: usize) -> Vec<NodeRef> {
    let mut out = nodes.to_vec();
    if from >= out.len() || to >= out.len() || from == to {
        return out;
    }
    let node = out.remove(from);
    out.insert(to, node);
    out
}

/// Move a root node one step towards the front.
pub fn move_up(nodes: &[NodeRef], id: &NodeId) -> Vec<NodeRef> {
    match root_index(nodes, id) {
        Some(index) if index > 0 => reorder(nodes, index, index - 1),
        _ => nodes.to_vec(),
    }
}

/// Move a root node one step towards the end.
pub fn move_down(nodes: &[NodeRef], id: &NodeId) -> Vec<NodeRef> {
    match root_index(nodes, id) {
        Some(index) if index + 1 < nodes.len() => reorder(nodes, index, index + 1),
        _ => nodes.to_vec(),
    }
}
