//! Column layout engine: fractional widths with one-neighbour compensation.
//!
//! A column block keeps `columns`, one `columnSizes` token per column
//! (`"1fr"`, `"2.5fr"`) and one child per column, all the same length.

use crate::blocks::column_slot;
use crate::config::EditorConfig;
use crate::node::{BlockKind, COLUMN_SIZES_KEY, Node, NodeId};
use kurbo::Point;
use serde_json::{Value, json};
use std::sync::Arc;

/// Column count used when a column block has none.
pub const DEFAULT_COLUMNS: u32 = 2;

/// Parse a fractional token. Bare numbers are accepted; anything else is
/// `None`.
pub fn parse_fr(token: &str) -> Option<f64> {
    let token = token.trim();
    let number = token.strip_suffix("fr").unwrap_or(token);
    number
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Round to two decimals.
pub fn round_fr(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a width for display, e.g. `1.256` -> `"1.26fr"`.
pub fn format_fr(value: f64) -> String {
    format!("{}fr", round_fr(value))
}

/// Format a width for storage. Keeps six decimals so widths read back with
/// the same sum they were written with.
pub fn fr_token(value: f64) -> String {
    format!("{}fr", (value * 1e6).round() / 1e6)
}

/// Widths of a column block, one per column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub columns: u32,
    pub sizes: Vec<f64>,
}

impl ColumnLayout {
    /// Read a column block. Missing or unreadable tokens count as `1fr`;
    /// the size list always has `columns` entries.
    pub fn from_node(node: &Node) -> Self {
        let columns = node
            .prop_u32("columns")
            .filter(|c| *c > 0)
            .unwrap_or(DEFAULT_COLUMNS);
        let tokens = size_tokens(node);
        let sizes = (0..columns as usize)
            .map(|i| tokens.get(i).and_then(|t| parse_fr(t)).unwrap_or(1.0))
            .collect();
        Self { columns, sizes }
    }

    /// Sum of all widths.
    pub fn total(&self) -> f64 {
        self.sizes.iter().sum()
    }
}

/// The raw `columnSizes` tokens of a node.
pub fn size_tokens(node: &Node) -> Vec<String> {
    match node.prop(COLUMN_SIZES_KEY) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                Value::Number(n) => format!("{}fr", n),
                _ => "1fr".to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Resize column `index` by `delta` fr, letting column `index + 1` absorb
/// the inverse.
///
/// The delta snaps to 0.01fr and is clamped so neither column drops below
/// `min`. The neighbour gets whatever the pair had left, so the total never
/// changes. The last column has no boundary to its right and is left alone.
pub fn resize_sizes(sizes: &[f64], index: usize, delta: f64, min: f64) -> Vec<f64> {
    let mut out = sizes.to_vec();
    if index + 1 >= out.len() || !delta.is_finite() {
        return out;
    }
    let current = out[index];
    let next = out[index + 1];
    let lower = (min - current).min(0.0);
    let upper = (next - min).max(0.0);
    let delta = round_fr(delta).clamp(lower, upper);
    out[index] = current + delta;
    out[index + 1] = (current + next) - out[index];
    out
}

/// An in-progress boundary drag on a column block.
#[derive(Debug, Clone)]
pub struct ColumnResize {
    column_id: NodeId,
    index: usize,
    start_x: f64,
    start_tokens: Vec<String>,
    start_sizes: Vec<f64>,
    unit_px: f64,
    min_fr: f64,
    current: Vec<f64>,
}

/// Sizes produced by a completed column resize.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnResizeResult {
    pub column_id: NodeId,
    pub sizes: Vec<String>,
}

impl ColumnResize {
    /// Start dragging the boundary between column `index` and `index + 1`.
    /// Returns `None` for non-column nodes and for the last column, which
    /// has no boundary on its right.
    pub fn begin(node: &Node, index: usize, start: Point, config: &EditorConfig) -> Option<Self> {
        if node.kind != BlockKind::Column {
            return None;
        }
        let layout = ColumnLayout::from_node(node);
        if index + 1 >= layout.sizes.len() {
            return None;
        }
        let mut start_tokens = size_tokens(node);
        start_tokens.resize(layout.sizes.len(), "1fr".to_string());
        Some(Self {
            column_id: node.id.clone(),
            index,
            start_x: start.x,
            start_tokens,
            current: layout.sizes.clone(),
            start_sizes: layout.sizes,
            unit_px: config.column_unit_px,
            min_fr: config.column_min_fr,
        })
    }

    /// Feed a pointer position; returns the previewed widths.
    pub fn update(&mut self, pointer: Point) -> &[f64] {
        let delta = if self.unit_px > 0.0 {
            (pointer.x - self.start_x) / self.unit_px
        } else {
            0.0
        };
        self.current = resize_sizes(&self.start_sizes, self.index, delta, self.min_fr);
        &self.current
    }

    pub fn column_id(&self) -> &NodeId {
        &self.column_id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Previewed widths as tokens. Columns the drag did not touch keep
    /// their original token.
    pub fn preview(&self) -> Vec<String> {
        self.start_tokens
            .iter()
            .zip(self.start_sizes.iter().zip(&self.current))
            .map(|(token, (before, after))| {
                if before == after {
                    token.clone()
                } else {
                    fr_token(*after)
                }
            })
            .collect()
    }

    /// End the gesture with the last computed widths.
    pub fn finish(self) -> ColumnResizeResult {
        let sizes = self.preview();
        ColumnResizeResult {
            column_id: self.column_id,
            sizes,
        }
    }
}

/// Write a full `columnSizes` list.
pub fn set_sizes(node: &Node, sizes: &[String]) -> Node {
    let mut node = node.clone();
    node.set_prop(COLUMN_SIZES_KEY, json!(sizes));
    node
}

/// Restore `columns == columnSizes.len() == children.len()`.
///
/// Existing children are never dropped: a block with more children than
/// `columns` grows to fit them.
pub fn normalize(node: &Node) -> Node {
    let layout = ColumnLayout::from_node(node);
    let count = (layout.columns as usize).max(node.children.len());
    resize_to(node, count)
}

fn resize_to(node: &Node, count: usize) -> Node {
    let mut node = node.clone();
    let mut tokens = size_tokens(&node);
    tokens.resize(count, "1fr".to_string());
    node.children.truncate(count);
    while node.children.len() < count {
        node.children.push(Arc::new(column_slot()));
    }
    node.set_prop("columns", json!(count));
    node.set_prop(COLUMN_SIZES_KEY, json!(tokens));
    node
}

/// Change the column count.
///
/// Growing appends `1fr` columns with a default child each; shrinking drops
/// columns from the end without redistributing their width.
pub fn set_column_count(node: &Node, count: u32, max_columns: u32) -> Node {
    let count = count.clamp(1, max_columns.max(1));
    let normalized = normalize(node);
    resize_to(&normalized, count as usize)
}

/// Remove one column and its content. The last remaining column is never
/// removed.
pub fn remove_column(node: &Node, child_id: &NodeId) -> Node {
    let node = normalize(node);
    let Some(index) = node.children.iter().position(|c| c.id == *child_id) else {
        return node;
    };
    if node.children.len() <= 1 {
        log::debug!("keeping last column of {}", node.id);
        return node;
    }
    let mut node = node;
    let mut tokens = size_tokens(&node);
    node.children.remove(index);
    if index < tokens.len() {
        tokens.remove(index);
    }
    node.set_prop("columns", json!(node.children.len()));
    node.set_prop(COLUMN_SIZES_KEY, json!(tokens));
    node
}

/// A named column preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnTemplate {
    pub name: &'static str,
    pub sizes: &'static [&'static str],
}

pub const COLUMN_TEMPLATES: [ColumnTemplate; 10] = [
    ColumnTemplate { name: "1-col", sizes: &["1fr"] },
    ColumnTemplate { name: "2-col", sizes: &["1fr", "1fr"] },
    ColumnTemplate { name: "2-col-3-1", sizes: &["3fr", "1fr"] },
    ColumnTemplate { name: "2-col-1-3", sizes: &["1fr", "3fr"] },
    ColumnTemplate { name: "3-col", sizes: &["1fr", "1fr", "1fr"] },
    ColumnTemplate { name: "3-col-2-1-1", sizes: &["2fr", "1fr", "1fr"] },
    ColumnTemplate { name: "3-col-1-2-1", sizes: &["1fr", "2fr", "1fr"] },
    ColumnTemplate { name: "3-col-1-1-2", sizes: &["1fr", "1fr", "2fr"] },
    ColumnTemplate { name: "4-col", sizes: &["1fr", "1fr", "1fr", "1fr"] },
    ColumnTemplate { name: "custom", sizes: &["1fr", "1fr"] },
];

/// Look up a column preset by name.
pub fn template(name: &str) -> Option<ColumnTemplate> {
    COLUMN_TEMPLATES.iter().copied().find(|t| t.name == name)
}

/// Apply a preset: set the count, then the preset's widths.
pub fn apply_template(node: &Node, preset: ColumnTemplate, max_columns: u32) -> Node {
    let resized = set_column_count(node, preset.sizes.len() as u32, max_columns);
    let sizes: Vec<String> = preset.sizes.iter().map(|s| s.to_string()).collect();
    let mut node = set_sizes(&resized, &sizes);
    node.set_prop("template", json!(preset.name));
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::default_node;

    fn column_with(sizes: &[&str]) -> Node {
        let base = default_node(BlockKind::Column);
        let node = set_column_count(&base, sizes.len() as u32, 12);
        let tokens: Vec<String> = sizes.iter().map(|s| s.to_string()).collect();
        set_sizes(&node, &tokens)
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{:?} != {:?}", actual, expected);
        }
    }

    fn assert_one_size_per_child(node: &Node) {
        let columns = node.prop_u32("columns").unwrap() as usize;
        assert_eq!(size_tokens(node).len(), columns);
        assert_eq!(node.children.len(), columns);
    }

    #[test]
    fn test_parse_and_format() {
        assert_eq!(parse_fr("2.5fr"), Some(2.5));
        assert_eq!(parse_fr(" 3 "), Some(3.0));
        assert_eq!(parse_fr("auto"), None);
        assert_eq!(parse_fr("0fr"), None);
        assert_eq!(format_fr(1.0), "1fr");
        assert_eq!(format_fr(1.256), "1.26fr");
        assert_eq!(fr_token(1.4329999999999998), "1.433fr");
    }

    #[test]
    fn test_resize_conserves_total() {
        let before = [1.0, 2.0, 1.5];
        for delta in [-3.0, -0.37, 0.0, 0.8, 1.42, 9.0] {
            for index in 0..2 {
                let after = resize_sizes(&before, index, delta, 0.5);
                let sum_before: f64 = before.iter().sum();
                let sum_after: f64 = after.iter().sum();
                assert!((sum_before - sum_after).abs() < 1e-9, "{} at {}", delta, index);
                assert!(after.iter().all(|w| *w >= 0.5));
            }
        }
    }

    #[test]
    fn test_resize_only_touches_neighbour() {
        let after = resize_sizes(&[1.0, 1.0, 1.0], 0, 0.4, 0.5);
        assert_close(&after, &[1.4, 0.6, 1.0]);
    }

    #[test]
    fn test_resize_clamps_at_minimum() {
        let after = resize_sizes(&[1.0, 1.0], 0, 2.0, 0.5);
        assert_eq!(after, vec![1.5, 0.5]);
        let after = resize_sizes(&[1.0, 1.0], 0, -2.0, 0.5);
        assert_eq!(after, vec![0.5, 1.5]);
    }

    #[test]
    fn test_last_column_has_no_boundary() {
        assert_eq!(resize_sizes(&[1.0, 1.0], 1, 1.0, 0.5), vec![1.0, 1.0]);
        assert_eq!(resize_sizes(&[1.0, 1.0], 1, -5.0, 0.5), vec![1.0, 1.0]);
        let node = column_with(&["1fr", "1fr"]);
        assert!(ColumnResize::begin(&node, 1, Point::ZERO, &EditorConfig::default()).is_none());
    }

    #[test]
    fn test_resize_keeps_fine_grained_widths() {
        let node = column_with(&["1.333fr", "1fr"]);
        let before = ColumnLayout::from_node(&node).total();
        let config = EditorConfig::default();
        let mut resize = ColumnResize::begin(&node, 0, Point::ZERO, &config).unwrap();
        // 5px at 50px per fr
        resize.update(Point::new(5.0, 0.0));
        let result = resize.finish();
        assert_eq!(result.sizes, vec!["1.433fr", "0.9fr"]);

        let resized = set_sizes(&node, &result.sizes);
        let after = ColumnLayout::from_node(&resized).total();
        assert!((after - before).abs() < 1e-9, "{} != {}", after, before);
    }

    #[test]
    fn test_session_pixels_to_fr() {
        let node = column_with(&["1fr", "1fr", "1fr"]);
        let config = EditorConfig::default();
        let mut resize = ColumnResize::begin(&node, 1, Point::new(100.0, 0.0), &config).unwrap();
        // 25px at 50px per fr
        assert_eq!(resize.update(Point::new(125.0, 40.0)), &[1.0, 1.5, 0.5]);
        let result = resize.finish();
        assert_eq!(result.sizes, vec!["1fr", "1.5fr", "0.5fr"]);
        assert_eq!(result.column_id, node.id);
    }

    #[test]
    fn test_session_rejects_bad_index() {
        let node = column_with(&["1fr", "1fr"]);
        let config = EditorConfig::default();
        assert!(ColumnResize::begin(&node, 2, Point::ZERO, &config).is_none());
        let text = default_node(BlockKind::Text);
        assert!(ColumnResize::begin(&text, 0, Point::ZERO, &config).is_none());
    }

    #[test]
    fn test_grow_and_shrink() {
        let node = column_with(&["2fr", "1fr"]);
        let grown = set_column_count(&node, 4, 12);
        assert_one_size_per_child(&grown);
        assert_eq!(size_tokens(&grown), vec!["2fr", "1fr", "1fr", "1fr"]);

        let first = grown.children[0].id.clone();
        let shrunk = set_column_count(&grown, 1, 12);
        assert_one_size_per_child(&shrunk);
        assert_eq!(size_tokens(&shrunk), vec!["2fr"]);
        assert_eq!(shrunk.children[0].id, first);
    }

    #[test]
    fn test_count_is_bounded() {
        let node = column_with(&["1fr"]);
        assert_eq!(set_column_count(&node, 40, 12).children.len(), 12);
        assert_eq!(set_column_count(&node, 0, 12).children.len(), 1);
    }

    #[test]
    fn test_remove_column() {
        let node = column_with(&["1fr", "2fr", "3fr"]);
        let middle = node.children[1].id.clone();
        let removed = remove_column(&node, &middle);
        assert_one_size_per_child(&removed);
        assert_eq!(size_tokens(&removed), vec!["1fr", "3fr"]);

        let single = column_with(&["1fr"]);
        let only = single.children[0].id.clone();
        assert_eq!(remove_column(&single, &only).children.len(), 1);
    }

    #[test]
    fn test_normalize_keeps_children() {
        let mut node = default_node(BlockKind::Column);
        node.props.remove(COLUMN_SIZES_KEY);
        node.children.push(Arc::new(default_node(BlockKind::Text)));
        let fixed = normalize(&node);
        assert_one_size_per_child(&fixed);
        assert_eq!(fixed.children.len(), 3);
    }

    #[test]
    fn test_apply_template() {
        let node = default_node(BlockKind::Column);
        let applied = apply_template(&node, template("3-col-1-2-1").unwrap(), 12);
        assert_one_size_per_child(&applied);
        assert_eq!(size_tokens(&applied), vec!["1fr", "2fr", "1fr"]);
        assert_eq!(applied.prop_str("template"), Some("3-col-1-2-1"));
    }
}
