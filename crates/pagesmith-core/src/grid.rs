//! Grid layout engine: explicit cell placement and span resizing.
//!
//! A grid block has `columns` x `rows` tracks. Each child carries its own
//! placement in `props.gridCell`; positions are explicit and never
//! re-flowed when other cells are added, removed or resized.

use crate::config::EditorConfig;
use crate::node::{BlockKind, GRID_CELL_KEY, Node, NodeId, props};
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::Arc;

/// Column count used when a grid has none.
pub const DEFAULT_GRID_COLUMNS: u32 = 3;

/// Placement of one grid child. Tracks are 1-based; spans are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub column_start: u32,
    pub row_start: u32,
    pub column_span: u32,
    pub row_span: u32,
}

impl GridCell {
    /// A 1x1 cell at the given track.
    pub fn at(column_start: u32, row_start: u32) -> Self {
        Self {
            column_start,
            row_start,
            column_span: 1,
            row_span: 1,
        }
    }

    /// Builder: set both spans.
    pub fn with_span(mut self, column_span: u32, row_span: u32) -> Self {
        self.column_span = column_span;
        self.row_span = row_span;
        self
    }

    /// Row-major placement of the `index`-th child of a grid.
    pub fn row_major(index: usize, columns: u32) -> Self {
        let columns = columns.max(1) as usize;
        Self::at((index % columns + 1) as u32, (index / columns + 1) as u32)
    }

    /// Read a child's placement; missing or zero fields fall back to the
    /// row-major position of `index` and a span of 1.
    pub fn from_node(node: &Node, index: usize, columns: u32) -> Self {
        let fallback = Self::row_major(index, columns);
        let Some(Value::Object(cell)) = node.prop(GRID_CELL_KEY) else {
            return fallback;
        };
        let field = |key: &str, default: u32| {
            cell.get(key)
                .and_then(Value::as_u64)
                .filter(|v| *v > 0)
                .map(|v| v.min(u32::MAX as u64) as u32)
                .unwrap_or(default)
        };
        Self {
            column_start: field("columnStart", fallback.column_start),
            row_start: field("rowStart", fallback.row_start),
            column_span: field("columnSpan", 1),
            row_span: field("rowSpan", 1),
        }
    }

    /// Clamp into a `columns` x `rows` grid: starts inside the grid,
    /// spans at least 1 and never past the last track.
    pub fn clamped(self, columns: u32, rows: u32) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        let column_start = self.column_start.clamp(1, columns);
        let row_start = self.row_start.clamp(1, rows);
        Self {
            column_start,
            row_start,
            column_span: self.column_span.clamp(1, columns - column_start + 1),
            row_span: self.row_span.clamp(1, rows - row_start + 1),
        }
    }

    /// Check if the cell covers track (`column`, `row`).
    pub fn covers(&self, column: u32, row: u32) -> bool {
        column >= self.column_start
            && column < self.column_start + self.column_span
            && row >= self.row_start
            && row < self.row_start + self.row_span
    }

    fn to_value(self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Track geometry of a grid block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub columns: u32,
    pub rows: u32,
    pub gap_px: f64,
}

impl GridLayout {
    /// Read the grid's dimensions. Without a `rows` prop the grid has as
    /// many rows as its children need.
    pub fn from_node(node: &Node, default_gap_px: f64) -> Self {
        let columns = node
            .prop_u32("columns")
            .filter(|c| *c > 0)
            .unwrap_or(DEFAULT_GRID_COLUMNS);
        let rows = node
            .prop_u32("rows")
            .filter(|r| *r > 0)
            .unwrap_or_else(|| (node.children.len() as u32).div_ceil(columns))
            .max(1);
        let gap_px = node
            .prop_str("gap")
            .and_then(parse_px)
            .unwrap_or(default_gap_px);
        Self { columns, rows, gap_px }
    }

    /// Width of one column track for a container of the given width.
    pub fn column_width(&self, container_width: f64) -> f64 {
        let gaps = (self.columns.saturating_sub(1)) as f64 * self.gap_px;
        (container_width - gaps) / self.columns as f64
    }

    /// Height of one row track for a container of the given height.
    pub fn row_height(&self, container_height: f64) -> f64 {
        let gaps = (self.rows.saturating_sub(1)) as f64 * self.gap_px;
        (container_height - gaps) / self.rows as f64
    }

    /// Placement of every child in child order, clamped to the grid.
    pub fn cells(&self, grid: &Node) -> Vec<(NodeId, GridCell)> {
        grid.children
            .iter()
            .enumerate()
            .map(|(i, child)| {
                let cell = GridCell::from_node(child, i, self.columns);
                (child.id.clone(), cell.clamped(self.columns, self.rows))
            })
            .collect()
    }

    /// Tracks not covered by any child, row-major.
    pub fn free_tracks(&self, grid: &Node) -> Vec<(u32, u32)> {
        let cells = self.cells(grid);
        let mut occupied = HashSet::new();
        for (_, cell) in &cells {
            for row in cell.row_start..cell.row_start + cell.row_span {
                for column in cell.column_start..cell.column_start + cell.column_span {
                    occupied.insert((column, row));
                }
            }
        }
        let mut free = Vec::new();
        for row in 1..=self.rows {
            for column in 1..=self.columns {
                if !occupied.contains(&(column, row)) {
                    free.push((column, row));
                }
            }
        }
        free
    }
}

/// Parse a `"<n>px"` length. Other units are not understood.
pub fn parse_px(value: &str) -> Option<f64> {
    value
        .trim()
        .strip_suffix("px")
        .and_then(|n| n.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite() && *n >= 0.0)
}

/// A named grid preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridTemplate {
    pub name: &'static str,
    pub columns: u32,
    pub rows: u32,
}

/// Built-in grid presets.
pub const GRID_TEMPLATES: [GridTemplate; 8] = [
    GridTemplate { name: "2x2", columns: 2, rows: 2 },
    GridTemplate { name: "3x3", columns: 3, rows: 3 },
    GridTemplate { name: "4x4", columns: 4, rows: 4 },
    GridTemplate { name: "2x3", columns: 2, rows: 3 },
    GridTemplate { name: "3x2", columns: 3, rows: 2 },
    GridTemplate { name: "4x2", columns: 4, rows: 2 },
    GridTemplate { name: "2x4", columns: 2, rows: 4 },
    GridTemplate { name: "custom", columns: 3, rows: 3 },
];

/// Look up a grid preset by name.
pub fn template(name: &str) -> Option<GridTemplate> {
    GRID_TEMPLATES.iter().copied().find(|t| t.name == name)
}

/// A fresh, empty grid cell block at `cell`.
pub fn cell_node(cell: GridCell) -> Node {
    Node::new(BlockKind::Section).with_props(props(json!({
        "padding": "20px",
        GRID_CELL_KEY: cell.to_value(),
    })))
}

fn write_cell(child: &Node, cell: GridCell) -> Node {
    let mut child = child.clone();
    let mut merged = match child.prop(GRID_CELL_KEY) {
        Some(Value::Object(existing)) => existing.clone(),
        _ => serde_json::Map::new(),
    };
    if let Value::Object(fields) = cell.to_value() {
        merged.extend(fields);
    }
    child.set_prop(GRID_CELL_KEY, Value::Object(merged));
    child
}

/// Set one child's placement, clamped to the grid. Other cells keep theirs.
pub fn place_cell(grid: &Node, cell_id: &NodeId, cell: GridCell, default_gap_px: f64) -> Node {
    let layout = GridLayout::from_node(grid, default_gap_px);
    let cell = cell.clamped(layout.columns, layout.rows);
    let mut grid = grid.clone();
    grid.children = grid
        .children
        .iter()
        .map(|child| {
            if child.id == *cell_id {
                Arc::new(write_cell(child, cell))
            } else {
                Arc::clone(child)
            }
        })
        .collect();
    grid
}

/// Append a default cell on every uncovered track, row-major.
pub fn fill_cells(grid: &Node, default_gap_px: f64) -> Node {
    let layout = GridLayout::from_node(grid, default_gap_px);
    let mut grid = grid.clone();
    for (column, row) in layout.free_tracks(&grid) {
        grid.children.push(Arc::new(cell_node(GridCell::at(column, row))));
    }
    grid
}

/// Append one cell on the first free track, growing the grid by a row
/// when it is full. Returns the new grid and the new cell's id.
pub fn add_cell(grid: &Node, default_gap_px: f64) -> (Node, NodeId) {
    let layout = GridLayout::from_node(grid, default_gap_px);
    let mut grid = grid.clone();
    let (column, row) = match layout.free_tracks(&grid).first() {
        Some(track) => *track,
        None => {
            grid.set_prop("rows", json!(layout.rows + 1));
            (1, layout.rows + 1)
        }
    };
    let cell = cell_node(GridCell::at(column, row));
    let id = cell.id.clone();
    grid.children.push(Arc::new(cell));
    (grid, id)
}

/// Remove a cell; the remaining cells keep their placement.
pub fn remove_cell(grid: &Node, cell_id: &NodeId) -> Node {
    let mut grid = grid.clone();
    grid.children.retain(|child| child.id != *cell_id);
    grid
}

/// Write an explicit, clamped placement onto every child.
pub fn normalize(grid: &Node, default_gap_px: f64) -> Node {
    let layout = GridLayout::from_node(grid, default_gap_px);
    let mut grid = grid.clone();
    grid.children = layout
        .cells(&grid)
        .into_iter()
        .zip(grid.children.iter())
        .map(|((_, cell), child)| Arc::new(write_cell(child, cell.clamped(layout.columns, layout.rows))))
        .collect();
    grid
}

/// Change the grid's track counts and re-clamp every cell.
pub fn set_dimensions(grid: &Node, columns: u32, rows: u32, default_gap_px: f64) -> Node {
    // pin fallback positions under the old column count first
    let pinned = normalize(grid, default_gap_px);
    let mut resized = pinned.clone();
    resized.set_prop("columns", json!(columns.max(1)));
    resized.set_prop("rows", json!(rows.max(1)));
    normalize(&resized, default_gap_px)
}

/// Apply a preset: set dimensions and fill every free track.
pub fn apply_template(grid: &Node, preset: GridTemplate, default_gap_px: f64) -> Node {
    let mut grid = set_dimensions(grid, preset.columns, preset.rows, default_gap_px);
    grid.set_prop("template", json!(preset.name));
    fill_cells(&grid, default_gap_px)
}

/// Which edge or corner of a cell is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeHandle {
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    /// +1 when dragging right grows the column span, -1 when dragging
    /// left grows it, 0 when the handle does not touch columns.
    pub fn column_sign(self) -> i64 {
        match self {
            ResizeHandle::Right | ResizeHandle::TopRight | ResizeHandle::BottomRight => 1,
            ResizeHandle::Left | ResizeHandle::TopLeft | ResizeHandle::BottomLeft => -1,
            ResizeHandle::Top | ResizeHandle::Bottom => 0,
        }
    }

    /// Row counterpart of [`ResizeHandle::column_sign`].
    pub fn row_sign(self) -> i64 {
        match self {
            ResizeHandle::Bottom | ResizeHandle::BottomLeft | ResizeHandle::BottomRight => 1,
            ResizeHandle::Top | ResizeHandle::TopLeft | ResizeHandle::TopRight => -1,
            ResizeHandle::Left | ResizeHandle::Right => 0,
        }
    }

    /// Parse a handle name such as `"bottom-right"`.
    pub fn from_name(name: &str) -> Option<Self> {
        serde_json::from_value(Value::String(name.to_string())).ok()
    }
}

/// Number of tracks a pointer travel of `delta` px represents.
///
/// Travel shorter than `max(ratio * unit, min_px)` counts as zero so that
/// jitter never flips a span.
pub fn span_delta(delta: f64, unit: f64, ratio: f64, min_px: f64) -> i64 {
    if unit.is_nan() || unit <= 0.0 || !delta.is_finite() {
        return 0;
    }
    let threshold = (unit * ratio).max(min_px);
    if delta.abs() < threshold {
        return 0;
    }
    (delta / unit).round() as i64
}

fn apply_span(start_span: u32, sign: i64, delta: i64) -> u32 {
    (start_span as i64)
        .saturating_add(sign.saturating_mul(delta))
        .clamp(1, u32::MAX as i64) as u32
}

/// An in-progress cell resize gesture.
///
/// Everything is captured at pointer-down; moves only produce previews.
/// The caller commits [`GridResize::finish`] once on release.
#[derive(Debug, Clone)]
pub struct GridResize {
    grid_id: NodeId,
    cell_id: NodeId,
    handle: ResizeHandle,
    start_point: Point,
    start_cell: GridCell,
    layout: GridLayout,
    container: Size,
    threshold_ratio: f64,
    threshold_min_px: f64,
    current: GridCell,
}

/// Final placement produced by a completed resize.
#[derive(Debug, Clone, PartialEq)]
pub struct GridResizeResult {
    pub grid_id: NodeId,
    pub cell_id: NodeId,
    pub cell: GridCell,
}

impl GridResize {
    /// Start resizing `cell_id` inside `grid`.
    /// Returns `None` if `grid` is not a grid or does not own the cell.
    pub fn begin(
        grid: &Node,
        cell_id: &NodeId,
        handle: ResizeHandle,
        start_point: Point,
        container: Size,
        config: &EditorConfig,
    ) -> Option<Self> {
        if grid.kind != BlockKind::Grid {
            return None;
        }
        let layout = GridLayout::from_node(grid, config.grid_default_gap_px);
        let index = grid.children.iter().position(|c| c.id == *cell_id)?;
        let start_cell = GridCell::from_node(&grid.children[index], index, layout.columns)
            .clamped(layout.columns, layout.rows);
        Some(Self {
            grid_id: grid.id.clone(),
            cell_id: cell_id.clone(),
            handle,
            start_point,
            start_cell,
            layout,
            container,
            threshold_ratio: config.grid_threshold_ratio,
            threshold_min_px: config.grid_threshold_min_px,
            current: start_cell,
        })
    }

    /// Feed a pointer position; returns the previewed placement.
    pub fn update(&mut self, pointer: Point) -> GridCell {
        let delta: Vec2 = pointer - self.start_point;
        let columns = span_delta(
            delta.x,
            self.layout.column_width(self.container.width),
            self.threshold_ratio,
            self.threshold_min_px,
        );
        let rows = span_delta(
            delta.y,
            self.layout.row_height(self.container.height),
            self.threshold_ratio,
            self.threshold_min_px,
        );

        let mut cell = self.start_cell;
        cell.column_span = apply_span(cell.column_span, self.handle.column_sign(), columns);
        cell.row_span = apply_span(cell.row_span, self.handle.row_sign(), rows);
        self.current = cell.clamped(self.layout.columns, self.layout.rows);
        self.current
    }

    /// The placement shown right now.
    pub fn preview(&self) -> GridCell {
        self.current
    }

    pub fn grid_id(&self) -> &NodeId {
        &self.grid_id
    }

    pub fn cell_id(&self) -> &NodeId {
        &self.cell_id
    }

    pub fn handle(&self) -> ResizeHandle {
        self.handle
    }

    /// End the gesture with the last computed placement.
    pub fn finish(self) -> GridResizeResult {
        GridResizeResult {
            grid_id: self.grid_id,
            cell_id: self.cell_id,
            cell: self.current,
        }
    }
}
