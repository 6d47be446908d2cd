//! Editor tuning knobs.
//!
//! The defaults are the values the page builder has always shipped with.
//! They are heuristics; hosts can override them from a JSON settings blob.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::history::MAX_UNDO_HISTORY;

/// Window over which property-panel edits are coalesced, in milliseconds.
pub const EDIT_DEBOUNCE_MS: u64 = 300;
/// Pointer travel (px) before a press becomes a drag.
pub const DRAG_ACTIVATION_DISTANCE: f64 = 8.0;
/// Fraction of a grid track the pointer must travel before a span changes.
pub const GRID_THRESHOLD_RATIO: f64 = 0.3;
/// Lower bound (px) of the grid span threshold.
pub const GRID_THRESHOLD_MIN_PX: f64 = 20.0;
/// Grid gap (px) assumed when the `gap` prop is missing or not in px.
pub const GRID_DEFAULT_GAP_PX: f64 = 20.0;
/// Pixels of pointer travel per `1fr` when resizing columns.
pub const COLUMN_UNIT_PX: f64 = 50.0;
/// Narrowest a column may be resized to, in `fr`.
pub const COLUMN_MIN_FR: f64 = 0.5;
/// Largest column count a column block accepts.
pub const MAX_COLUMNS: u32 = 12;

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo snapshots.
    pub history_limit: usize,
    /// Property edit coalescing window in milliseconds.
    pub edit_debounce_ms: u64,
    /// Drag activation distance in pixels.
    pub drag_activation_distance: f64,
    pub grid_threshold_ratio: f64,
    pub grid_threshold_min_px: f64,
    pub grid_default_gap_px: f64,
    /// Pixels per fractional unit for column resizing.
    pub column_unit_px: f64,
    pub column_min_fr: f64,
    pub max_columns: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: MAX_UNDO_HISTORY,
            edit_debounce_ms: EDIT_DEBOUNCE_MS,
            drag_activation_distance: DRAG_ACTIVATION_DISTANCE,
            grid_threshold_ratio: GRID_THRESHOLD_RATIO,
            grid_threshold_min_px: GRID_THRESHOLD_MIN_PX,
            grid_default_gap_px: GRID_DEFAULT_GAP_PX,
            column_unit_px: COLUMN_UNIT_PX,
            column_min_fr: COLUMN_MIN_FR,
            max_columns: MAX_COLUMNS,
        }
    }
}

impl EditorConfig {
    /// Parse a configuration; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The debounce window as a [`Duration`].
    pub fn edit_debounce(&self) -> Duration {
        Duration::from_millis(self.edit_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.edit_debounce(), Duration::from_millis(300));
        assert_eq!(config.column_unit_px, 50.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{ "history_limit": 10 }"#).unwrap();
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.drag_activation_distance, DRAG_ACTIVATION_DISTANCE);
    }
}
