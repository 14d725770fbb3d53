//! Editor preferences.
//!
//! Every value has a default; hosts override individual keys with a partial
//! JSON object (`{"gridSize": 20}`).

use serde::{Deserialize, Serialize};

/// Tunables for snapping, history, handles, and placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Grid pitch in canvas pixels.
    pub grid_size: f64,
    /// Distance under which grid and guide snapping engage.
    pub snap_threshold: f64,
    pub snap_to_grid: bool,
    pub show_grid: bool,
    /// Draw the canvas-center crosshair.
    pub show_center_guides: bool,

    /// Maximum number of history entries kept.
    pub history_depth: usize,
    /// Snapshots closer together than this collapse into one entry. A
    /// tuning value, not a contract.
    pub history_debounce_ms: f64,

    /// Fields never shrink below this width or height.
    pub min_field_size: f64,
    /// Handle edge length in screen pixels (divided by the display scale).
    pub handle_size: f64,
    /// Distance of the rotate handle above the top edge, in screen pixels.
    pub rotate_handle_offset: f64,

    /// Offset applied to both axes when duplicating.
    pub duplicate_offset: f64,
    pub nudge_step: f64,
    pub nudge_step_large: f64,
    /// Opacity multiplier for the staging ghost.
    pub staging_opacity: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: 10.0,
            snap_threshold: 15.0,
            snap_to_grid: true,
            show_grid: false,
            show_center_guides: false,
            history_depth: 50,
            history_debounce_ms: 100.0,
            min_field_size: 10.0,
            handle_size: 10.0,
            rotate_handle_offset: 30.0,
            duplicate_offset: 20.0,
            nudge_step: 1.0,
            nudge_step_large: 10.0,
            staging_opacity: 0.5,
        }
    }
}

impl EditorConfig {
    /// Parse a partial JSON override on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid editor config: {e}"))
    }
}
