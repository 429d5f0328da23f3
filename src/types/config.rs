use std::collections::BTreeSet;

use serde::Serialize;

use super::OverlaySpec;

/// Neutral grey used for dots and the recommended marker.
pub const DEFAULT_DOT_COLOR: &str = "#9CA3AF";
pub const DEFAULT_MARKER_COLOR: &str = "#9CA3AF";
pub const DEFAULT_SCALE_LINE_COLOR: &str = "#D1D5DB";
pub const DEFAULT_LINE_HEIGHT: f64 = 2.0;
pub const DEFAULT_BAND_COLOR: &str = "#6B7280";
pub const DEFAULT_CURRENT_COLOR: &str = "#111827";
pub const DEFAULT_HIDDEN_CLASS: &str = "hide-column";
/// Class used instead of the configured one when headers are multi-level, so
/// hidden cells keep their slot under group headers.
pub const ZERO_WIDTH_HIDDEN_CLASS: &str = "hide-column-zero-width";
pub const DEFAULT_MAX_HEIGHT: &str = "800px";

/// Validated configuration for one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderConfig {
    /// Overlays in application order; a later overlay on the same column wins.
    pub overlays: Vec<OverlaySpec>,
    /// Label shown above the index column.
    pub idx_col_name: String,
    /// CSS widths per column, index column first. Empty means browser layout.
    pub column_width: Vec<String>,
    pub hidden_columns: BTreeSet<usize>,
    /// Marker class: columns listed in `hidden_columns` get it, and columns
    /// whose header already carries it are treated as hidden.
    pub hidden_column_class: String,
    /// Container max height, forwarded to the host verbatim.
    pub max_height: String,
    /// Rounded (`true`) or square bar ends.
    pub bar_rounded: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            overlays: Vec::new(),
            idx_col_name: String::new(),
            column_width: Vec::new(),
            hidden_columns: BTreeSet::new(),
            hidden_column_class: DEFAULT_HIDDEN_CLASS.to_string(),
            max_height: DEFAULT_MAX_HEIGHT.to_string(),
            bar_rounded: true,
        }
    }
}

impl RenderConfig {
    pub fn width_of(&self, col: usize) -> Option<&str> {
        self.column_width.get(col).map(String::as_str)
    }
}
