//! Overlay rendering.
//!
//! This module provides:
//! - The overlay compositor (`render_table`)
//! - The rendered table model shared with the interaction layer
//! - HTML output and the stylesheet it expects
//! - Color utilities

pub mod colors;
pub mod html;
pub mod model;
pub mod overlay;

pub use colors::{adjust_color, palette, CssColor};
pub use html::{escape_html, is_safe_css_value, markup_text, BASE_STYLES};
pub use model::{
    CellOverlay, DataBarOverlay, ExceptionBarOverlay, FixedScaleOverlay, HeaderCell,
    RangeBandOverlay, RecommendedMarker, RenderedCell, RenderedRow, RenderedTable, Tooltip,
};
pub use overlay::render_table;
