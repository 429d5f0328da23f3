//! clicktable - clickable tables with in-cell charts for the web
//!
//! Renders a host-supplied table as HTML with overlays drawn into its cells:
//! - Data bars around a centred zero axis, with an optional recommended marker
//! - Exception bars that fall back to a flat color for non-numeric values
//! - Range bands showing long- and short-term ranges with the current value
//! - Fixed-scale bands with up to three markers on a scale shared by all rows
//!
//! Clicking a cell reports `{ rowIndex, header, cellValue }` back to the host.
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { ClickTable } from 'clicktable';
//! await init();
//! const table = new ClickTable(container, "my-table");
//! table.set_on_change((value) => console.log(value));
//! table.update(snapshot, config);
//! ```

pub mod bridge;
pub mod config;
pub mod csv;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod render;
pub mod types;

#[cfg(target_arch = "wasm32")]
pub mod viewer;

use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
pub use viewer::ClickTable;

pub use bridge::{HostBridge, HostMessage, HostTransport, Theme};
pub use error::{ClickTableError, ConfigError, TableError};
pub use interaction::{resolve_click, InteractionState};
pub use render::{render_table, RenderedTable};
pub use types::*;

/// Validate `config_json` against `table_json` and render the table.
///
/// # Errors
/// Returns an error if either input is malformed or the config
/// doesn't fit the table.
pub fn render_json(table_json: &str, config_json: &str) -> error::Result<RenderedTable> {
    let table: TableSnapshot = serde_json::from_str(table_json)?;
    table.validate()?;
    let config = config::parse_json(config_json, table.column_count())?;
    Ok(render_table(&table, &config))
}

/// Render a table and return the HTML fragment.
///
/// # Arguments
/// * `table_json` - Table snapshot as JSON
/// * `config_json` - Render configuration as JSON
///
/// # Errors
/// Returns an error if the table or config is invalid.
#[wasm_bindgen]
pub fn render_html(table_json: &str, config_json: &str) -> Result<String, JsValue> {
    render_json(table_json, config_json)
        .map(|rendered| rendered.to_html())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Resolve a click at `(row, col)` and return the selection event as JSON,
/// or `null` if the cell is not a click target.
///
/// # Errors
/// Returns an error if the table or config is invalid.
#[wasm_bindgen(js_name = "resolve_click")]
pub fn resolve_click_json(table_json: &str, config_json: &str, row: usize, col: usize) -> Result<String, JsValue> {
    let rendered = render_json(table_json, config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let value = resolve_click(&rendered, CellTarget::new(row, col))
        .map_or(ComponentValue::NoSelection, ComponentValue::Selected);
    serde_json::to_string(&value).map_err(|e| JsValue::from_str(&format!("JSON serialization error: {e}")))
}

/// Crate version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
