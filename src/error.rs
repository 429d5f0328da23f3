//! Structured error types for clicktable.
//!
//! Configuration problems are hard errors surfaced to the host; malformed
//! cell values are not errors at all (see [`crate::geometry`]).

/// Rejections raised while validating a render configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// An overlay (or the hidden column list) points outside the table.
    #[error("{owner} `{field}` references column {index}, but the table has {column_count} columns")]
    InvalidColumnIndex {
        owner: &'static str,
        field: &'static str,
        index: usize,
        column_count: usize,
    },

    /// `column_width` is non-empty and does not cover every column.
    #[error("column_width has {actual} entries, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A scale whose bounds are not finite or not increasing.
    #[error("{owner} on column {col_idx} has an invalid range [{min}, {max}]")]
    InvalidRange {
        owner: &'static str,
        col_idx: usize,
        min: f64,
        max: f64,
    },

    /// Fixed-scale line thickness must be a positive pixel count.
    #[error("fixed-scale band on column {col_idx} has invalid line_height {line_height}")]
    InvalidLineHeight { col_idx: usize, line_height: f64 },

    /// A value spliced into inline CSS could break out of its declaration.
    #[error("`{field}` value {value:?} is not a safe CSS value")]
    InvalidCssValue { field: &'static str, value: String },
}

/// Structural problems with a table snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// Every row must carry one cell per data column.
    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// All errors that can occur while loading, configuring and rendering a table.
#[derive(Debug, thiserror::Error)]
pub enum ClickTableError {
    /// Configuration failed validation.
    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),

    /// Table snapshot is malformed.
    #[error("Invalid table: {0}")]
    Table(#[from] TableError),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Host transport failure.
    #[error("Host transport: {0}")]
    Transport(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClickTableError>;

#[cfg(target_arch = "wasm32")]
impl From<ClickTableError> for wasm_bindgen::JsValue {
    fn from(e: ClickTableError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
