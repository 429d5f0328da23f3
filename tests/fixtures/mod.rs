//! Test fixtures for building table snapshots and configs in memory.
//!
//! # Example
//!
//! ```rust,ignore
//! use fixtures::{TableBuilder, text};
//!
//! let table = TableBuilder::new(&["Revenue", "Note"])
//!     .row("R 1", [2087627.0.into(), text("ok")])
//!     .build();
//! ```
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use clicktable::types::{CellEntry, CellValue, ColumnHeader, Row, TableSnapshot};
use serde_json::json;

// ============================================================================
// Table Builder
// ============================================================================

/// Builder for [`TableSnapshot`]s with flat or grouped headers.
pub struct TableBuilder {
    columns: Vec<ColumnHeader>,
    rows: Vec<Row>,
}

impl TableBuilder {
    /// One header per data column; `Group|Leaf` labels become two-level
    /// paths.
    pub fn new(headers: &[&str]) -> Self {
        let columns = headers
            .iter()
            .map(|h| match h.split_once('|') {
                Some((group, leaf)) => ColumnHeader::grouped(group, leaf),
                None => ColumnHeader::flat(*h),
            })
            .collect();
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Put `class` on the header of data column `col` (1-based, like every
    /// other column index).
    #[must_use]
    pub fn header_class(mut self, col: usize, class: &str) -> Self {
        let header = self.columns.remove(col - 1).with_class(class);
        self.columns.insert(col - 1, header);
        self
    }

    #[must_use]
    pub fn row<const N: usize>(mut self, index: &str, cells: [CellValue; N]) -> Self {
        assert_eq!(N, self.columns.len(), "fixture row {index} is ragged");
        self.rows.push(Row {
            index: CellValue::Text(index.to_string()),
            cells: cells.into_iter().map(CellEntry::new).collect(),
        });
        self
    }

    pub fn build(self) -> TableSnapshot {
        TableSnapshot {
            columns: self.columns,
            rows: self.rows,
        }
    }
}

/// Shorthand for text cells.
pub fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

pub fn num(n: f64) -> CellValue {
    CellValue::Number(n)
}

pub const EMPTY: CellValue = CellValue::Empty;

// ============================================================================
// Sample Dashboard
// ============================================================================

/// Column indices of the sample dashboard (0 is the index column).
pub mod col {
    pub const REVENUE: usize = 1;
    pub const REVENUE_TARGET: usize = 2;
    pub const MARGIN: usize = 3;
    pub const MARGIN_TARGET: usize = 4;
    pub const GROWTH: usize = 5;
    pub const CUSTOMER_SCORE: usize = 6;
    pub const EMPLOYEE_SCORE: usize = 7;
    pub const LT_HIGH: usize = 8;
    pub const LT_LOW: usize = 9;
    pub const ST_HIGH: usize = 10;
    pub const ST_LOW: usize = 11;
    pub const CURRENT: usize = 12;
    pub const RANGE_CHART: usize = 13;
    pub const COUNT: usize = 14;
}

/// Six-row sales dashboard with inputs for every overlay kind.
pub fn sample_table() -> TableSnapshot {
    TableBuilder::new(&[
        "Revenue",
        "Revenue Target",
        "Margin %",
        "Margin % Target",
        "Growth",
        "Customer Score",
        "Employee Score",
        "Long Term High",
        "Long Term Low",
        "Short Term High",
        "Short Term Low",
        "Current",
        "Range Chart",
    ])
    .row(
        "R 1",
        [
            num(2087627.0), num(2500000.0), num(83.5), num(90.0), num(0.987),
            text("Below Average"), num(45.0),
            num(1.290), num(0.260), num(1.176), num(0.871), num(0.0), EMPTY,
        ],
    )
    .row(
        "R 2",
        [
            num(-872765.0), num(-500000.0), num(-34.9), num(-20.0), num(-1.527),
            num(20.0), text("Good"),
            num(1.382), num(0.218), num(1.371), num(1.357), num(1.365), EMPTY,
        ],
    )
    .row(
        "R 3",
        [
            num(-145564.0), num(0.0), num(-11.7), num(60.0), num(-1.583),
            num(59.2), num(62.5),
            num(1.361), num(0.353), num(1.010), num(0.876), num(0.997), EMPTY,
        ],
    )
    .row(
        "R 4",
        [
            num(-337304.0), num(-200000.0), num(-33.7), num(-25.0), num(-1.475),
            num(33.2), num(28.7),
            num(1.268), num(0.296), num(1.153), num(1.043), num(1.110), EMPTY,
        ],
    )
    .row(
        "R 5",
        [
            num(74001.0), num(100000.0), num(7.4), num(10.0), num(-1.348),
            num(90.0), num(75.2),
            num(1.160), num(0.266), num(0.889), num(0.858), num(0.863), EMPTY,
        ],
    )
    .row(
        "Total",
        [
            num(805085.0), num(900000.0), num(32.2), num(40.0), num(-1.261),
            text("Above Average"), text("Excellent"),
            num(1.028), num(0.390), num(0.986), num(0.601), num(0.709), EMPTY,
        ],
    )
    .build()
}

/// Config for [`sample_table`], as the host sends it.
pub fn sample_config() -> serde_json::Value {
    json!({
        "data_bar_columns": [
            { "col_idx": 1, "min": -1000000, "max": 2500000 },
            { "col_idx": 3, "min": -50, "max": 100, "recommended_idx": 4, "line_color": "#000000" }
        ],
        "david_hum_columns": [
            { "col_idx": 6, "min": 0, "max": 100, "exception_col_color": "yellow" },
            { "col_idx": 7, "min": 0, "max": 100, "exception_col_color": "lightblue" }
        ],
        "range_chart": [{
            "col_idx": 13,
            "long_term_high_idx": 8,
            "long_term_low_idx": 9,
            "short_term_high_idx": 10,
            "short_term_low_idx": 11,
            "current_idx": 12,
            "long_term_color": "blue",
            "short_term_color": "green",
            "current_color": "black",
            "low_text": "Below Range"
        }],
        "idx_col_name": "Epoch",
        "column_width": [
            "100px", "130px", "130px", "100px", "130px", "100px", "130px", "130px",
            "100px", "100px", "100px", "100px", "100px", "150px"
        ],
        "hidden_columns": [2, 4, 8, 9, 10, 11],
        "max_height": "500px"
    })
}

/// Parse [`sample_config`] against [`sample_table`].
pub fn sample_render_config() -> clicktable::types::RenderConfig {
    let raw = serde_json::from_value(sample_config()).unwrap();
    clicktable::config::parse(&raw, col::COUNT).unwrap()
}
