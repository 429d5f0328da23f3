use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::geometry::parse_numeric;

/// Raw value of a single cell as delivered by the host.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl CellValue {
    /// Numeric reading of the cell.
    ///
    /// Text cells go through the same coercion as rendered text ("83.5%",
    /// "1,200"). Non-finite numbers count as non-numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Number(_) | Self::Empty => None,
            Self::Text(s) => parse_numeric(s),
        }
    }

    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }

    /// Plain text shown for the cell when the host supplied no markup.
    pub fn display_text(&self) -> String {
        match self {
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.trim().to_string(),
            Self::Empty => String::new(),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

/// Shortest round-trip formatting, `-0` shown as `0`.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    format!("{n}")
}

/// One cell of the table: raw value plus whatever the host pre-rendered.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "CellEntryRepr")]
pub struct CellEntry {
    pub value: CellValue,
    /// Pre-rendered inner markup; emitted verbatim instead of the value text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// Inline CSS from the host's own styling step (e.g. conditional colours).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl CellEntry {
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            display: None,
            style: None,
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    #[must_use]
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

/// Cells may be written as bare values or as full objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum CellEntryRepr {
    Full {
        value: CellValue,
        #[serde(default)]
        display: Option<String>,
        #[serde(default)]
        style: Option<String>,
    },
    Bare(CellValue),
}

impl From<CellEntryRepr> for CellEntry {
    fn from(repr: CellEntryRepr) -> Self {
        match repr {
            CellEntryRepr::Full {
                value,
                display,
                style,
            } => Self {
                value,
                display,
                style,
            },
            CellEntryRepr::Bare(value) => Self::new(value),
        }
    }
}

/// Header of a data column: a flat label or a multi-level path whose last
/// element is the leaf label.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "ColumnHeaderRepr")]
pub struct ColumnHeader {
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
}

impl ColumnHeader {
    pub fn flat(label: impl Into<String>) -> Self {
        Self {
            path: vec![label.into()],
            classes: Vec::new(),
        }
    }

    pub fn grouped(group: impl Into<String>, leaf: impl Into<String>) -> Self {
        Self {
            path: vec![group.into(), leaf.into()],
            classes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Bottom-level label.
    pub fn leaf(&self) -> &str {
        self.path.last().map_or("", String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Label at `level` once the path is bottom-aligned to `depth` levels.
    /// Missing upper levels read as empty strings.
    pub fn label_at(&self, level: usize, depth: usize) -> &str {
        let pad = depth.saturating_sub(self.path.len());
        if level < pad {
            return "";
        }
        self.path.get(level - pad).map_or("", String::as_str)
    }

    /// Group path above the leaf up to and including `level`, used to merge
    /// adjacent group headers that share a parent.
    pub(crate) fn prefix_key(&self, level: usize, depth: usize) -> Vec<&str> {
        (0..=level).map(|l| self.label_at(l, depth)).collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColumnHeaderRepr {
    Flat(String),
    Path(Vec<String>),
    Full {
        path: Vec<String>,
        #[serde(default)]
        classes: Vec<String>,
    },
}

impl From<ColumnHeaderRepr> for ColumnHeader {
    fn from(repr: ColumnHeaderRepr) -> Self {
        match repr {
            ColumnHeaderRepr::Flat(label) => Self::flat(label),
            ColumnHeaderRepr::Path(path) => Self {
                path,
                classes: Vec::new(),
            },
            ColumnHeaderRepr::Full { path, classes } => Self { path, classes },
        }
    }
}

/// A body row: its index label and one entry per data column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub index: CellValue,
    pub cells: Vec<CellEntry>,
}

/// Table supplied fresh for every render.
///
/// Column addressing: index 0 is the index (row label) column and data
/// column `i` lives at index `i + 1`. Overlay specs, `column_width` and
/// `hidden_columns` all use this space.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<Row>,
}

impl TableSnapshot {
    /// Number of addressable columns, index column included.
    pub fn column_count(&self) -> usize {
        self.columns.len() + 1
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of header rows needed for the deepest header path.
    pub fn header_depth(&self) -> usize {
        self.columns
            .iter()
            .map(|c| c.path.len())
            .max()
            .unwrap_or(1)
            .max(1)
    }

    /// Header of a data column. `None` for the index column and out-of-range
    /// indices.
    pub fn column(&self, col: usize) -> Option<&ColumnHeader> {
        col.checked_sub(1).and_then(|i| self.columns.get(i))
    }

    /// Leaf label of a data column.
    pub fn leaf_header(&self, col: usize) -> Option<&str> {
        self.column(col).map(ColumnHeader::leaf)
    }

    /// Entry at `(row, col)` for data columns.
    pub fn entry(&self, row: usize, col: usize) -> Option<&CellEntry> {
        let data_col = col.checked_sub(1)?;
        self.rows.get(row)?.cells.get(data_col)
    }

    /// Raw value at `(row, col)`; column 0 yields the row's index label.
    pub fn value(&self, row: usize, col: usize) -> Option<&CellValue> {
        let r = self.rows.get(row)?;
        match col.checked_sub(1) {
            None => Some(&r.index),
            Some(data_col) => r.cells.get(data_col).map(|e| &e.value),
        }
    }

    /// Check that all rows have one cell per data column.
    pub fn validate(&self) -> Result<(), TableError> {
        let expected = self.columns.len();
        for (row, r) in self.rows.iter().enumerate() {
            if r.cells.len() != expected {
                return Err(TableError::RaggedRow {
                    row,
                    expected,
                    actual: r.cells.len(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_accept_bare_and_full_forms() {
        let json = r#"{
            "columns": ["Revenue", ["Margin", "Value"], {"path": ["Score"], "classes": ["hide-column"]}],
            "rows": [
                {"index": "Q1", "cells": [2087627, {"value": "83.5%", "style": "background-color: pink"}, null]}
            ]
        }"#;
        let table: TableSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(table.column_count(), 4);
        assert_eq!(table.header_depth(), 2);
        assert_eq!(table.leaf_header(2), Some("Value"));
        assert!(table.column(3).unwrap().has_class("hide-column"));

        let row = &table.rows[0];
        assert_eq!(row.cells[0].value, CellValue::Number(2_087_627.0));
        assert_eq!(row.cells[1].style.as_deref(), Some("background-color: pink"));
        assert_eq!(row.cells[1].value.as_number(), Some(83.5));
        assert_eq!(row.cells[2].value, CellValue::Empty);
    }

    #[test]
    fn test_value_addressing_includes_index_column() {
        let table = TableSnapshot {
            columns: vec![ColumnHeader::flat("A")],
            rows: vec![Row {
                index: "R 1".into(),
                cells: vec![CellEntry::new(1.5)],
            }],
        };
        assert_eq!(table.value(0, 0), Some(&CellValue::Text("R 1".into())));
        assert_eq!(table.value(0, 1), Some(&CellValue::Number(1.5)));
        assert_eq!(table.value(0, 2), None);
        assert_eq!(table.value(1, 0), None);
        assert!(table.leaf_header(0).is_none());
    }

    #[test]
    fn test_validate_ragged_rows() {
        let table = TableSnapshot {
            columns: vec![ColumnHeader::flat("A"), ColumnHeader::flat("B")],
            rows: vec![Row {
                index: CellValue::Empty,
                cells: vec![CellEntry::new(1.0)],
            }],
        };
        assert_eq!(
            table.validate(),
            Err(TableError::RaggedRow {
                row: 0,
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_label_at_bottom_aligns_short_paths() {
        let flat = ColumnHeader::flat("Total");
        assert_eq!(flat.label_at(0, 2), "");
        assert_eq!(flat.label_at(1, 2), "Total");
        let grouped = ColumnHeader::grouped("Revenue", "Actual");
        assert_eq!(grouped.label_at(0, 2), "Revenue");
        assert_eq!(grouped.label_at(1, 2), "Actual");
    }

    #[test]
    fn test_display_text() {
        assert_eq!(CellValue::Number(100.0).display_text(), "100");
        assert_eq!(CellValue::Number(-0.0).display_text(), "0");
        assert_eq!(CellValue::Number(83.5).display_text(), "83.5");
        assert_eq!(CellValue::Text("  Good ".into()).display_text(), "Good");
        assert!(CellValue::Text("   ".into()).is_blank());
    }
}
