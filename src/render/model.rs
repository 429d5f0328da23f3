//! Rendered table: the table plus the overlay layer attached to each cell.
//!
//! This is the structure the HTML writer and the interaction layer share.
//! It is plain data, compared whole in tests to check render idempotence.

use crate::geometry::{
    DataBarGeometry, FixedScaleGeometry, LabelAnchor, RangeBandGeometry,
};
use crate::render::CssColor;
use crate::types::{CellValue, RangeColors};

/// Text shown while hovering a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub lines: Vec<String>,
}

impl Tooltip {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendedMarker {
    /// Offset across the whole cell; 0.5 is the axis.
    pub position: f64,
    pub color: CssColor,
    pub tooltip: Tooltip,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataBarOverlay {
    pub geometry: DataBarGeometry,
    pub label: String,
    pub label_anchor: LabelAnchor,
    pub marker: Option<RecommendedMarker>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExceptionBarOverlay {
    Bar { fraction: f64, label: String },
    Exception { color: CssColor, text: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RangeBandOverlay {
    Chart {
        geometry: RangeBandGeometry,
        colors: RangeColors,
    },
    /// Current value outside both bands, with configured text.
    Text(String),
    /// One of the five source values was unusable.
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixedScaleOverlay {
    pub geometry: FixedScaleGeometry,
    pub dot_colors: [CssColor; 3],
    pub line_color: CssColor,
    pub line_height: f64,
    pub tick_marks: bool,
}

/// Visual layer composited onto a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellOverlay {
    DataBar(DataBarOverlay),
    ExceptionBar(ExceptionBarOverlay),
    RangeBand(RangeBandOverlay),
    FixedScale(FixedScaleOverlay),
    /// Value couldn't be charted; the cell keeps its plain content.
    Neutral,
}

impl CellOverlay {
    pub fn tooltip(&self) -> Option<&Tooltip> {
        match self {
            Self::DataBar(bar) => bar.marker.as_ref().map(|m| &m.tooltip),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCell {
    pub col: usize,
    /// Raw value, reported on click.
    pub value: CellValue,
    /// Plain text of the cell, HTML-escaped on output.
    pub text: String,
    /// Host markup, emitted verbatim in place of `text`.
    pub markup: Option<String>,
    pub style: Option<String>,
    pub hidden: bool,
    pub overlay: Option<CellOverlay>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow {
    pub index: usize,
    /// One cell per column; `cells[0]` is the index label.
    pub cells: Vec<RenderedCell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub text: String,
    pub colspan: usize,
    /// Leaf column this header sits over; `None` for group headers.
    pub col: Option<usize>,
    pub width: Option<String>,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTable {
    /// Top (outermost group) to bottom (leaf labels).
    pub header_rows: Vec<Vec<HeaderCell>>,
    pub rows: Vec<RenderedRow>,
    /// Leaf label per column; `leaf_headers[0]` is the index column name.
    pub leaf_headers: Vec<String>,
    pub hidden_columns: Vec<bool>,
    /// Class put on hidden cells in the HTML output.
    pub hidden_class: String,
    pub bar_rounded: bool,
    pub max_height: String,
}

impl RenderedTable {
    pub fn column_count(&self) -> usize {
        self.leaf_headers.len()
    }

    pub fn is_multi_level(&self) -> bool {
        self.header_rows.len() > 1
    }

    pub fn is_hidden(&self, col: usize) -> bool {
        self.hidden_columns.get(col).copied().unwrap_or(false)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&RenderedCell> {
        self.rows.get(row)?.cells.get(col)
    }

    pub fn header(&self, col: usize) -> Option<&str> {
        self.leaf_headers.get(col).map(String::as_str)
    }
}
