use serde::Serialize;

use crate::render::CssColor;

use super::{DEFAULT_BAND_COLOR, DEFAULT_CURRENT_COLOR};

/// Proportional bar on a centred axis, with an optional recommended marker
/// read from another column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataBarSpec {
    pub col_idx: usize,
    pub min: f64,
    pub max: f64,
    pub recommended_idx: Option<usize>,
    /// Colour of the recommended marker and its guide line.
    pub line_color: CssColor,
}

/// Bounded bar that paints `exception_col_color` for non-numeric cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionBarSpec {
    pub col_idx: usize,
    pub min: f64,
    pub max: f64,
    pub exception_col_color: CssColor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeColors {
    pub long_term: CssColor,
    pub short_term: CssColor,
    pub current: CssColor,
}

impl Default for RangeColors {
    fn default() -> Self {
        Self {
            long_term: DEFAULT_BAND_COLOR.to_string(),
            short_term: DEFAULT_BAND_COLOR.to_string(),
            current: DEFAULT_CURRENT_COLOR.to_string(),
        }
    }
}

/// Long/short-term bands plus a current marker, drawn into a placeholder
/// column from five source columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeBandSpec {
    pub col_idx: usize,
    pub long_high_idx: usize,
    pub long_low_idx: usize,
    pub short_high_idx: usize,
    pub short_low_idx: usize,
    pub current_idx: usize,
    pub colors: RangeColors,
    pub low_text: Option<String>,
    pub high_text: Option<String>,
}

/// Up to three dots on a scale shared by the whole table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixedScaleSpec {
    pub col_idx: usize,
    pub min: f64,
    pub max: f64,
    pub dot_idx: [usize; 3],
    pub dot_colors: [CssColor; 3],
    pub line_color: CssColor,
    /// Thickness of the scale line in pixels.
    pub line_height: f64,
    pub tick_marks: bool,
}

/// A validated overlay attached to one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlaySpec {
    DataBar(DataBarSpec),
    ExceptionBar(ExceptionBarSpec),
    RangeBand(RangeBandSpec),
    FixedScaleBand(FixedScaleSpec),
}

impl OverlaySpec {
    /// Column the overlay is drawn into.
    pub fn col_idx(&self) -> usize {
        match self {
            Self::DataBar(s) => s.col_idx,
            Self::ExceptionBar(s) => s.col_idx,
            Self::RangeBand(s) => s.col_idx,
            Self::FixedScaleBand(s) => s.col_idx,
        }
    }

    /// Human-readable name used in errors and logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::DataBar(_) => "data bar",
            Self::ExceptionBar(_) => "exception bar",
            Self::RangeBand(_) => "range band",
            Self::FixedScaleBand(_) => "fixed-scale band",
        }
    }

    /// Every column index the overlay reads, paired with its field name.
    pub fn referenced_columns(&self) -> Vec<(&'static str, usize)> {
        match self {
            Self::DataBar(s) => {
                let mut cols = vec![("col_idx", s.col_idx)];
                if let Some(idx) = s.recommended_idx {
                    cols.push(("recommended_idx", idx));
                }
                cols
            }
            Self::ExceptionBar(s) => vec![("col_idx", s.col_idx)],
            Self::RangeBand(s) => vec![
                ("col_idx", s.col_idx),
                ("long_term_high_idx", s.long_high_idx),
                ("long_term_low_idx", s.long_low_idx),
                ("short_term_high_idx", s.short_high_idx),
                ("short_term_low_idx", s.short_low_idx),
                ("current_idx", s.current_idx),
            ],
            Self::FixedScaleBand(s) => {
                let [dot1, dot2, dot3] = s.dot_idx;
                vec![
                    ("col_idx", s.col_idx),
                    ("dot1_idx", dot1),
                    ("dot2_idx", dot2),
                    ("dot3_idx", dot3),
                ]
            }
        }
    }
}
