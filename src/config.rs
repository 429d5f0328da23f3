//! Render configuration: wire format and validation.
//!
//! The host sends one JSON object with a list per overlay kind. [`parse`]
//! checks every column reference once and produces a [`RenderConfig`] with a
//! closed list of [`OverlaySpec`]s, so nothing downstream re-validates.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::render::is_safe_css_value;
use crate::types::{
    DataBarSpec, ExceptionBarSpec, FixedScaleSpec, OverlaySpec, RangeBandSpec, RangeColors,
    RenderConfig, DEFAULT_BAND_COLOR, DEFAULT_CURRENT_COLOR, DEFAULT_DOT_COLOR,
    DEFAULT_HIDDEN_CLASS, DEFAULT_LINE_HEIGHT, DEFAULT_MARKER_COLOR, DEFAULT_MAX_HEIGHT,
    DEFAULT_SCALE_LINE_COLOR,
};

/// Configuration exactly as the host sends it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    #[serde(alias = "data_bar_columns")]
    pub data_bar_chart_columns: Vec<RawDataBar>,
    pub david_hum_columns: Vec<RawExceptionBar>,
    pub range_chart: Vec<RawRangeChart>,
    pub fixed_scale_range_chart: Vec<RawFixedScaleChart>,
    pub idx_col_name: Option<String>,
    pub column_width: Vec<String>,
    pub hidden_column_class: Option<String>,
    pub hidden_columns: Vec<usize>,
    pub bar_rounded: Option<bool>,
    pub max_height: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDataBar {
    pub col_idx: usize,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub recommended_idx: Option<usize>,
    #[serde(default)]
    pub line_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawExceptionBar {
    pub col_idx: usize,
    pub min: f64,
    pub max: f64,
    pub exception_col_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRangeChart {
    pub col_idx: usize,
    #[serde(alias = "long_high_idx")]
    pub long_term_high_idx: usize,
    #[serde(alias = "long_low_idx")]
    pub long_term_low_idx: usize,
    #[serde(alias = "short_high_idx")]
    pub short_term_high_idx: usize,
    #[serde(alias = "short_low_idx")]
    pub short_term_low_idx: usize,
    pub current_idx: usize,
    #[serde(default)]
    pub long_term_color: Option<String>,
    #[serde(default)]
    pub short_term_color: Option<String>,
    #[serde(default)]
    pub current_color: Option<String>,
    #[serde(default)]
    pub low_text: Option<String>,
    #[serde(default)]
    pub high_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFixedScaleChart {
    pub col_idx: usize,
    pub min: f64,
    pub max: f64,
    pub dot1_idx: usize,
    pub dot2_idx: usize,
    pub dot3_idx: usize,
    #[serde(default)]
    pub dot1_color: Option<String>,
    #[serde(default)]
    pub dot2_color: Option<String>,
    #[serde(default)]
    pub dot3_color: Option<String>,
    #[serde(default)]
    pub line_color: Option<String>,
    #[serde(default)]
    pub line_height: Option<f64>,
    #[serde(default)]
    pub tick_marks: Option<bool>,
}

fn or_default(color: Option<&String>, default: &str) -> String {
    color.map_or_else(|| default.to_string(), Clone::clone)
}

fn check_range(owner: &'static str, col_idx: usize, min: f64, max: f64) -> std::result::Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && min < max {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange {
            owner,
            col_idx,
            min,
            max,
        })
    }
}

fn check_index(
    owner: &'static str,
    field: &'static str,
    index: usize,
    column_count: usize,
) -> std::result::Result<(), ConfigError> {
    if index < column_count {
        Ok(())
    } else {
        Err(ConfigError::InvalidColumnIndex {
            owner,
            field,
            index,
            column_count,
        })
    }
}

impl RawDataBar {
    fn to_spec(&self) -> OverlaySpec {
        OverlaySpec::DataBar(DataBarSpec {
            col_idx: self.col_idx,
            min: self.min,
            max: self.max,
            recommended_idx: self.recommended_idx,
            line_color: or_default(self.line_color.as_ref(), DEFAULT_MARKER_COLOR),
        })
    }
}

impl RawExceptionBar {
    fn to_spec(&self) -> OverlaySpec {
        OverlaySpec::ExceptionBar(ExceptionBarSpec {
            col_idx: self.col_idx,
            min: self.min,
            max: self.max,
            exception_col_color: self.exception_col_color.clone(),
        })
    }
}

impl RawRangeChart {
    fn to_spec(&self) -> OverlaySpec {
        OverlaySpec::RangeBand(RangeBandSpec {
            col_idx: self.col_idx,
            long_high_idx: self.long_term_high_idx,
            long_low_idx: self.long_term_low_idx,
            short_high_idx: self.short_term_high_idx,
            short_low_idx: self.short_term_low_idx,
            current_idx: self.current_idx,
            colors: RangeColors {
                long_term: or_default(self.long_term_color.as_ref(), DEFAULT_BAND_COLOR),
                short_term: or_default(self.short_term_color.as_ref(), DEFAULT_BAND_COLOR),
                current: or_default(self.current_color.as_ref(), DEFAULT_CURRENT_COLOR),
            },
            low_text: self.low_text.clone(),
            high_text: self.high_text.clone(),
        })
    }
}

impl RawFixedScaleChart {
    fn to_spec(&self) -> OverlaySpec {
        OverlaySpec::FixedScaleBand(FixedScaleSpec {
            col_idx: self.col_idx,
            min: self.min,
            max: self.max,
            dot_idx: [self.dot1_idx, self.dot2_idx, self.dot3_idx],
            dot_colors: [
                or_default(self.dot1_color.as_ref(), DEFAULT_DOT_COLOR),
                or_default(self.dot2_color.as_ref(), DEFAULT_DOT_COLOR),
                or_default(self.dot3_color.as_ref(), DEFAULT_DOT_COLOR),
            ],
            line_color: or_default(self.line_color.as_ref(), DEFAULT_SCALE_LINE_COLOR),
            line_height: self.line_height.unwrap_or(DEFAULT_LINE_HEIGHT),
            tick_marks: self.tick_marks.unwrap_or(true),
        })
    }
}

/// Validate a raw configuration against a table with `column_count`
/// columns (index column included).
///
/// # Errors
/// Returns the first [`ConfigError`] found: hidden columns are checked
/// first, then `column_width` and `max_height`, then each overlay in
/// application order.
pub fn parse(raw: &RawConfig, column_count: usize) -> std::result::Result<RenderConfig, ConfigError> {
    for &idx in &raw.hidden_columns {
        check_index("hidden_columns", "index", idx, column_count)?;
    }

    if !raw.column_width.is_empty() && raw.column_width.len() != column_count {
        return Err(ConfigError::LengthMismatch {
            expected: column_count,
            actual: raw.column_width.len(),
        });
    }

    let css_values = raw
        .max_height
        .iter()
        .map(|v| ("max_height", v))
        .chain(raw.column_width.iter().map(|v| ("column_width", v)));
    for (field, value) in css_values {
        if !is_safe_css_value(value) {
            return Err(ConfigError::InvalidCssValue {
                field,
                value: value.clone(),
            });
        }
    }

    let overlays: Vec<OverlaySpec> = raw
        .data_bar_chart_columns
        .iter()
        .map(RawDataBar::to_spec)
        .chain(raw.david_hum_columns.iter().map(RawExceptionBar::to_spec))
        .chain(raw.range_chart.iter().map(RawRangeChart::to_spec))
        .chain(raw.fixed_scale_range_chart.iter().map(RawFixedScaleChart::to_spec))
        .collect();

    for spec in &overlays {
        let owner = spec.kind_name();
        for (field, index) in spec.referenced_columns() {
            check_index(owner, field, index, column_count)?;
        }
        match spec {
            OverlaySpec::DataBar(s) => check_range(owner, s.col_idx, s.min, s.max)?,
            OverlaySpec::ExceptionBar(s) => check_range(owner, s.col_idx, s.min, s.max)?,
            OverlaySpec::FixedScaleBand(s) => {
                check_range(owner, s.col_idx, s.min, s.max)?;
                if !(s.line_height.is_finite() && s.line_height > 0.0) {
                    return Err(ConfigError::InvalidLineHeight {
                        col_idx: s.col_idx,
                        line_height: s.line_height,
                    });
                }
            }
            OverlaySpec::RangeBand(_) => {}
        }
    }

    Ok(RenderConfig {
        overlays,
        idx_col_name: raw.idx_col_name.clone().unwrap_or_default(),
        column_width: raw.column_width.clone(),
        hidden_columns: raw.hidden_columns.iter().copied().collect(),
        hidden_column_class: raw
            .hidden_column_class
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HIDDEN_CLASS.to_string()),
        max_height: raw
            .max_height
            .clone()
            .unwrap_or_else(|| DEFAULT_MAX_HEIGHT.to_string()),
        bar_rounded: raw.bar_rounded.unwrap_or(true),
    })
}

/// Deserialize and validate a JSON configuration.
///
/// # Errors
/// Returns a JSON error for malformed input and a config error for a
/// well-formed config that doesn't fit the table.
pub fn parse_json(json: &str, column_count: usize) -> Result<RenderConfig> {
    let raw: RawConfig = serde_json::from_str(json)?;
    Ok(parse(&raw, column_count)?)
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
    use crate::error::ClickTableError;

    #[test]
    fn test_defaults_for_absent_fields() {
        let json = r#"{
            "fixed_scale_range_chart": [
                {"col_idx": 4, "min": -1.5, "max": 1.5, "dot1_idx": 1, "dot2_idx": 2, "dot3_idx": 3}
            ]
        }"#;
        let config = parse_json(json, 5).unwrap();
        assert!(config.bar_rounded);
        assert_eq!(config.hidden_column_class, "hide-column");
        assert_eq!(config.max_height, "800px");
        let OverlaySpec::FixedScaleBand(spec) = &config.overlays[0] else {
            panic!("expected fixed-scale band");
        };
        assert!(spec.tick_marks);
        assert_eq!(spec.line_height, 2.0);
        assert_eq!(spec.dot_colors, ["#9CA3AF", "#9CA3AF", "#9CA3AF"]);
        assert_eq!(spec.line_color, "#D1D5DB");
    }

    #[test]
    fn test_overlay_order_follows_kind_lists() {
        let json = r#"{
            "range_chart": [{"col_idx": 6, "long_term_high_idx": 1, "long_term_low_idx": 2,
                             "short_term_high_idx": 3, "short_term_low_idx": 4, "current_idx": 5}],
            "data_bar_chart_columns": [{"col_idx": 1, "min": -1, "max": 1}],
            "david_hum_columns": [{"col_idx": 2, "min": 0, "max": 100, "exception_col_color": "yellow"}]
        }"#;
        let config = parse_json(json, 7).unwrap();
        let kinds: Vec<&str> = config.overlays.iter().map(OverlaySpec::kind_name).collect();
        assert_eq!(kinds, ["data bar", "exception bar", "range band"]);
    }

    #[test]
    fn test_invalid_column_index() {
        let json = r#"{"data_bar_chart_columns": [{"col_idx": 1, "min": -1, "max": 1, "recommended_idx": 9}]}"#;
        let err = parse_json(json, 4).unwrap_err();
        let ClickTableError::Config(err) = err else {
            panic!("expected config error, got {err:?}");
        };
        assert_eq!(
            err,
            ConfigError::InvalidColumnIndex {
                owner: "data bar",
                field: "recommended_idx",
                index: 9,
                column_count: 4,
            }
        );
    }

    #[test]
    fn test_hidden_column_out_of_range() {
        let raw = RawConfig {
            hidden_columns: vec![2, 4],
            ..RawConfig::default()
        };
        assert!(matches!(
            parse(&raw, 4),
            Err(ConfigError::InvalidColumnIndex { index: 4, .. })
        ));
    }

    #[test]
    fn test_column_width_length_mismatch() {
        let raw = RawConfig {
            column_width: vec!["100px".into(), "200px".into()],
            ..RawConfig::default()
        };
        assert_eq!(
            parse(&raw, 3),
            Err(ConfigError::LengthMismatch {
                expected: 3,
                actual: 2
            })
        );
        // Empty widths are always fine.
        assert!(parse(&RawConfig::default(), 3).is_ok());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let json = r#"{"data_bar_chart_columns": [{"col_idx": 1, "min": 5, "max": -5}]}"#;
        let err = parse_json(json, 2).unwrap_err();
        assert!(matches!(
            err,
            ClickTableError::Config(ConfigError::InvalidRange { col_idx: 1, .. })
        ));
    }

    #[test]
    fn test_zero_line_height_rejected() {
        let json = r#"{"fixed_scale_range_chart": [
            {"col_idx": 4, "min": -1, "max": 1, "dot1_idx": 1, "dot2_idx": 2, "dot3_idx": 3, "line_height": 0}
        ]}"#;
        assert!(matches!(
            parse_json(json, 5),
            Err(ClickTableError::Config(ConfigError::InvalidLineHeight { .. }))
        ));
    }

    #[test]
    fn test_host_keys_and_aliases() {
        let json = r##"{
            "data_bar_columns": [{"col_idx": 1, "min": -1, "max": 1, "line_color": "#000000"}],
            "range_chart": [{"col_idx": 6, "long_high_idx": 1, "long_low_idx": 2,
                             "short_high_idx": 3, "short_low_idx": 4, "current_idx": 5,
                             "current_color": "black", "low_text": "Below"}],
            "idx_col_name": "Tenor Bucket",
            "hidden_column_class": "",
            "bar_rounded": false,
            "max_height": "300px",
            "unknown_key": 1
        }"##;
        let config = parse_json(json, 7).unwrap();
        assert_eq!(config.idx_col_name, "Tenor Bucket");
        assert_eq!(config.hidden_column_class, "hide-column");
        assert!(!config.bar_rounded);
        assert_eq!(config.max_height, "300px");
        let OverlaySpec::DataBar(bar) = &config.overlays[0] else {
            panic!("expected data bar");
        };
        assert_eq!(bar.line_color, "#000000");
        let OverlaySpec::RangeBand(band) = &config.overlays[1] else {
            panic!("expected range band");
        };
        assert_eq!(band.colors.current, "black");
        assert_eq!(band.colors.long_term, "#6B7280");
        assert_eq!(band.low_text.as_deref(), Some("Below"));
        assert_eq!(band.high_text, None);
    }
}
