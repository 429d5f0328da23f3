//! Tests for render configuration validation.
//!
//! Configs arrive as JSON from the host and are checked against the table's
//! column count before anything is rendered.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod fixtures;

use clicktable::config::{parse, parse_json, RawConfig};
use clicktable::types::{OverlaySpec, DEFAULT_HIDDEN_CLASS, DEFAULT_MAX_HEIGHT};
use clicktable::{ClickTableError, ConfigError};
use fixtures::{col, sample_config, sample_render_config};
use serde_json::json;
use test_case::test_case;

fn raw(value: serde_json::Value) -> RawConfig {
    serde_json::from_value(value).unwrap()
}

// =============================================================================
// Accepted configs
// =============================================================================

#[test]
fn test_sample_config_parses() {
    let config = sample_render_config();
    assert_eq!(config.overlays.len(), 5);
    assert_eq!(config.idx_col_name, "Epoch");
    assert_eq!(config.max_height, "500px");
    assert_eq!(config.width_of(0), Some("100px"));
    assert_eq!(config.width_of(col::RANGE_CHART), Some("150px"));
    assert!(config.hidden_columns.contains(&col::LT_HIGH));
    assert!(config.bar_rounded);
}

#[test]
fn test_overlays_keep_application_order() {
    let kinds: Vec<&str> = sample_render_config()
        .overlays
        .iter()
        .map(OverlaySpec::kind_name)
        .collect();
    assert_eq!(
        kinds,
        vec!["data bar", "data bar", "exception bar", "exception bar", "range band"]
    );
}

#[test]
fn test_empty_config_uses_defaults() {
    let config = parse(&RawConfig::default(), 3).unwrap();
    assert!(config.overlays.is_empty());
    assert_eq!(config.hidden_column_class, DEFAULT_HIDDEN_CLASS);
    assert_eq!(config.max_height, DEFAULT_MAX_HEIGHT);
    assert!(config.column_width.is_empty());
}

#[test]
fn test_blank_hidden_class_falls_back() {
    let config = parse(&raw(json!({ "hidden_column_class": "  " })), 3).unwrap();
    assert_eq!(config.hidden_column_class, DEFAULT_HIDDEN_CLASS);
}

#[test]
fn test_range_chart_short_keys_and_default_colors() {
    let config = parse(
        &raw(json!({
            "range_chart": [{
                "col_idx": 6,
                "long_high_idx": 1, "long_low_idx": 2,
                "short_high_idx": 3, "short_low_idx": 4,
                "current_idx": 5
            }]
        })),
        7,
    )
    .unwrap();
    let OverlaySpec::RangeBand(spec) = &config.overlays[0] else {
        panic!("expected range band");
    };
    assert_eq!(spec.long_high_idx, 1);
    assert_eq!(spec.colors.long_term, "#6B7280");
    assert_eq!(spec.colors.current, "#111827");
    assert!(spec.low_text.is_none());
}

#[test]
fn test_fixed_scale_defaults() {
    let config = parse(
        &raw(json!({
            "fixed_scale_range_chart": [{
                "col_idx": 4, "min": -1, "max": 1,
                "dot1_idx": 1, "dot2_idx": 2, "dot3_idx": 3,
                "dot2_color": "red"
            }]
        })),
        5,
    )
    .unwrap();
    let OverlaySpec::FixedScaleBand(spec) = &config.overlays[0] else {
        panic!("expected fixed-scale band");
    };
    assert_eq!(spec.dot_idx, [1, 2, 3]);
    assert_eq!(spec.dot_colors, ["#9CA3AF".to_string(), "red".to_string(), "#9CA3AF".to_string()]);
    assert_eq!(spec.line_color, "#D1D5DB");
    assert_eq!(spec.line_height, 2.0);
    assert!(spec.tick_marks);
}

// =============================================================================
// Rejected configs
// =============================================================================

#[test]
fn test_recommended_idx_out_of_bounds() {
    let err = parse(
        &raw(json!({ "data_bar_columns": [{ "col_idx": 1, "min": -1, "max": 1, "recommended_idx": 9 }] })),
        3,
    )
    .unwrap_err();
    assert_eq!(
        err,
        ConfigError::InvalidColumnIndex {
            owner: "data bar",
            field: "recommended_idx",
            index: 9,
            column_count: 3,
        }
    );
}

#[test_case(json!({ "david_hum_columns": [{ "col_idx": 3, "min": 0, "max": 1, "exception_col_color": "red" }] }), "col_idx"; "exception bar target")]
#[test_case(json!({ "hidden_columns": [0, 3] }), "index"; "hidden column")]
#[test_case(json!({ "fixed_scale_range_chart": [{ "col_idx": 1, "min": 0, "max": 1, "dot1_idx": 2, "dot2_idx": 2, "dot3_idx": 7 }] }), "dot3_idx"; "third dot")]
#[test_case(json!({ "range_chart": [{ "col_idx": 1, "long_term_high_idx": 2, "long_term_low_idx": 2, "short_term_high_idx": 2, "short_term_low_idx": 2, "current_idx": 3 }] }), "current_idx"; "range current")]
fn test_index_out_of_bounds(config: serde_json::Value, expected_field: &str) {
    match parse(&raw(config), 3) {
        Err(ConfigError::InvalidColumnIndex { field, column_count, .. }) => {
            assert_eq!(field, expected_field);
            assert_eq!(column_count, 3);
        }
        other => panic!("expected InvalidColumnIndex, got {other:?}"),
    }
}

#[test]
fn test_column_width_length_mismatch() {
    let err = parse(&raw(json!({ "column_width": ["10px", "20px"] })), 3).unwrap_err();
    assert_eq!(err, ConfigError::LengthMismatch { expected: 3, actual: 2 });
}

#[test_case(json!({ "max_height": "1px}</style><script>" }), "max_height"; "max height breaks out")]
#[test_case(json!({ "column_width": ["10px", "20px;color:red"] }), "column_width"; "width adds a declaration")]
fn test_unsafe_css_value_rejected(config: serde_json::Value, expected_field: &str) {
    match parse(&raw(config), 2).unwrap_err() {
        ConfigError::InvalidCssValue { field, .. } => assert_eq!(field, expected_field),
        other => panic!("expected unsafe CSS rejection, got {other:?}"),
    }
}

#[test]
fn test_plain_css_lengths_accepted() {
    let config = parse(
        &raw(json!({ "max_height": "calc(100vh - 2rem)", "column_width": ["10%", "auto"] })),
        2,
    )
    .unwrap();
    assert_eq!(config.max_height, "calc(100vh - 2rem)");
}

#[test_case(1.0, 1.0; "empty range")]
#[test_case(5.0, -5.0; "inverted range")]
fn test_invalid_range(min: f64, max: f64) {
    let err = parse(
        &raw(json!({ "data_bar_columns": [{ "col_idx": 1, "min": min, "max": max }] })),
        2,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRange { col_idx: 1, .. }));
}

#[test]
fn test_invalid_line_height() {
    let err = parse(
        &raw(json!({
            "fixed_scale_range_chart": [{
                "col_idx": 1, "min": 0, "max": 1,
                "dot1_idx": 1, "dot2_idx": 1, "dot3_idx": 1,
                "line_height": 0
            }]
        })),
        2,
    )
    .unwrap_err();
    assert_eq!(err, ConfigError::InvalidLineHeight { col_idx: 1, line_height: 0.0 });
}

#[test]
fn test_hidden_columns_checked_before_overlays() {
    let err = parse(
        &raw(json!({
            "hidden_columns": [5],
            "data_bar_columns": [{ "col_idx": 9, "min": 0, "max": 1 }]
        })),
        3,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidColumnIndex { owner: "hidden_columns", .. }));
}

#[test]
fn test_parse_json_reports_malformed_input() {
    assert!(matches!(parse_json("{ not json", 3), Err(ClickTableError::Json(_))));
    assert!(matches!(
        parse_json(&sample_config().to_string(), 5),
        Err(ClickTableError::Config(ConfigError::InvalidColumnIndex {
            owner: "hidden_columns",
            index: 8,
            ..
        }))
    ));
}
