//! End-to-end rendering tests: snapshot + config in, rendered table and
//! HTML out.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod fixtures;

use clicktable::config;
use clicktable::geometry::{BarSide, LabelAnchor};
use clicktable::render::{
    render_table, CellOverlay, DataBarOverlay, ExceptionBarOverlay, RangeBandOverlay, RenderedTable,
};
use clicktable::render_json;
use clicktable::types::{CellEntry, RenderConfig, TableSnapshot};
use fixtures::{col, num, sample_render_config, sample_table, text, TableBuilder, EMPTY};
use serde_json::json;

fn render(table: &TableSnapshot, config: serde_json::Value) -> RenderedTable {
    let raw = serde_json::from_value(config).unwrap();
    let config = config::parse(&raw, table.column_count()).unwrap();
    render_table(table, &config)
}

fn overlay(rendered: &RenderedTable, row: usize, col: usize) -> &CellOverlay {
    rendered
        .cell(row, col)
        .and_then(|c| c.overlay.as_ref())
        .unwrap_or_else(|| panic!("no overlay at ({row}, {col})"))
}

fn data_bar(rendered: &RenderedTable, row: usize, col: usize) -> &DataBarOverlay {
    match overlay(rendered, row, col) {
        CellOverlay::DataBar(bar) => bar,
        other => panic!("expected data bar at ({row}, {col}), got {other:?}"),
    }
}

// =============================================================================
// Data bars
// =============================================================================

#[test]
fn test_data_bar_scales_each_side_against_its_bound() {
    let table = TableBuilder::new(&["Value"])
        .row("a", [num(100.0)])
        .row("b", [num(-50.0)])
        .build();
    let rendered = render(
        &table,
        json!({ "data_bar_columns": [{ "col_idx": 1, "min": -100, "max": 200 }] }),
    );

    let first = data_bar(&rendered, 0, 1);
    assert_eq!(first.geometry.side, BarSide::Positive);
    assert_eq!(first.geometry.length_fraction, 0.5);
    assert_eq!(first.label_anchor, LabelAnchor::CellStart);

    let second = data_bar(&rendered, 1, 1);
    assert_eq!(second.geometry.side, BarSide::Negative);
    assert_eq!(second.geometry.length_fraction, 0.5);
    assert_eq!(second.label_anchor, LabelAnchor::CellEnd);
}

#[test]
fn test_data_bar_values_outside_range_are_clamped() {
    let table = TableBuilder::new(&["Value"])
        .row("a", [num(500.0)])
        .row("b", [num(-500.0)])
        .build();
    let rendered = render(
        &table,
        json!({ "data_bar_columns": [{ "col_idx": 1, "min": -100, "max": 200 }] }),
    );
    assert_eq!(data_bar(&rendered, 0, 1).geometry.length_fraction, 1.0);
    assert_eq!(data_bar(&rendered, 1, 1).geometry.length_fraction, 1.0);
    assert_eq!(data_bar(&rendered, 1, 1).geometry.side, BarSide::Negative);
}

#[test]
fn test_recommended_marker_in_sample() {
    let rendered = render_table(&sample_table(), &sample_render_config());
    // Margin 83.5 against a 90 target on [-50, 100]
    let bar = data_bar(&rendered, 0, col::MARGIN);
    let marker = bar.marker.as_ref().unwrap();
    assert!((marker.position - 0.95).abs() < 1e-9);
    assert_eq!(marker.color, "#000000");
    assert_eq!(marker.tooltip.text(), "Margin %: 83.5\nMargin % Target: 90");
    // Marker guide runs right of the axis, so the label moves left of it
    assert_eq!(bar.label_anchor, LabelAnchor::BeforeAxis);
}

#[test]
fn test_bar_labels_show_host_formatted_text() {
    let mut table = TableBuilder::new(&["Yield", "Score"])
        .row("a", [num(0.0123), num(40.0)])
        .build();
    table.rows[0].cells[0] = CellEntry::new(0.0123).with_display("1.23%");
    let rendered = render(
        &table,
        json!({
            "data_bar_columns": [{ "col_idx": 1, "min": -0.05, "max": 0.05 }],
            "david_hum_columns": [{ "col_idx": 2, "min": 0, "max": 100, "exception_col_color": "red" }]
        }),
    );

    assert_eq!(data_bar(&rendered, 0, 1).label, "1.23%");
    let CellOverlay::ExceptionBar(ExceptionBarOverlay::Bar { label, .. }) = overlay(&rendered, 0, 2)
    else {
        panic!("expected exception bar");
    };
    assert_eq!(label, "40%");
    assert!(rendered.to_html().contains(">1.23%</div>"));
}

#[test]
fn test_text_in_data_bar_column_degrades_to_neutral() {
    let table = TableBuilder::new(&["Value"]).row("a", [text("n/a")]).row("b", [EMPTY]).build();
    let rendered = render(
        &table,
        json!({ "data_bar_columns": [{ "col_idx": 1, "min": -1, "max": 1 }] }),
    );
    assert_eq!(overlay(&rendered, 0, 1), &CellOverlay::Neutral);
    assert_eq!(overlay(&rendered, 1, 1), &CellOverlay::Neutral);
    assert!(rendered.to_html().contains(">n/a</td>"));
}

// =============================================================================
// Exception bars
// =============================================================================

#[test]
fn test_exception_bar_in_sample() {
    let rendered = render_table(&sample_table(), &sample_render_config());

    match overlay(&rendered, 0, col::CUSTOMER_SCORE) {
        CellOverlay::ExceptionBar(ExceptionBarOverlay::Exception { color, text }) => {
            assert_eq!(color, "yellow");
            assert_eq!(text, "Below Average");
        }
        other => panic!("expected exception block, got {other:?}"),
    }

    match overlay(&rendered, 2, col::CUSTOMER_SCORE) {
        CellOverlay::ExceptionBar(ExceptionBarOverlay::Bar { fraction, label }) => {
            assert!((fraction - 0.592).abs() < 1e-9);
            assert_eq!(label, "59.2%");
        }
        other => panic!("expected bar, got {other:?}"),
    }

    match overlay(&rendered, 1, col::EMPLOYEE_SCORE) {
        CellOverlay::ExceptionBar(ExceptionBarOverlay::Exception { color, .. }) => {
            assert_eq!(color, "lightblue");
        }
        other => panic!("expected exception block, got {other:?}"),
    }
}

// =============================================================================
// Range bands
// =============================================================================

#[test]
fn test_range_band_reads_hidden_columns() {
    let rendered = render_table(&sample_table(), &sample_render_config());
    for hidden in [col::LT_HIGH, col::LT_LOW, col::ST_HIGH, col::ST_LOW] {
        assert!(rendered.is_hidden(hidden));
    }

    // Row R 3: inside both bands
    match overlay(&rendered, 2, col::RANGE_CHART) {
        CellOverlay::RangeBand(RangeBandOverlay::Chart { geometry, colors }) => {
            assert!(geometry.out_of_range.is_none());
            assert!(geometry.long_band.start.abs() < 1e-9);
            assert!((geometry.long_band.end - 1.0).abs() < 1e-9);
            assert_eq!(colors.long_term, "blue");
            assert_eq!(colors.short_term, "green");
            assert_eq!(colors.current, "black");
        }
        other => panic!("expected range chart, got {other:?}"),
    }
}

#[test]
fn test_range_band_low_text_replaces_chart() {
    let rendered = render_table(&sample_table(), &sample_render_config());
    // Row R 1: current 0 is below both lows
    assert_eq!(
        overlay(&rendered, 0, col::RANGE_CHART),
        &CellOverlay::RangeBand(RangeBandOverlay::Text("Below Range".into()))
    );
}

#[test]
fn test_range_band_without_text_still_charts_when_out_of_range() {
    let table = TableBuilder::new(&["LH", "LL", "SH", "SL", "Cur", "Chart"])
        .row("a", [num(10.0), num(0.0), num(8.0), num(2.0), num(12.0), EMPTY])
        .build();
    let rendered = render(
        &table,
        json!({ "range_chart": [{
            "col_idx": 6, "long_term_high_idx": 1, "long_term_low_idx": 2,
            "short_term_high_idx": 3, "short_term_low_idx": 4, "current_idx": 5,
            "low_text": "Low"
        }] }),
    );
    match overlay(&rendered, 0, 6) {
        CellOverlay::RangeBand(RangeBandOverlay::Chart { geometry, .. }) => {
            assert!(geometry.out_of_range.is_some());
            assert!((geometry.current_position - 1.0).abs() < 1e-9);
        }
        other => panic!("expected range chart, got {other:?}"),
    }
}

#[test]
fn test_range_band_with_non_numeric_input_is_empty() {
    let table = TableBuilder::new(&["LH", "LL", "SH", "SL", "Cur", "Chart"])
        .row("a", [num(10.0), text("?"), num(8.0), num(2.0), num(5.0), EMPTY])
        .build();
    let rendered = render(
        &table,
        json!({ "range_chart": [{
            "col_idx": 6, "long_term_high_idx": 1, "long_term_low_idx": 2,
            "short_term_high_idx": 3, "short_term_low_idx": 4, "current_idx": 5
        }] }),
    );
    assert_eq!(overlay(&rendered, 0, 6), &CellOverlay::RangeBand(RangeBandOverlay::Empty));
}

// =============================================================================
// Fixed-scale bands
// =============================================================================

#[test]
fn test_fixed_scale_reads_hidden_dot_columns() {
    let table = TableBuilder::new(&["A", "B", "C", "Chart"])
        .row("a", [num(-1.0), num(0.0), num(2.0), EMPTY])
        .build();
    let rendered = render(
        &table,
        json!({
            "fixed_scale_range_chart": [{
                "col_idx": 4, "min": -2, "max": 2,
                "dot1_idx": 1, "dot2_idx": 2, "dot3_idx": 3,
                "dot1_color": "red", "tick_marks": false
            }],
            "hidden_columns": [1, 2, 3]
        }),
    );
    match overlay(&rendered, 0, 4) {
        CellOverlay::FixedScale(scale) => {
            assert_eq!(scale.geometry.dot_positions, [Some(0.25), Some(0.5), Some(1.0)]);
            assert_eq!(scale.dot_colors[0], "red");
            assert!(!scale.tick_marks);
        }
        other => panic!("expected fixed-scale band, got {other:?}"),
    }
    let html = rendered.to_html();
    assert!(!html.contains("class=\"ticks\""));
    assert_eq!(html.matches("class=\"dot\"").count(), 3);
}

// =============================================================================
// Composition
// =============================================================================

#[test]
fn test_later_overlay_on_same_column_wins() {
    let table = TableBuilder::new(&["Value"]).row("a", [num(50.0)]).build();
    let rendered = render(
        &table,
        json!({
            "data_bar_columns": [{ "col_idx": 1, "min": -100, "max": 100 }],
            "david_hum_columns": [{ "col_idx": 1, "min": 0, "max": 100, "exception_col_color": "red" }]
        }),
    );
    assert!(matches!(
        overlay(&rendered, 0, 1),
        CellOverlay::ExceptionBar(ExceptionBarOverlay::Bar { .. })
    ));
}

#[test]
fn test_render_is_idempotent() {
    let table = sample_table();
    let config = sample_render_config();
    let first = render_table(&table, &config);
    let second = render_table(&table, &config);
    assert_eq!(first, second);
    assert_eq!(first.to_html(), second.to_html());
}

#[test]
fn test_render_json_matches_render_table() {
    let table = sample_table();
    let from_json = render_json(
        &serde_json::to_string(&table).unwrap(),
        &fixtures::sample_config().to_string(),
    )
    .unwrap();
    assert_eq!(from_json, render_table(&table, &sample_render_config()));
}

// =============================================================================
// HTML
// =============================================================================

#[test]
fn test_html_marks_hidden_cells() {
    let rendered = render_table(&sample_table(), &sample_render_config());
    let html = rendered.to_html();
    assert!(html.contains("class=\"hide-column\" data-row=\"0\" data-col=\"2\""));
    assert!(html.contains("data-hidden=\"true\""));
    assert!(html.contains("data-col=\"2\" style=\"display:none\""));
    assert!(html.contains("style=\"width:150px\""));
    assert!(html.contains(">Epoch</th>"));
}

#[test]
fn test_html_escapes_text_and_keeps_markup() {
    let mut table = TableBuilder::new(&["<Name>", "Link"])
        .row("a & b", [text("x < y"), EMPTY])
        .build();
    table.rows[0].cells[1] = CellEntry::new("ignored").with_display("<a href=\"#\">open</a>");
    let rendered = render_table(&table, &RenderConfig::default());
    let html = rendered.to_html();
    assert!(html.contains(">&lt;Name&gt;</th>"));
    assert!(html.contains(">a &amp; b</th>"));
    assert!(html.contains(">x &lt; y</td>"));
    assert!(html.contains("<a href=\"#\">open</a>"));
}

#[test]
fn test_html_tooltip_attribute() {
    let rendered = render_table(&sample_table(), &sample_render_config());
    let html = rendered.to_html();
    assert!(html.contains("data-tooltip=\"Margin %: 83.5\nMargin % Target: 90\""));
}

#[test]
fn test_multi_level_headers_use_zero_width_hiding() {
    let table = TableBuilder::new(&["Sales|Actual", "Sales|Target", "Risk|Score"])
        .row("a", [num(1.0), num(2.0), num(3.0)])
        .build();
    let rendered = render(&table, json!({ "hidden_columns": [2] }));
    assert!(rendered.is_multi_level());
    let html = rendered.to_html();
    assert!(html.contains("colspan=\"2\""));
    assert!(html.contains("class=\"hide-column-zero-width\""));
    assert!(!html.contains("class=\"hide-column\""));
}

#[test]
fn test_square_bars() {
    let table = TableBuilder::new(&["Value"]).row("a", [num(1.0)]).build();
    let rendered = render(
        &table,
        json!({ "data_bar_columns": [{ "col_idx": 1, "min": -2, "max": 2 }], "bar_rounded": false }),
    );
    let html = rendered.to_html();
    assert!(html.contains("border-radius:0px"));
    assert!(!html.contains("border-radius:9px"));
}

#[test]
fn test_document_sets_theme_variables() {
    let rendered = render_table(&sample_table(), &sample_render_config());
    let vars = clicktable::Theme::default().css_variables(&rendered.max_height);
    let doc = rendered.to_document(&vars);
    assert!(doc.starts_with("<!DOCTYPE html>"));
    assert!(doc.contains("--max-height:500px;"));
    assert!(doc.contains("--border-color:#e4e6ea;"));
}
