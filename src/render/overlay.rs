//! Overlay compositor.
//!
//! Walks every configured overlay over every row, reads the source values
//! from the snapshot, asks [`crate::geometry`] for the shapes and attaches
//! the result to the target cell. Rendering never fails: a cell whose values
//! can't be charted degrades to a neutral overlay and the rest of the table
//! renders normally.

use tracing::{debug, trace};

use crate::geometry::{
    data_bar_geometry, exception_bar_geometry, fixed_scale_geometry, label_anchor,
    range_band_geometry, recommended_marker_geometry, ExceptionBarGeometry, RangeBandValues,
};
use crate::types::{
    format_number, CellValue, DataBarSpec, ExceptionBarSpec, FixedScaleSpec, OverlaySpec,
    RangeBandSpec, RenderConfig, Row, TableSnapshot, ZERO_WIDTH_HIDDEN_CLASS,
};

use super::html::markup_text;
use super::model::{
    CellOverlay, DataBarOverlay, ExceptionBarOverlay, FixedScaleOverlay, HeaderCell,
    RangeBandOverlay, RecommendedMarker, RenderedCell, RenderedRow, RenderedTable, Tooltip,
};

/// Compose the overlay layer for `table` under `config`.
///
/// `config` must have been validated against this table (see
/// [`crate::config::parse`]); indices that still miss are skipped.
pub fn render_table(table: &TableSnapshot, config: &RenderConfig) -> RenderedTable {
    let column_count = table.column_count();

    let hidden_columns: Vec<bool> = (0..column_count)
        .map(|col| {
            config.hidden_columns.contains(&col)
                || table
                    .column(col)
                    .is_some_and(|h| h.has_class(&config.hidden_column_class))
        })
        .collect();

    let leaf_headers: Vec<String> = (0..column_count)
        .map(|col| {
            if col == 0 {
                config.idx_col_name.clone()
            } else {
                table.leaf_header(col).unwrap_or_default().to_string()
            }
        })
        .collect();

    let header_rows = header_rows(table, config, &hidden_columns);

    let mut rows: Vec<RenderedRow> = table
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| base_row(index, row, &hidden_columns))
        .collect();

    for spec in &config.overlays {
        let col = spec.col_idx();
        for rendered in &mut rows {
            let row = rendered.index;
            let overlay = match spec {
                OverlaySpec::DataBar(s) => Some(data_bar(s, table, row, &leaf_headers)),
                OverlaySpec::ExceptionBar(s) => exception_bar(s, table, row),
                OverlaySpec::RangeBand(s) => Some(range_band(s, table, row)),
                OverlaySpec::FixedScaleBand(s) => fixed_scale(s, table, row),
            };
            let (Some(overlay), Some(cell)) = (overlay, rendered.cells.get_mut(col)) else {
                continue;
            };
            if cell.overlay.is_some() {
                trace!(row, col, kind = spec.kind_name(), "overlay replaces an earlier one");
            }
            cell.overlay = Some(overlay);
        }
    }

    let multi_level = header_rows.len() > 1;
    trace!(
        rows = rows.len(),
        columns = column_count,
        overlays = config.overlays.len(),
        multi_level,
        "rendered table"
    );

    RenderedTable {
        header_rows,
        rows,
        leaf_headers,
        hidden_columns,
        hidden_class: if multi_level {
            ZERO_WIDTH_HIDDEN_CLASS.to_string()
        } else {
            config.hidden_column_class.clone()
        },
        bar_rounded: config.bar_rounded,
        max_height: config.max_height.clone(),
    }
}

fn base_row(index: usize, row: &Row, hidden: &[bool]) -> RenderedRow {
    let is_hidden = |col: usize| hidden.get(col).copied().unwrap_or(false);

    let mut cells = Vec::with_capacity(row.cells.len() + 1);
    cells.push(RenderedCell {
        col: 0,
        value: row.index.clone(),
        text: row.index.display_text(),
        markup: None,
        style: None,
        hidden: is_hidden(0),
        overlay: None,
    });
    cells.extend(row.cells.iter().enumerate().map(|(i, entry)| RenderedCell {
        col: i + 1,
        value: entry.value.clone(),
        text: entry.value.display_text(),
        markup: entry.display.clone(),
        style: entry.style.clone(),
        hidden: is_hidden(i + 1),
        overlay: None,
    }));
    RenderedRow { index, cells }
}

/// Header rows, outermost group first. Adjacent data columns that share
/// the same group path are merged into one spanning header; a group header
/// is hidden only when every column under it is hidden.
fn header_rows(table: &TableSnapshot, config: &RenderConfig, hidden: &[bool]) -> Vec<Vec<HeaderCell>> {
    let depth = table.header_depth();
    let column_count = table.column_count();
    let is_hidden = |col: usize| hidden.get(col).copied().unwrap_or(false);
    let width_of = |col: usize| config.width_of(col).map(str::to_string);

    (0..depth)
        .map(|level| {
            let is_leaf = level + 1 == depth;
            let mut cells = vec![HeaderCell {
                text: if level == 0 {
                    config.idx_col_name.clone()
                } else {
                    String::new()
                },
                colspan: 1,
                col: is_leaf.then_some(0),
                width: if is_leaf { width_of(0) } else { None },
                hidden: is_hidden(0),
            }];

            if is_leaf {
                cells.extend((1..column_count).map(|col| HeaderCell {
                    text: table.leaf_header(col).unwrap_or_default().to_string(),
                    colspan: 1,
                    col: Some(col),
                    width: width_of(col),
                    hidden: is_hidden(col),
                }));
                return cells;
            }

            let key = |col: usize| table.column(col).map(|h| h.prefix_key(level, depth));
            let mut start = 1;
            while start < column_count {
                let start_key = key(start);
                let mut end = start + 1;
                while end < column_count && key(end) == start_key {
                    end += 1;
                }
                cells.push(HeaderCell {
                    text: table
                        .column(start)
                        .map(|h| h.label_at(level, depth).to_string())
                        .unwrap_or_default(),
                    colspan: end - start,
                    col: None,
                    width: None,
                    hidden: (start..end).all(is_hidden),
                });
                start = end;
            }
            cells
        })
        .collect()
}

fn header_or_fallback(headers: &[String], col: usize) -> String {
    match headers.get(col) {
        Some(h) if !h.is_empty() => h.clone(),
        _ => format!("Column {col}"),
    }
}

/// Text the host rendered for a data cell, if it supplied markup.
fn host_text(table: &TableSnapshot, row: usize, col: usize) -> Option<String> {
    table.entry(row, col)?.display.as_deref().map(markup_text)
}

fn data_bar(spec: &DataBarSpec, table: &TableSnapshot, row: usize, headers: &[String]) -> CellOverlay {
    let Some(value) = table.value(row, spec.col_idx) else {
        return CellOverlay::Neutral;
    };
    let Some(n) = value.as_number() else {
        debug!(row, col = spec.col_idx, value = ?value, "data bar value is not numeric");
        return CellOverlay::Neutral;
    };

    let geometry = data_bar_geometry(n, spec.min, spec.max);

    let marker = spec.recommended_idx.and_then(|idx| {
        let recommended = table.value(row, idx)?;
        let Some(rec) = recommended.as_number() else {
            debug!(row, col = idx, value = ?recommended, "recommended value is not numeric");
            return None;
        };
        Some(RecommendedMarker {
            position: recommended_marker_geometry(rec, spec.min, spec.max),
            color: spec.line_color.clone(),
            tooltip: Tooltip {
                lines: vec![
                    format!("{}: {}", header_or_fallback(headers, spec.col_idx), format_number(n)),
                    format!("{}: {}", header_or_fallback(headers, idx), format_number(rec)),
                ],
            },
        })
    });

    CellOverlay::DataBar(DataBarOverlay {
        label_anchor: label_anchor(&geometry, marker.as_ref().map(|m| m.position)),
        label: host_text(table, row, spec.col_idx).unwrap_or_else(|| value.display_text()),
        geometry,
        marker,
    })
}

fn exception_bar(spec: &ExceptionBarSpec, table: &TableSnapshot, row: usize) -> Option<CellOverlay> {
    let value = table.value(row, spec.col_idx)?;
    let overlay = match exception_bar_geometry(value, spec.min, spec.max) {
        ExceptionBarGeometry::Bar { fraction } => {
            let label = host_text(table, row, spec.col_idx)
                .or_else(|| value.as_number().map(|n| format!("{}%", format_number(n))))
                .unwrap_or_default();
            CellOverlay::ExceptionBar(ExceptionBarOverlay::Bar { fraction, label })
        }
        ExceptionBarGeometry::Exception => CellOverlay::ExceptionBar(ExceptionBarOverlay::Exception {
            color: spec.exception_col_color.clone(),
            text: host_text(table, row, spec.col_idx).unwrap_or_else(|| value.display_text()),
        }),
        ExceptionBarGeometry::Empty => CellOverlay::Neutral,
    };
    Some(overlay)
}

fn range_band(spec: &RangeBandSpec, table: &TableSnapshot, row: usize) -> CellOverlay {
    let read = |idx: usize| table.value(row, idx).and_then(CellValue::as_number);
    let (Some(long_high), Some(long_low), Some(short_high), Some(short_low), Some(current)) = (
        read(spec.long_high_idx),
        read(spec.long_low_idx),
        read(spec.short_high_idx),
        read(spec.short_low_idx),
        read(spec.current_idx),
    ) else {
        debug!(row, col = spec.col_idx, "range band source value is not numeric");
        return CellOverlay::RangeBand(RangeBandOverlay::Empty);
    };

    let geometry = range_band_geometry(RangeBandValues {
        long_high,
        long_low,
        short_high,
        short_low,
        current,
    });

    if let Some(text) = geometry.out_of_range_text(spec.low_text.as_deref(), spec.high_text.as_deref()) {
        return CellOverlay::RangeBand(RangeBandOverlay::Text(text.to_string()));
    }

    CellOverlay::RangeBand(RangeBandOverlay::Chart {
        geometry,
        colors: spec.colors.clone(),
    })
}

/// Only empty placeholder cells are charted; a cell that already has
/// content is left alone.
fn fixed_scale(spec: &FixedScaleSpec, table: &TableSnapshot, row: usize) -> Option<CellOverlay> {
    if table.value(row, spec.col_idx).is_some_and(|v| !v.is_blank()) {
        return None;
    }
    let dots = spec
        .dot_idx
        .map(|idx| table.value(row, idx).and_then(CellValue::as_number));
    Some(CellOverlay::FixedScale(FixedScaleOverlay {
        geometry: fixed_scale_geometry(dots, spec.min, spec.max),
        dot_colors: spec.dot_colors.clone(),
        line_color: spec.line_color.clone(),
        line_height: spec.line_height,
        tick_marks: spec.tick_marks,
    }))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::geometry::{BarSide, LabelAnchor};
    use crate::types::{CellEntry, ColumnHeader};

    fn table(columns: Vec<ColumnHeader>, rows: Vec<Vec<CellEntry>>) -> TableSnapshot {
        TableSnapshot {
            columns,
            rows: rows
                .into_iter()
                .enumerate()
                .map(|(i, cells)| Row {
                    index: CellValue::Text(format!("R {}", i + 1)),
                    cells,
                })
                .collect(),
        }
    }

    #[test]
    fn test_data_bar_with_marker_and_tooltip() {
        let t = table(
            vec![ColumnHeader::flat("C 3"), ColumnHeader::flat("C 3 Recommended")],
            vec![vec![CellEntry::new(0.987), CellEntry::new(1.2)]],
        );
        let config = RenderConfig {
            overlays: vec![OverlaySpec::DataBar(DataBarSpec {
                col_idx: 1,
                min: -2.0,
                max: 2.0,
                recommended_idx: Some(2),
                line_color: "#000000".into(),
            })],
            ..RenderConfig::default()
        };
        let rendered = render_table(&t, &config);
        let Some(CellOverlay::DataBar(bar)) = &rendered.rows[0].cells[1].overlay else {
            panic!("expected data bar");
        };
        assert_eq!(bar.geometry.side, BarSide::Positive);
        assert_eq!(bar.label, "0.987");
        assert_eq!(bar.label_anchor, LabelAnchor::BeforeAxis);
        let marker = bar.marker.as_ref().unwrap();
        assert_eq!(marker.color, "#000000");
        assert_eq!(marker.tooltip.text(), "C 3: 0.987\nC 3 Recommended: 1.2");
    }

    #[test]
    fn test_labels_use_host_text() {
        let t = table(
            vec![ColumnHeader::flat("Share"), ColumnHeader::flat("Score")],
            vec![vec![
                CellEntry::new(0.0123).with_display("<b>1.23%</b>"),
                CellEntry::new(0.4).with_display("40 pts"),
            ]],
        );
        let config = RenderConfig {
            overlays: vec![
                OverlaySpec::DataBar(DataBarSpec {
                    col_idx: 1,
                    min: -1.0,
                    max: 1.0,
                    recommended_idx: None,
                    line_color: "#9CA3AF".into(),
                }),
                OverlaySpec::ExceptionBar(ExceptionBarSpec {
                    col_idx: 2,
                    min: 0.0,
                    max: 1.0,
                    exception_col_color: "red".into(),
                }),
            ],
            ..RenderConfig::default()
        };
        let rendered = render_table(&t, &config);
        let Some(CellOverlay::DataBar(bar)) = &rendered.rows[0].cells[1].overlay else {
            panic!("expected data bar");
        };
        assert_eq!(bar.label, "1.23%");
        let Some(CellOverlay::ExceptionBar(ExceptionBarOverlay::Bar { label, .. })) =
            &rendered.rows[0].cells[2].overlay
        else {
            panic!("expected exception bar");
        };
        assert_eq!(label, "40 pts");
    }

    #[test]
    fn test_non_numeric_data_bar_is_neutral() {
        let t = table(vec![ColumnHeader::flat("A")], vec![vec![CellEntry::new("n/a")]]);
        let config = RenderConfig {
            overlays: vec![OverlaySpec::DataBar(DataBarSpec {
                col_idx: 1,
                min: -1.0,
                max: 1.0,
                recommended_idx: None,
                line_color: "#9CA3AF".into(),
            })],
            ..RenderConfig::default()
        };
        let rendered = render_table(&t, &config);
        let cell = &rendered.rows[0].cells[1];
        assert_eq!(cell.overlay, Some(CellOverlay::Neutral));
        assert_eq!(cell.text, "n/a");
    }

    #[test]
    fn test_fixed_scale_skips_cells_with_content() {
        let t = table(
            vec![ColumnHeader::flat("Dot"), ColumnHeader::flat("Chart")],
            vec![
                vec![CellEntry::new(0.5), CellEntry::new(CellValue::Empty)],
                vec![CellEntry::new(0.5), CellEntry::new("n/a")],
            ],
        );
        let config = RenderConfig {
            overlays: vec![OverlaySpec::FixedScaleBand(FixedScaleSpec {
                col_idx: 2,
                min: -1.0,
                max: 1.0,
                dot_idx: [1, 1, 1],
                dot_colors: ["red".into(), "green".into(), "blue".into()],
                line_color: "#D1D5DB".into(),
                line_height: 2.0,
                tick_marks: true,
            })],
            ..RenderConfig::default()
        };
        let rendered = render_table(&t, &config);
        assert!(matches!(rendered.rows[0].cells[2].overlay, Some(CellOverlay::FixedScale(_))));
        assert_eq!(rendered.rows[1].cells[2].overlay, None);
    }

    #[test]
    fn test_group_headers_merge_and_hide() {
        let t = table(
            vec![
                ColumnHeader::grouped("Revenue", "Actual"),
                ColumnHeader::grouped("Revenue", "% Change"),
                ColumnHeader::grouped("Forecast", "LT High"),
                ColumnHeader::grouped("Forecast", "LT Low"),
            ],
            vec![],
        );
        let config = RenderConfig {
            idx_col_name: "Tenor".into(),
            hidden_columns: [3, 4].into_iter().collect(),
            ..RenderConfig::default()
        };
        let rendered = render_table(&t, &config);
        assert!(rendered.is_multi_level());
        assert_eq!(rendered.hidden_class, "hide-column-zero-width");

        let groups = &rendered.header_rows[0];
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].text, "Tenor");
        assert_eq!((groups[1].text.as_str(), groups[1].colspan, groups[1].hidden), ("Revenue", 2, false));
        assert_eq!((groups[2].text.as_str(), groups[2].colspan, groups[2].hidden), ("Forecast", 2, true));

        let leaves = &rendered.header_rows[1];
        assert_eq!(leaves.len(), 5);
        assert_eq!(leaves[0].text, "");
        assert_eq!(leaves[4].text, "LT Low");
        assert!(leaves[4].hidden);
        assert_eq!(rendered.header(0), Some("Tenor"));
    }

    #[test]
    fn test_header_class_marks_column_hidden() {
        let t = table(
            vec![ColumnHeader::flat("A"), ColumnHeader::flat("B").with_class("hide-column")],
            vec![vec![CellEntry::new(1.0), CellEntry::new(2.0)]],
        );
        let rendered = render_table(&t, &RenderConfig::default());
        assert!(!rendered.is_hidden(1));
        assert!(rendered.is_hidden(2));
        assert!(rendered.rows[0].cells[2].hidden);
        assert_eq!(rendered.hidden_class, "hide-column");
    }
}
