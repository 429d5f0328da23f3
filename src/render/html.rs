//! HTML output for a [`RenderedTable`].
//!
//! The markup is plain `<table>` with inline-styled overlay elements, so it
//! renders the same inside a host iframe, a standalone file or the wasm
//! viewer. Output is deterministic: the same table always produces the same
//! string.

use std::fmt::{self, Write};

use crate::geometry::{BarSide, LabelAnchor, Span, AXIS_LABEL_GAP};
use tracing::warn;

use crate::types::format_number;

use super::colors::{contrasting_text, palette};
use super::model::{
    CellOverlay, DataBarOverlay, ExceptionBarOverlay, FixedScaleOverlay, HeaderCell,
    RangeBandOverlay, RenderedCell, RenderedTable,
};

/// Height of data bars and range bands, in px.
const BAR_HEIGHT: u32 = 18;
/// Share of an exception-bar cell used by the bar; the rest holds the label.
const EXCEPTION_TRACK_PCT: f64 = 65.0;
/// Share of a range-band cell used by the chart.
const RANGE_TRACK_PCT: f64 = 98.0;
/// Bands narrower than this are widened so they stay visible.
const MIN_BAND_WIDTH_PCT: f64 = 0.5;
const LONG_BAND_OPACITY: &str = "0.15";
const SHORT_BAND_OPACITY: &str = "0.35";

/// Inline hiding for hidden cells, so they stay hidden when the host
/// mounts the fragment without [`BASE_STYLES`].
const HIDDEN_STYLE: &str = "display:none";
/// Multi-level headers keep hidden cells in the grid so group spans line up.
const ZERO_WIDTH_STYLE: &str = "width:0;max-width:0;padding:0;border:none;overflow:hidden;font-size:0";

/// Stylesheet the markup expects. Colors come from CSS custom properties so
/// the host theme can restyle a table without re-rendering it.
pub const BASE_STYLES: &str = "\
:root{--pos-color:#4ade80;--neg-color:#f87171;--header-bg-color:#f0f2f6;\
--hover-color:#ff4b4b;--border-color:#e4e6ea;--max-height:800px}\
.clicktable-container{max-height:var(--max-height);overflow:auto}\
table.clicktable{border-collapse:collapse;width:100%;font-size:14px;cursor:pointer}\
table.clicktable th,table.clicktable td{border:1px solid var(--border-color);padding:4px 6px}\
table.clicktable thead th{background-color:var(--header-bg-color);position:sticky;top:0}\
table.clicktable td:hover,table.clicktable tbody th:hover{outline:1px solid var(--hover-color)}\
table.clicktable .selected{outline:2px solid var(--hover-color)}\
.hide-column{display:none}\
.hide-column-zero-width{width:0;max-width:0;padding:0;border:none;overflow:hidden;font-size:0}\
.range-chart-text{text-align:center}\
.clicktable-tooltip{position:absolute;display:none;white-space:pre;padding:4px 8px;\
border-radius:4px;font-size:12px;pointer-events:none;z-index:1000}";

impl RenderedTable {
    /// The table as an HTML fragment.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        // Writing into a String never fails.
        let _ = self.write_html(&mut out);
        out
    }

    /// Write the table as an HTML fragment.
    pub fn write_html<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(
            out,
            "<div class=\"clicktable-container\"><table class=\"clicktable\"><thead>"
        )?;
        for header_row in &self.header_rows {
            out.write_str("<tr>")?;
            for header in header_row {
                self.write_header(out, header)?;
            }
            out.write_str("</tr>")?;
        }
        out.write_str("</thead><tbody>")?;
        for row in &self.rows {
            write!(out, "<tr data-row=\"{}\">", row.index)?;
            for cell in &row.cells {
                self.write_cell(out, row.index, cell)?;
            }
            out.write_str("</tr>")?;
        }
        out.write_str("</tbody></table></div>")
    }

    /// A complete HTML document embedding the table, with `css_vars` set on
    /// `:root` after the base styles.
    pub fn to_document(&self, css_vars: &[(&str, String)]) -> String {
        let mut out = String::from(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><style>",
        );
        out.push_str(BASE_STYLES);
        if !css_vars.is_empty() {
            out.push_str(":root{");
            for (name, value) in css_vars {
                if !is_safe_css_value(value) {
                    warn!(var = name, value = %value, "dropping unsafe CSS variable");
                    continue;
                }
                let _ = write!(out, "{name}:{value};");
            }
            out.push('}');
        }
        out.push_str("</style></head><body>");
        let _ = self.write_html(&mut out);
        out.push_str("</body></html>");
        out
    }

    fn hidden_attrs(&self, hidden: bool, classes: &mut Vec<String>) -> &'static str {
        if hidden {
            classes.push(self.hidden_class.clone());
            " data-hidden=\"true\""
        } else {
            ""
        }
    }

    fn hidden_style(&self) -> &'static str {
        if self.is_multi_level() {
            ZERO_WIDTH_STYLE
        } else {
            HIDDEN_STYLE
        }
    }

    fn write_header<W: Write>(&self, out: &mut W, header: &HeaderCell) -> fmt::Result {
        let mut classes = Vec::new();
        let hidden = self.hidden_attrs(header.hidden, &mut classes);
        let mut styles: Vec<String> = header.width.iter().map(|w| format!("width:{w}")).collect();
        if header.hidden {
            styles.push(self.hidden_style().to_string());
        }
        out.write_str("<th")?;
        write_class(out, &classes)?;
        if header.colspan > 1 {
            write!(out, " colspan=\"{}\"", header.colspan)?;
        }
        if let Some(col) = header.col {
            write!(out, " data-col=\"{col}\"")?;
        }
        write_style(out, &styles)?;
        write!(out, "{hidden}>{}</th>", escape_html(&header.text))
    }

    fn write_cell<W: Write>(&self, out: &mut W, row: usize, cell: &RenderedCell) -> fmt::Result {
        let tag = if cell.col == 0 { "th" } else { "td" };
        let mut classes = Vec::new();
        let mut styles: Vec<String> = cell.style.iter().cloned().collect();

        match &cell.overlay {
            Some(CellOverlay::DataBar(_)) => classes.push("data-bar-cell".to_string()),
            Some(CellOverlay::ExceptionBar(bar)) => {
                classes.push("exception-bar-cell".to_string());
                if let ExceptionBarOverlay::Exception { color, .. } = bar {
                    styles.push(format!("background-color:{color}"));
                    styles.push(format!("color:{}", contrasting_text(color)));
                }
            }
            Some(CellOverlay::RangeBand(_)) => classes.push("range-chart-cell".to_string()),
            Some(CellOverlay::FixedScale(_)) => {
                classes.push("fixed-scale-range-chart-cell".to_string());
            }
            Some(CellOverlay::Neutral) | None => {}
        }
        let hidden = self.hidden_attrs(cell.hidden, &mut classes);
        if cell.hidden {
            styles.push(self.hidden_style().to_string());
        }

        write!(out, "<{tag}")?;
        write_class(out, &classes)?;
        write!(out, " data-row=\"{row}\" data-col=\"{}\"", cell.col)?;
        write_style(out, &styles)?;
        if let Some(tooltip) = cell.overlay.as_ref().and_then(CellOverlay::tooltip) {
            write!(out, " data-tooltip=\"{}\"", escape_html(&tooltip.text()))?;
        }
        write!(out, "{hidden}>")?;

        match &cell.overlay {
            Some(CellOverlay::DataBar(bar)) => self.write_data_bar(out, bar)?,
            Some(CellOverlay::ExceptionBar(bar)) => self.write_exception_bar(out, bar)?,
            Some(CellOverlay::RangeBand(band)) => self.write_range_band(out, band)?,
            Some(CellOverlay::FixedScale(scale)) => self.write_fixed_scale(out, scale)?,
            Some(CellOverlay::Neutral) | None => match &cell.markup {
                Some(markup) => out.write_str(markup)?,
                None => out.write_str(&escape_html(&cell.text))?,
            },
        }
        write!(out, "</{tag}>")
    }

    fn radius(&self, px: f64) -> String {
        if self.bar_rounded {
            format!("{}px", format_number(px))
        } else {
            "0px".to_string()
        }
    }

    fn write_data_bar<W: Write>(&self, out: &mut W, bar: &DataBarOverlay) -> fmt::Result {
        let (anchor, color) = match bar.geometry.side {
            BarSide::Positive => ("left:50%", palette::POSITIVE_BAR),
            BarSide::Negative => ("right:50%", palette::NEGATIVE_BAR),
        };
        write!(
            out,
            "<div class=\"data-bar\" style=\"position:relative;width:100%;height:{BAR_HEIGHT}px\">\
             <div class=\"bar\" style=\"position:absolute;top:0;height:{BAR_HEIGHT}px;{anchor};\
             width:{};background-color:{color};opacity:60%;border-radius:{}\"></div>",
            pct(bar.geometry.length_fraction / 2.0),
            self.radius(f64::from(BAR_HEIGHT) / 2.0),
        )?;

        if let Some(marker) = &bar.marker {
            let guide = Span {
                start: marker.position.min(0.5),
                end: marker.position.max(0.5),
            };
            write!(
                out,
                "<div class=\"marker-line\" style=\"position:absolute;top:9px;height:2px;\
                 left:{};width:{};background-color:{};z-index:45\"></div>\
                 <div class=\"marker\" style=\"position:absolute;top:5px;width:2px;height:12px;\
                 left:{};transform:translateX(-50%);background-color:{};z-index:50\"></div>",
                pct(guide.start),
                pct(guide.width()),
                escape_html(&marker.color),
                pct(marker.position),
                escape_html(&marker.color),
            )?;
        }

        let axis_offset = pct(0.5 + AXIS_LABEL_GAP);
        let placement = match bar.label_anchor {
            LabelAnchor::CellStart => "left:5px;text-align:left".to_string(),
            LabelAnchor::CellEnd => "right:5px;text-align:right".to_string(),
            LabelAnchor::AfterAxis => format!("left:{axis_offset};text-align:left"),
            LabelAnchor::BeforeAxis => format!("right:{axis_offset};text-align:right"),
        };
        write!(
            out,
            "<div class=\"bar-label\" style=\"position:absolute;z-index:100;padding:0 5px;{placement}\">{}</div></div>",
            escape_html(&bar.label)
        )
    }

    fn write_exception_bar<W: Write>(&self, out: &mut W, bar: &ExceptionBarOverlay) -> fmt::Result {
        match bar {
            ExceptionBarOverlay::Bar { fraction, label } => write!(
                out,
                "<div class=\"exception-bar\" style=\"float:left;height:20px;width:{};\
                 background-color:{};opacity:60%;border-radius:{}\"></div>\
                 <div style=\"float:right;width:{};text-align:right;z-index:100\">{}</div>",
                pct(fraction * EXCEPTION_TRACK_PCT / 100.0),
                palette::POSITIVE_BAR,
                self.radius(9.0),
                pct(1.0 - EXCEPTION_TRACK_PCT / 100.0),
                escape_html(label),
            ),
            ExceptionBarOverlay::Exception { text, .. } => write!(
                out,
                "<div style=\"width:100%;text-align:center;z-index:100\">{}</div>",
                escape_html(text)
            ),
        }
    }

    fn write_range_band<W: Write>(&self, out: &mut W, band: &RangeBandOverlay) -> fmt::Result {
        let (geometry, colors) = match band {
            RangeBandOverlay::Chart { geometry, colors } => (geometry, colors),
            RangeBandOverlay::Text(text) => {
                return write!(out, "<div class=\"range-chart-text\">{}</div>", escape_html(text));
            }
            RangeBandOverlay::Empty => return Ok(()),
        };

        write!(
            out,
            "<div class=\"range-line\" style=\"position:relative;width:{};height:{BAR_HEIGHT}px;border-radius:{}\">",
            pct(RANGE_TRACK_PCT / 100.0),
            self.radius(9.0),
        )?;
        for (span, color, opacity) in [
            (geometry.long_band, &colors.long_term, LONG_BAND_OPACITY),
            (geometry.short_band, &colors.short_term, SHORT_BAND_OPACITY),
        ] {
            let width = (span.width() * 100.0).max(MIN_BAND_WIDTH_PCT);
            write!(
                out,
                "<div class=\"range-band\" style=\"position:absolute;top:0;left:{};width:{}%;\
                 height:{BAR_HEIGHT}px;background-color:{};opacity:{opacity};border-radius:{};z-index:2\"></div>",
                pct(span.start),
                round3(width),
                escape_html(color),
                self.radius(f64::from(BAR_HEIGHT) / 2.0),
            )?;
        }
        write!(
            out,
            "<div class=\"range-current\" style=\"position:absolute;top:3px;left:{};width:10px;\
             height:12px;transform:translateX(-50%);background-color:{};border-radius:{};\
             box-shadow:{};z-index:3\"></div></div>",
            pct(geometry.current_position),
            escape_html(&colors.current),
            self.radius(6.0),
            palette::MARKER_RING,
        )
    }

    fn write_fixed_scale<W: Write>(&self, out: &mut W, scale: &FixedScaleOverlay) -> fmt::Result {
        out.write_str(
            "<div class=\"fixed-scale\" style=\"position:relative;width:100%;height:30px;padding:5px 0\">",
        )?;
        if scale.tick_marks {
            out.write_str(
                "<div class=\"ticks\" style=\"position:absolute;bottom:0;width:100%;height:12px;\
                 display:flex;justify-content:space-between;padding:0 2px\">",
            )?;
            for tick in &scale.geometry.ticks {
                write!(
                    out,
                    "<div style=\"position:relative;display:flex;flex-direction:column;align-items:center\">\
                     <div style=\"width:1px;height:4px;margin-bottom:2px;background-color:{}\"></div>\
                     <div style=\"font-size:9px;text-align:center;color:{}\">{:.1}</div></div>",
                    palette::TICK,
                    palette::TICK_LABEL,
                    tick.value,
                )?;
            }
            out.write_str("</div>")?;
        }
        write!(
            out,
            "<div class=\"scale-line\" style=\"position:absolute;top:15px;left:0;width:100%;\
             height:{}px;background-color:{};border-radius:{};z-index:1\"></div>\
             <div class=\"midpoint\" style=\"position:absolute;top:5px;left:50%;width:1px;height:20px;\
             transform:translateX(-50%);background-color:{};z-index:2\"></div>",
            format_number(scale.line_height),
            escape_html(&scale.line_color),
            self.radius(scale.line_height / 2.0),
            palette::TICK,
        )?;
        for (position, color) in scale.geometry.dot_positions.iter().zip(&scale.dot_colors) {
            let Some(position) = position else { continue };
            write!(
                out,
                "<div class=\"dot\" style=\"position:absolute;top:9px;left:{};width:10px;height:12px;\
                 transform:translateX(-50%);background-color:{};opacity:0.5;border-radius:{};z-index:3\"></div>",
                pct(*position),
                escape_html(color),
                self.radius(6.0),
            )?;
        }
        out.write_str("</div>")
    }
}

fn write_class<W: Write>(out: &mut W, classes: &[String]) -> fmt::Result {
    if classes.is_empty() {
        return Ok(());
    }
    write!(out, " class=\"{}\"", escape_html(&classes.join(" ")))
}

fn write_style<W: Write>(out: &mut W, styles: &[String]) -> fmt::Result {
    if styles.is_empty() {
        return Ok(());
    }
    write!(out, " style=\"{}\"", escape_html(&styles.join(";")))
}

fn round3(v: f64) -> String {
    format_number((v * 1000.0).round() / 1000.0)
}

/// A `[0, 1]` fraction as a CSS percentage.
fn pct(fraction: f64) -> String {
    format!("{}%", round3(fraction * 100.0))
}

/// Escape text for element content and double-quoted attributes.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Plain text of host markup, the way a browser's `textContent` reads it:
/// tags dropped, common entities decoded, surrounding whitespace trimmed.
pub fn markup_text(markup: &str) -> String {
    let mut text = String::with_capacity(markup.len());
    let mut in_tag = false;
    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.replace("&nbsp;", "\u{a0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Whether `value` can sit in a CSS declaration without ending it or the
/// surrounding `<style>` element.
pub fn is_safe_css_value(value: &str) -> bool {
    !value.contains(['<', '>', '{', '}', ';'])
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

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"A&B\"</b>"),
            "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_markup_text_strips_tags_and_entities() {
        assert_eq!(markup_text("<b>1.23%</b>"), "1.23%");
        assert_eq!(markup_text(" <span title=\"x\">A &amp; B</span> "), "A & B");
        assert_eq!(markup_text("&lt;none&gt;"), "<none>");
        assert_eq!(markup_text("plain"), "plain");
    }

    #[test]
    fn test_css_value_safety() {
        assert!(is_safe_css_value("500px"));
        assert!(is_safe_css_value("calc(100vh - 2rem)"));
        assert!(!is_safe_css_value("1px}</style><script>"));
        assert!(!is_safe_css_value("1px;color:red"));
    }

    #[test]
    fn test_document_drops_unsafe_variables() {
        let table = RenderedTable {
            header_rows: Vec::new(),
            rows: Vec::new(),
            leaf_headers: vec![String::new()],
            hidden_columns: vec![false],
            hidden_class: "hide-column".into(),
            bar_rounded: true,
            max_height: "800px".into(),
        };
        let doc = table.to_document(&[
            ("--max-height", "1px}</style><script>".to_string()),
            ("--hover-color", "#ff4b4b".to_string()),
        ]);
        assert!(!doc.contains("<script>"));
        assert!(doc.contains("--hover-color:#ff4b4b;"));
        assert_eq!(doc.matches("</style>").count(), 1);
    }

    #[test]
    fn test_pct_rounds() {
        assert_eq!(pct(0.5), "50%");
        assert_eq!(pct(0.123_456), "12.346%");
        assert_eq!(pct(0.0), "0%");
    }
}
