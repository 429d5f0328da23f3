//! Overlay geometry.
//!
//! Pure functions that map cell values onto fractions of a cell's width.
//! Every fraction here is in `[0, 1]`; the renderer turns them into CSS
//! percentages. Nothing in this module allocates or fails: values that can't
//! be read as numbers are reported as `None`/`Empty` and left to the caller.

use crate::types::CellValue;

/// Gap between the centre axis and a label placed beside it.
pub const AXIS_LABEL_GAP: f64 = 0.02;

/// Width reserved for a data bar label beside the axis.
pub const LABEL_SPAN: f64 = 0.2;

/// How close the recommended marker (or its guide line) may come to a label
/// before the label moves to the other side of the axis.
pub const MARKER_PROXIMITY: f64 = 0.01;

/// Number of ticks on a fixed-scale band.
pub const TICK_COUNT: usize = 7;

/// Coerce rendered cell text to a number.
///
/// Accepts surrounding whitespace, a trailing `%` and `,` thousands
/// separators. Anything else that Rust's float parser rejects, and any
/// non-finite result, is non-numeric.
pub fn parse_numeric(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    if trimmed.is_empty() {
        return None;
    }
    let n: f64 = if trimmed.contains(',') {
        trimmed.replace(',', "").parse().ok()?
    } else {
        trimmed.parse().ok()?
    };
    n.is_finite().then_some(n)
}

/// `value` clamped to `[lo, hi]` without panicking on inverted bounds.
fn clamp_between(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Linear position of `value` on `[min, max]`, clamped to `[0, 1]`.
/// A degenerate scale puts everything at the start.
pub fn linear_fraction(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if !value.is_finite() || span.is_nan() || span <= 0.0 {
        return 0.0;
    }
    ((value - min) / span).clamp(0.0, 1.0)
}

// =============================================================================
// Data bars
// =============================================================================

/// Which half of the cell a data bar grows into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarSide {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataBarGeometry {
    pub side: BarSide,
    /// Length as a fraction of the half-width on `side`.
    pub length_fraction: f64,
}

impl DataBarGeometry {
    /// Signed length in `[-1, 1]`.
    pub fn signed(&self) -> f64 {
        match self.side {
            BarSide::Positive => self.length_fraction,
            BarSide::Negative => -self.length_fraction,
        }
    }

    /// Position of the bar's far end across the whole cell (0.5 is the axis).
    pub fn end_position(&self) -> f64 {
        0.5 + self.signed() / 2.0
    }
}

fn half_scale(magnitude: f64, extent: f64) -> f64 {
    if extent > 0.0 {
        (magnitude / extent).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Bar for `value` on a centred axis.
///
/// The value is clamped to `[min, max]`, then positive values are scaled
/// against `max` and negative values against `|min|`, so each half of the
/// cell covers its own side of the range.
pub fn data_bar_geometry(value: f64, min: f64, max: f64) -> DataBarGeometry {
    if !value.is_finite() {
        return DataBarGeometry {
            side: BarSide::Positive,
            length_fraction: 0.0,
        };
    }
    let clamped = clamp_between(value, min, max);
    if clamped < 0.0 {
        DataBarGeometry {
            side: BarSide::Negative,
            length_fraction: half_scale(-clamped, -min),
        }
    } else {
        DataBarGeometry {
            side: BarSide::Positive,
            length_fraction: half_scale(clamped, max),
        }
    }
}

/// Offset of the recommended marker across the whole cell, using the same
/// mapping as the bar.
pub fn recommended_marker_geometry(recommended: f64, min: f64, max: f64) -> f64 {
    data_bar_geometry(recommended, min, max).end_position()
}

/// Where the value label of a data bar sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAnchor {
    /// Left edge of the cell.
    CellStart,
    /// Right edge of the cell.
    CellEnd,
    /// Just right of the axis, reading rightwards.
    AfterAxis,
    /// Just left of the axis, right-aligned.
    BeforeAxis,
}

impl LabelAnchor {
    /// Span of the cell the label occupies beside the axis.
    fn axis_span(self) -> Option<(f64, f64)> {
        match self {
            Self::AfterAxis => Some((0.5 + AXIS_LABEL_GAP, 0.5 + AXIS_LABEL_GAP + LABEL_SPAN)),
            Self::BeforeAxis => Some((0.5 - AXIS_LABEL_GAP - LABEL_SPAN, 0.5 - AXIS_LABEL_GAP)),
            Self::CellStart | Self::CellEnd => None,
        }
    }

    fn opposite(self) -> Self {
        match self {
            Self::AfterAxis => Self::BeforeAxis,
            Self::BeforeAxis => Self::AfterAxis,
            Self::CellStart => Self::CellEnd,
            Self::CellEnd => Self::CellStart,
        }
    }
}

/// Label position for a bar, optionally accompanied by a recommended marker.
///
/// Without a marker the label sits at the cell edge away from the bar. With a
/// marker it sits beside the axis on the bar's side, unless the marker or
/// its guide line (drawn from the axis to the marker) comes within
/// [`MARKER_PROXIMITY`] of that span, in which case it flips to the other
/// side of the axis.
pub fn label_anchor(bar: &DataBarGeometry, marker: Option<f64>) -> LabelAnchor {
    let Some(marker) = marker else {
        return match bar.side {
            BarSide::Positive => LabelAnchor::CellStart,
            BarSide::Negative => LabelAnchor::CellEnd,
        };
    };
    let natural = match bar.side {
        BarSide::Positive => LabelAnchor::AfterAxis,
        BarSide::Negative => LabelAnchor::BeforeAxis,
    };
    let Some((lo, hi)) = natural.axis_span() else {
        return natural;
    };
    let guide_lo = marker.min(0.5);
    let guide_hi = marker.max(0.5);
    let overlaps = guide_hi >= lo - MARKER_PROXIMITY && guide_lo <= hi + MARKER_PROXIMITY;
    if overlaps {
        natural.opposite()
    } else {
        natural
    }
}

// =============================================================================
// Exception bars
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExceptionBarGeometry {
    /// Numeric value, as a fraction of the bar track.
    Bar { fraction: f64 },
    /// Non-numeric text: paint the exception colour instead of a bar.
    Exception,
    /// Nothing to draw.
    Empty,
}

/// Bounded bar for a cell that may hold text instead of a number.
pub fn exception_bar_geometry(value: &CellValue, min: f64, max: f64) -> ExceptionBarGeometry {
    if value.is_blank() {
        return ExceptionBarGeometry::Empty;
    }
    match value.as_number() {
        Some(n) => ExceptionBarGeometry::Bar {
            fraction: linear_fraction(n, min, max),
        },
        None => ExceptionBarGeometry::Exception,
    }
}

// =============================================================================
// Range bands
// =============================================================================

/// The five readings that make up one range band row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeBandValues {
    pub long_high: f64,
    pub long_low: f64,
    pub short_high: f64,
    pub short_low: f64,
    pub current: f64,
}

/// A horizontal span, `start <= end`, both in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl Span {
    fn ordered(a: f64, b: f64) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfRange {
    Below,
    Above,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeBandGeometry {
    pub long_band: Span,
    pub short_band: Span,
    pub current_position: f64,
    pub out_of_range: Option<OutOfRange>,
}

impl RangeBandGeometry {
    /// Text that replaces the chart, if the current value is out of range
    /// and the matching text is configured.
    pub fn out_of_range_text<'a>(
        &self,
        low_text: Option<&'a str>,
        high_text: Option<&'a str>,
    ) -> Option<&'a str> {
        match self.out_of_range? {
            OutOfRange::Below => low_text,
            OutOfRange::Above => high_text,
        }
    }
}

/// Long- and short-term bands plus the current marker on an axis fitted to
/// all five values of the row.
///
/// The current value is out of range only when it is strictly below both
/// lows or strictly above both highs; touching a bound counts as inside.
pub fn range_band_geometry(values: RangeBandValues) -> RangeBandGeometry {
    let RangeBandValues {
        long_high,
        long_low,
        short_high,
        short_low,
        current,
    } = values;
    let all = [long_high, long_low, short_high, short_low, current];
    let lo = all.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = all.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let position = |v: f64| {
        if hi - lo > 0.0 {
            linear_fraction(v, lo, hi)
        } else {
            0.5
        }
    };

    let out_of_range = if current < long_low && current < short_low {
        Some(OutOfRange::Below)
    } else if current > long_high && current > short_high {
        Some(OutOfRange::Above)
    } else {
        None
    };

    RangeBandGeometry {
        long_band: Span::ordered(position(long_low), position(long_high)),
        short_band: Span::ordered(position(short_low), position(short_high)),
        current_position: position(current),
        out_of_range,
    }
}

// =============================================================================
// Fixed-scale bands
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub position: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedScaleGeometry {
    /// `None` where the dot's value is missing or non-numeric.
    pub dot_positions: [Option<f64>; 3],
    /// Evenly spaced from `min` to `max`; the middle tick is the midpoint.
    pub ticks: [Tick; TICK_COUNT],
}

/// Dots on a scale shared by every row of the table.
pub fn fixed_scale_geometry(dots: [Option<f64>; 3], min: f64, max: f64) -> FixedScaleGeometry {
    let dot_positions = dots.map(|d| {
        d.filter(|v| v.is_finite())
            .map(|v| linear_fraction(v, min, max))
    });
    let steps = (TICK_COUNT - 1) as f64;
    let ticks = std::array::from_fn(|i| {
        let position = i as f64 / steps;
        Tick {
            value: min + position * (max - min),
            position,
        }
    });
    FixedScaleGeometry {
        dot_positions,
        ticks,
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
    use test_case::test_case;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test_case("83.5", Some(83.5); "plain")]
    #[test_case(" 83.5% ", Some(83.5); "percent")]
    #[test_case("1,200", Some(1200.0); "thousands")]
    #[test_case("-0.25", Some(-0.25); "negative")]
    #[test_case("Good", None; "word")]
    #[test_case("", None; "empty")]
    #[test_case("NaN", None; "nan")]
    #[test_case("inf", None; "infinite")]
    fn test_parse_numeric(input: &str, expected: Option<f64>) {
        assert_eq!(parse_numeric(input), expected);
    }

    #[test]
    fn test_data_bar_asymmetric_range() {
        let pos = data_bar_geometry(100.0, -100.0, 200.0);
        assert_eq!(pos.side, BarSide::Positive);
        assert!(approx(pos.length_fraction, 0.5));

        let neg = data_bar_geometry(-50.0, -100.0, 200.0);
        assert_eq!(neg.side, BarSide::Negative);
        assert!(approx(neg.length_fraction, 0.5));
    }

    #[test]
    fn test_data_bar_clamps_out_of_range() {
        let over = data_bar_geometry(1e9, -2.0, 2.0);
        assert_eq!(over.side, BarSide::Positive);
        assert!(approx(over.length_fraction, 1.0));

        let under = data_bar_geometry(-1e9, -2.0, 2.0);
        assert_eq!(under.side, BarSide::Negative);
        assert!(approx(under.length_fraction, 1.0));
    }

    #[test]
    fn test_data_bar_zero_sits_on_axis() {
        let zero = data_bar_geometry(0.0, -5.0, 5.0);
        assert!(approx(zero.length_fraction, 0.0));
        assert!(approx(zero.end_position(), 0.5));
    }

    #[test]
    fn test_data_bar_positive_only_range_has_no_negative_side() {
        let g = data_bar_geometry(-10.0, 0.0, 50.0);
        assert!(approx(g.length_fraction, 0.0));
    }

    #[test]
    fn test_recommended_marker_uses_bar_mapping() {
        assert!(approx(recommended_marker_geometry(1.0, -2.0, 2.0), 0.75));
        assert!(approx(recommended_marker_geometry(-1.0, -2.0, 2.0), 0.25));
        assert!(approx(recommended_marker_geometry(-5.0, -2.0, 2.0), 0.0));
    }

    #[test]
    fn test_label_without_marker_hugs_outer_edge() {
        let pos = data_bar_geometry(1.0, -2.0, 2.0);
        let neg = data_bar_geometry(-1.0, -2.0, 2.0);
        assert_eq!(label_anchor(&pos, None), LabelAnchor::CellStart);
        assert_eq!(label_anchor(&neg, None), LabelAnchor::CellEnd);
    }

    #[test]
    fn test_label_flips_away_from_marker() {
        let pos = data_bar_geometry(0.987, -2.0, 2.0);
        // Marker on the same side as the label: its guide line crosses the label.
        let same_side = recommended_marker_geometry(1.2, -2.0, 2.0);
        assert_eq!(label_anchor(&pos, Some(same_side)), LabelAnchor::BeforeAxis);
        // Marker on the other side leaves the label where it is.
        let other_side = recommended_marker_geometry(-1.0, -2.0, 2.0);
        assert_eq!(label_anchor(&pos, Some(other_side)), LabelAnchor::AfterAxis);
    }

    #[test]
    fn test_label_flips_for_negative_bar() {
        let neg = data_bar_geometry(-1.527, -2.0, 2.0);
        let marker = recommended_marker_geometry(-1.0, -2.0, 2.0);
        assert_eq!(label_anchor(&neg, Some(marker)), LabelAnchor::AfterAxis);
        let marker = recommended_marker_geometry(1.0, -2.0, 2.0);
        assert_eq!(label_anchor(&neg, Some(marker)), LabelAnchor::BeforeAxis);
    }

    #[test]
    fn test_exception_bar() {
        let g = exception_bar_geometry(&CellValue::Text("59.2".into()), 0.0, 100.0);
        let ExceptionBarGeometry::Bar { fraction } = g else {
            panic!("expected a bar, got {g:?}");
        };
        assert!(approx(fraction, 0.592));
        let g = exception_bar_geometry(&CellValue::Text("Good".into()), 0.0, 100.0);
        assert_eq!(g, ExceptionBarGeometry::Exception);
        let g = exception_bar_geometry(&CellValue::Empty, 0.0, 100.0);
        assert_eq!(g, ExceptionBarGeometry::Empty);
        let g = exception_bar_geometry(&CellValue::Number(150.0), 0.0, 100.0);
        assert_eq!(g, ExceptionBarGeometry::Bar { fraction: 1.0 });
    }

    fn band(current: f64) -> RangeBandGeometry {
        range_band_geometry(RangeBandValues {
            long_high: 1.290,
            long_low: 0.260,
            short_high: 1.176,
            short_low: 0.871,
            current,
        })
    }

    #[test]
    fn test_range_band_out_of_range() {
        assert_eq!(band(0.1).out_of_range, Some(OutOfRange::Below));
        assert_eq!(band(1.5).out_of_range, Some(OutOfRange::Above));
        assert_eq!(band(0.9).out_of_range, None);
        // Above the short high but inside the long band.
        assert_eq!(band(1.2).out_of_range, None);
    }

    #[test]
    fn test_range_band_bounds_are_inclusive() {
        assert_eq!(band(0.260).out_of_range, None);
        assert_eq!(band(1.290).out_of_range, None);
    }

    #[test]
    fn test_range_band_axis_fits_all_values() {
        let g = band(0.1);
        assert!(approx(g.current_position, 0.0));
        assert!(approx(g.long_band.end, 1.0));
        assert!(g.short_band.start > g.long_band.start);
        assert!(g.short_band.end < g.long_band.end);
    }

    #[test]
    fn test_range_band_degenerate_axis() {
        let g = range_band_geometry(RangeBandValues {
            long_high: 1.0,
            long_low: 1.0,
            short_high: 1.0,
            short_low: 1.0,
            current: 1.0,
        });
        assert!(approx(g.current_position, 0.5));
        assert!(approx(g.long_band.width(), 0.0));
        assert_eq!(g.out_of_range, None);
    }

    #[test]
    fn test_out_of_range_text_requires_configured_text() {
        let g = band(0.1);
        assert_eq!(g.out_of_range_text(Some("Below"), None), Some("Below"));
        assert_eq!(g.out_of_range_text(None, Some("Above")), None);
    }

    #[test]
    fn test_fixed_scale_ticks() {
        let g = fixed_scale_geometry([Some(-0.5), Some(0.3), Some(-1.2)], -1.5, 1.5);
        let values: Vec<f64> = g.ticks.iter().map(|t| t.value).collect();
        let expected = [-1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5];
        for (v, e) in values.iter().zip(expected) {
            assert!(approx(*v, e), "{v} != {e}");
        }
        assert!(approx(g.ticks[3].position, 0.5));
        assert!(approx(g.dot_positions[0].unwrap(), 1.0 / 3.0));
        assert!(approx(g.dot_positions[2].unwrap(), 0.1));
    }

    #[test]
    fn test_fixed_scale_missing_dot() {
        let g = fixed_scale_geometry([None, Some(f64::NAN), Some(5.0)], -1.5, 1.5);
        assert_eq!(g.dot_positions[0], None);
        assert_eq!(g.dot_positions[1], None);
        assert_eq!(g.dot_positions[2], Some(1.0));
    }
}
