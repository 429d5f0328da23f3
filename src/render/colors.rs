//! Color utilities for overlay rendering.
//!
//! Colors travel through the crate as CSS strings, so host-supplied values
//! such as `"yellow"` or `"rgba(0,0,0,.1)"` pass through untouched. Parsing
//! only happens where color math is needed (theme borders, text contrast).

/// A CSS color string (e.g., "#FF0000", "rgba(255, 0, 0, 0.5)", "lightblue")
pub type CssColor = String;

/// RGB color with u8 components for color math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse from a hex string (with or without #).
    /// Returns None if the format is invalid.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
        let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
        let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
        Some(Self { r, g, b })
    }

    /// Convert to lowercase CSS hex (#rrggbb).
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Scale every channel by `(100 + percent) / 100`, saturating at 255.
    /// Negative percentages darken, positive ones brighten.
    pub fn scale(self, percent: f64) -> Self {
        let factor = (100.0 + percent) / 100.0;
        Self {
            r: Self::scale_component(self.r, factor),
            g: Self::scale_component(self.g, factor),
            b: Self::scale_component(self.b, factor),
        }
    }

    /// Calculate relative luminance (0.0 to 1.0).
    /// Uses simplified formula: 0.299*R + 0.587*G + 0.114*B
    pub fn luminance(self) -> f64 {
        let r = f64::from(self.r);
        let g = f64::from(self.g);
        let b = f64::from(self.b);
        (0.299 * r + 0.587 * g + 0.114 * b) / 255.0
    }

    /// Check if this is a light color (luminance > 0.5).
    pub fn is_light(self) -> bool {
        self.luminance() > 0.5
    }

    /// The cast is safe because we clamp to [0, 255] before converting.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn scale_component(from: u8, factor: f64) -> u8 {
        (f64::from(from) * factor.max(0.0)).round().clamp(0.0, 255.0) as u8
    }
}

/// Lighten or darken a hex color by a percentage (`-5.0` darkens by 5%).
///
/// Non-hex inputs (named colors, `rgb()`) come back unchanged.
pub fn adjust_color(color: &str, percent: f64) -> CssColor {
    Rgb::from_hex(color).map_or_else(|| color.to_string(), |rgb| rgb.scale(percent).to_hex())
}

/// Parse color and return RGBA components (0-255 for RGB, 0.0-1.0 for alpha)
pub fn parse_color_rgba(s: &str) -> Option<(u8, u8, u8, f64)> {
    let s = s.trim();

    if s.starts_with("rgba(") {
        parse_rgba_string(s)
    } else if s.starts_with("rgb(") {
        parse_rgb_string(s)
    } else {
        let rgb = Rgb::from_hex(s)?;
        Some((rgb.r, rgb.g, rgb.b, 1.0))
    }
}

fn parse_rgb_string(s: &str) -> Option<(u8, u8, u8, f64)> {
    let inner = s.strip_prefix("rgb(")?.strip_suffix(')')?;
    let mut parts = inner.split(',').map(str::trim);
    let r: u8 = parts.next()?.parse().ok()?;
    let g: u8 = parts.next()?.parse().ok()?;
    let b: u8 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((r, g, b, 1.0))
}

fn parse_rgba_string(s: &str) -> Option<(u8, u8, u8, f64)> {
    let inner = s.strip_prefix("rgba(")?.strip_suffix(')')?;
    let mut parts = inner.split(',').map(str::trim);
    let r: u8 = parts.next()?.parse().ok()?;
    let g: u8 = parts.next()?.parse().ok()?;
    let b: u8 = parts.next()?.parse().ok()?;
    let a: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((r, g, b, a))
}

/// Text color readable on top of `background`. Unparseable backgrounds
/// (named colors) get the default dark text.
pub fn contrasting_text(background: &str) -> &'static str {
    match parse_color_rgba(background) {
        Some((r, g, b, a)) if a > 0.5 && !Rgb::new(r, g, b).is_light() => palette::WHITE,
        _ => palette::TEXT,
    }
}

/// Fixed colors of the overlay chrome.
pub mod palette {
    pub const WHITE: &str = "#FFFFFF";
    pub const TEXT: &str = "#000000";

    /// Data bar fills, read from custom properties so a stylesheet can
    /// override them.
    pub const POSITIVE_BAR: &str = "var(--pos-color)";
    pub const NEGATIVE_BAR: &str = "var(--neg-color)";
    pub const POSITIVE_FILL: &str = "#4ade80";
    pub const NEGATIVE_FILL: &str = "#f87171";

    /// Scale ticks and the fixed-scale midpoint line.
    pub const TICK: &str = "#9CA3AF";
    pub const TICK_LABEL: &str = "#6B7280";

    /// Inset ring around the range band's current marker.
    pub const MARKER_RING: &str = "0 0 0 2px #fff inset, 0 0 0 1px rgba(0,0,0,.12)";

    pub const TOOLTIP_BG: &str = "rgba(218, 218, 218, 0.76)";
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
    fn test_adjust_color_darkens() {
        // 240 * 0.95 = 228 (0xe4)
        assert_eq!(adjust_color("#F0F2F6", -5.0), "#e4e6ea");
    }

    #[test]
    fn test_adjust_color_saturates() {
        assert_eq!(adjust_color("#F0F0F0", 10.0), "#ffffff");
    }

    #[test]
    fn test_adjust_color_passes_named_colors() {
        assert_eq!(adjust_color("lightblue", -5.0), "lightblue");
    }

    #[test]
    fn test_parse_rgb() {
        assert_eq!(parse_color_rgba("rgb(255, 128, 64)"), Some((255, 128, 64, 1.0)));
    }

    #[test]
    fn test_parse_rgba() {
        let (r, g, b, a) = parse_color_rgba("rgba(255, 128, 64, 0.5)").unwrap();
        assert_eq!((r, g, b), (255, 128, 64));
        assert!((a - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_contrasting_text() {
        assert_eq!(contrasting_text("#1F2937"), "#FFFFFF");
        assert_eq!(contrasting_text("#FDE68A"), "#000000");
        assert_eq!(contrasting_text("yellow"), "#000000");
        assert_eq!(contrasting_text("rgba(0, 0, 0, 0.1)"), "#000000");
    }
}
