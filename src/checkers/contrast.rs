// SPDX-License-Identifier: PMPL-1.0-or-later
//! Color parsing and WCAG contrast math - 1.4.3 Contrast (Minimum)
//!
//! Colors are read from inline `style` declarations only; no cascade is
//! resolved. Contrast thresholds:
//! - 4.5:1 for normal text
//! - 3:1 for large text (24px / 18pt, or bold at 18px / 14pt)

use regex::Regex;
use std::sync::LazyLock;

/// An sRGB color
pub type Rgb = (u8, u8, u8);

pub const NORMAL_TEXT_MIN_RATIO: f64 = 4.5;
pub const LARGE_TEXT_MIN_RATIO: f64 = 3.0;

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|;)\s*color\s*:\s*([^;]+)").expect("valid regex"));
static BG_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)background-color\s*:\s*([^;]+)").expect("valid regex"));
static BG_SHORTHAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)background\s*:\s*([^;]+)").expect("valid regex"));
static COLOR_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)#[0-9a-f]{3,6}\b|rgba?\([^)]+\)|hsla?\([^)]+\)").expect("valid regex")
});
static RGB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"rgba?\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)").expect("valid regex")
});
static FONT_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)font-size\s*:\s*([^;]+)").expect("valid regex"));
static FONT_WEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)font-weight\s*:\s*([^;]+)").expect("valid regex"));

/// Parse a CSS hex color (#rgb, #rrggbb) into (r, g, b) components
pub fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            Some((r, g, b))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        _ => None,
    }
}

/// Parse an rgb() or rgba() color into (r, g, b); alpha is ignored
pub fn parse_rgb_color(value: &str) -> Option<Rgb> {
    let caps = RGB_RE.captures(value)?;
    let r: u8 = caps[1].parse().ok()?;
    let g: u8 = caps[2].parse().ok()?;
    let b: u8 = caps[3].parse().ok()?;
    Some((r, g, b))
}

/// Parse a named CSS color from the fixed keyword table
pub fn parse_named_color(name: &str) -> Option<Rgb> {
    match name {
        "white" => Some((255, 255, 255)),
        "black" => Some((0, 0, 0)),
        "red" => Some((255, 0, 0)),
        "green" => Some((0, 128, 0)),
        "blue" => Some((0, 0, 255)),
        "yellow" => Some((255, 255, 0)),
        "orange" => Some((255, 165, 0)),
        "purple" => Some((128, 0, 128)),
        "pink" => Some((255, 192, 203)),
        "brown" => Some((165, 42, 42)),
        "gray" | "grey" => Some((128, 128, 128)),
        "silver" => Some((192, 192, 192)),
        "maroon" => Some((128, 0, 0)),
        "olive" => Some((128, 128, 0)),
        "lime" => Some((0, 255, 0)),
        "aqua" | "cyan" => Some((0, 255, 255)),
        "teal" => Some((0, 128, 128)),
        "navy" => Some((0, 0, 128)),
        "fuchsia" | "magenta" => Some((255, 0, 255)),
        _ => None,
    }
}

/// Parse any supported CSS color value; `transparent` and `hsl()` give `None`
pub fn parse_color(value: &str) -> Option<Rgb> {
    let trimmed = value.trim().trim_end_matches("!important").trim().to_lowercase();
    if trimmed.starts_with('#') {
        parse_hex_color(&trimmed)
    } else if trimmed.starts_with("rgb") {
        parse_rgb_color(&trimmed)
    } else {
        parse_named_color(&trimmed)
    }
}

/// Pull the color token out of a `background` shorthand value
fn color_in_background(value: &str) -> Option<Rgb> {
    if let Some(m) = COLOR_TOKEN_RE.find(value) {
        return parse_color(m.as_str());
    }
    value
        .split(|c: char| c.is_whitespace() || c == ',')
        .find_map(|token| parse_named_color(&token.to_lowercase()))
}

/// Foreground and background colors declared in an inline style
pub fn extract_colors(style: &str) -> (Option<Rgb>, Option<Rgb>) {
    let fg = COLOR_RE
        .captures(style)
        .and_then(|c| parse_color(&c[1]));

    let bg = match BG_COLOR_RE.captures(style) {
        Some(c) => parse_color(&c[1]),
        None => BG_SHORTHAND_RE
            .captures(style)
            .and_then(|c| color_in_background(&c[1])),
    };

    (fg, bg)
}

/// Calculate relative luminance per WCAG 2.x
/// <https://www.w3.org/TR/WCAG21/#dfn-relative-luminance>
pub fn relative_luminance(r: u8, g: u8, b: u8) -> f64 {
    let srgb = [r, g, b].map(|c| {
        let v = c as f64 / 255.0;
        if v <= 0.03928 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    });
    0.2126 * srgb[0] + 0.7152 * srgb[1] + 0.0722 * srgb[2]
}

/// Calculate contrast ratio between two colors
/// Returns a ratio >= 1.0 (e.g., 4.5, 7.0, 21.0)
pub fn contrast_ratio(fg: Rgb, bg: Rgb) -> f64 {
    let l1 = relative_luminance(fg.0, fg.1, fg.2);
    let l2 = relative_luminance(bg.0, bg.1, bg.2);
    let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
    (lighter + 0.05) / (darker + 0.05)
}

enum FontSize {
    Px(f64),
    Pt(f64),
}

fn font_size(style: &str) -> Option<FontSize> {
    let value = FONT_SIZE_RE.captures(style)?[1].trim().to_lowercase();
    if let Some(px) = value.strip_suffix("px") {
        px.trim().parse().ok().map(FontSize::Px)
    } else if let Some(pt) = value.strip_suffix("pt") {
        pt.trim().parse().ok().map(FontSize::Pt)
    } else {
        None
    }
}

fn is_bold(style: &str) -> bool {
    FONT_WEIGHT_RE.captures(style).map_or(false, |c| {
        matches!(c[1].trim().to_lowercase().as_str(), "bold" | "bolder" | "700" | "800" | "900")
    })
}

/// Whether inline style declares large text
pub fn is_large_text(style: &str) -> bool {
    let bold = is_bold(style);
    match font_size(style) {
        Some(FontSize::Px(px)) => px >= 24.0 || (bold && px >= 18.0),
        Some(FontSize::Pt(pt)) => pt >= 18.0 || (bold && pt >= 14.0),
        None => false,
    }
}

/// Minimum ratio for the text size declared in `style`
pub fn required_ratio(style: &str) -> f64 {
    if is_large_text(style) {
        LARGE_TEXT_MIN_RATIO
    } else {
        NORMAL_TEXT_MIN_RATIO
    }
}
