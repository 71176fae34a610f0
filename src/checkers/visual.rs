// SPDX-License-Identifier: PMPL-1.0-or-later
//! Visual checker - WCAG 1.4.x Distinguishable, 2.3.1 Flashes, 2.4.7 Focus Visible
//!
//! Everything here works from inline `style` attributes, `<style>` blocks and
//! the viewport meta tag; no stylesheet cascade is computed.

use super::contrast::{contrast_ratio, extract_colors, required_ratio};
use super::{contains_any, Rule, SeverityWeights};
use crate::document::{Document, Element};
use crate::model::{Category, Finding, Severity};
use regex::Regex;
use std::sync::LazyLock;

pub const WEIGHTS: SeverityWeights = SeverityWeights::new(10.0, 6.0, 3.0, 1.0);

pub const RULES: &[Rule] = &[
    Rule { id: "color-contrast", check: check_color_contrast },
    Rule { id: "link-distinction", check: check_link_distinction },
    Rule { id: "color-only-information", check: check_color_only_information },
    Rule { id: "text-spacing", check: check_text_spacing },
    Rule { id: "resize", check: check_resize },
    Rule { id: "focus-indicators", check: check_focus_indicators },
    Rule { id: "motion", check: check_motion },
    Rule { id: "flashing", check: check_flashing },
    Rule { id: "visual-layout", check: check_visual_layout },
];

/// (pattern, what the color is standing in for)
const COLOR_ONLY_PATTERNS: &[(&str, &str)] = &[
    (r"빨간색.*필수", "required field marker"),
    (r"red.*required", "required field marker"),
    (r"녹색.*성공", "success state"),
    (r"green.*success", "success state"),
    (r"빨간색.*오류", "error state"),
    (r"red.*error", "error state"),
];

const CAROUSEL_CONTROL_KEYWORDS: &[&str] =
    &["pause", "stop", "play", "prev", "next", "정지", "일시정지", "재생"];

const INTERACTIVE_TAGS: &[&str] = &["a", "button", "input", "select", "textarea"];

const CHART_LABEL_CHARS: usize = 20;
const LAYOUT_TEXT_CHARS: usize = 100;

static COLOR_ONLY_RES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    COLOR_ONLY_PATTERNS
        .iter()
        .map(|(pattern, label)| {
            (Regex::new(&format!("(?i){}", pattern)).expect("valid regex"), *label)
        })
        .collect()
});

static LINE_HEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"line-height\s*:\s*([^;]+)").expect("valid regex"));
static LETTER_SPACING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"letter-spacing\s*:\s*([^;]+)").expect("valid regex"));
static FONT_SIZE_PX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"font-size\s*:\s*[\d.]+px").expect("valid regex"));
static MAX_SCALE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"maximum-scale\s*=\s*([\d.]+)").expect("valid regex"));
static WIDTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[;\s])width\s*:\s*([\d.]+)\s*(px|%|vw)").expect("valid regex")
});
static CHART_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"chart|graph").expect("valid regex"));
static CAROUSEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"carousel|slider|slideshow").expect("valid regex"));
static FAST_ANIMATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"animation-duration\s*:\s*0\.[0-4]s").expect("valid regex")
});

fn issue(rule_id: &str, severity: Severity, message: &str) -> Finding {
    Finding::new(rule_id, Category::Visual, severity, message)
}

fn inline_style(element: &Element<'_>) -> String {
    element.attr("style").unwrap_or("").to_lowercase()
}

fn without_spaces(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn style_blocks(doc: &Document) -> Vec<String> {
    doc.by_tag("style")
        .into_iter()
        .map(|s| s.text().to_lowercase())
        .collect()
}

fn check_color_contrast(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for element in doc.with_attr("style") {
        let style = element.attr("style").unwrap_or("");
        let (Some(fg), Some(bg)) = extract_colors(style) else {
            continue;
        };

        let ratio = contrast_ratio(fg, bg);
        let min_ratio = required_ratio(style);
        if ratio < min_ratio {
            let level = if min_ratio < 4.5 { "large text" } else { "normal text" };
            findings.push(
                issue(
                    "color-contrast",
                    Severity::Medium,
                    &format!("Insufficient color contrast: {:.1}:1 ({} AA requires {}:1)", ratio, level, min_ratio),
                )
                .with_description(&format!(
                    "Text and background colors do not meet the WCAG AA {} threshold",
                    level
                ))
                .with_element(element.snippet())
                .with_recommendation(&format!("Adjust the colors to reach at least {}:1", min_ratio))
                .with_wcag("1.4.3 Contrast (Minimum)"),
            );
        }
    }

    findings
}

fn has_non_color_distinction(link: &Element<'_>) -> bool {
    let style = inline_style(link);
    if style.contains("text-decoration") && !style.contains("none") {
        return true;
    }
    let compact = without_spaces(&style);
    if contains_any(
        &compact,
        &["font-weight:bold", "font-weight:700", "font-weight:800", "font-weight:900"],
    ) {
        return true;
    }
    style.contains("border") && !style.contains("none")
}

fn check_link_distinction(doc: &Document) -> Vec<Finding> {
    doc.by_tag("a")
        .into_iter()
        .filter(|a| a.has_attr("href"))
        .filter(|a| !has_non_color_distinction(a))
        .map(|a| {
            issue("link-distinction", Severity::Low, "Link is distinguished by color alone")
                .with_description("Users who cannot perceive color differences may not find the link")
                .with_element(a.snippet())
                .with_recommendation("Add an underline, bold weight or border in addition to color")
                .with_wcag("1.4.1 Use of Color")
        })
        .collect()
}

fn has_text_labels(chart: Element<'_>) -> bool {
    if chart.stripped_text().chars().count() > CHART_LABEL_CHARS {
        return true;
    }
    chart.parent().map_or(false, |parent| {
        parent
            .descendants()
            .any(|d| matches!(d.name(), "table" | "ul" | "ol" | "dl"))
    })
}

fn check_color_only_information(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();
    let page_text = doc
        .root_element()
        .map(|root| root.text().to_lowercase())
        .unwrap_or_default();

    for (re, label) in COLOR_ONLY_RES.iter() {
        if re.is_match(&page_text) {
            findings.push(
                issue(
                    "color-only-information",
                    Severity::Medium,
                    &format!("Information conveyed by color alone: {}", label),
                )
                .with_description("The page text suggests a state is signalled only through color")
                .with_recommendation("Pair the color with text, an icon or a pattern")
                .with_wcag("1.4.1 Use of Color"),
            );
        }
    }

    for chart in doc.with_attr("class") {
        if !CHART_RE.is_match(&chart.class_string()) || has_text_labels(chart) {
            continue;
        }
        findings.push(
            issue("color-only-information", Severity::Medium, "Chart or graph has no text labels")
                .with_description("The chart appears to convey its data through color only")
                .with_element(chart.snippet())
                .with_recommendation("Add text labels, patterns or a data table next to the chart")
                .with_wcag("1.4.1 Use of Color"),
        );
    }

    findings
}

fn is_insufficient_line_height(value: &str) -> bool {
    let value = value.trim();
    if let Some(pct) = value.strip_suffix('%') {
        return pct.trim().parse::<f64>().map_or(false, |p| p < 150.0);
    }
    value.parse::<f64>().map_or(false, |n| n < 1.5)
}

fn check_text_spacing(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for element in doc.with_attr("style") {
        let style = inline_style(&element);

        if let Some(caps) = LINE_HEIGHT_RE.captures(&style) {
            if is_insufficient_line_height(&caps[1]) {
                findings.push(
                    issue("text-spacing", Severity::Low, &format!("Line height is too small: {}", caps[1].trim()))
                        .with_description("Line height should be at least 1.5 times the font size")
                        .with_element(element.snippet())
                        .with_recommendation("Set line-height to 1.5 or more")
                        .with_wcag("1.4.12 Text Spacing")
                        .as_fixable(),
                );
            }
        }

        if let Some(caps) = LETTER_SPACING_RE.captures(&style) {
            let value = caps[1].trim();
            if value.starts_with('-') || value.contains("negative") {
                findings.push(
                    issue("text-spacing", Severity::Low, "Negative letter spacing")
                        .with_description("Negative letter spacing makes text harder to read")
                        .with_element(element.snippet())
                        .with_recommendation("Use normal or positive letter spacing")
                        .with_wcag("1.4.12 Text Spacing")
                        .as_fixable(),
                );
            }
        }
    }

    findings
}

fn check_resize(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    let viewport = doc
        .by_tag("meta")
        .into_iter()
        .find(|m| m.attr("name").map_or(false, |n| n.eq_ignore_ascii_case("viewport")));

    if let Some(meta) = viewport {
        let content = without_spaces(&meta.attr("content").unwrap_or("").to_lowercase());

        if content.contains("user-scalable=no") || content.contains("user-scalable=0") {
            findings.push(
                issue("resize", Severity::High, "Zoom is disabled")
                    .with_description("The viewport meta tag prevents users from zooming")
                    .with_element(meta.snippet())
                    .with_recommendation("Remove user-scalable=no from the viewport meta tag")
                    .with_wcag("1.4.4 Resize text")
                    .as_fixable(),
            );
        }

        if let Some(caps) = MAX_SCALE_RE.captures(&content) {
            if caps[1].parse::<f64>().map_or(false, |scale| scale < 2.0) {
                findings.push(
                    issue("resize", Severity::Medium, &format!("Maximum zoom is limited to {}", &caps[1]))
                        .with_description("Users must be able to zoom text to at least 200%")
                        .with_element(meta.snippet())
                        .with_recommendation("Set maximum-scale to 2 or more, or remove it")
                        .with_wcag("1.4.4 Resize text")
                        .as_fixable(),
                );
            }
        }
    }

    for element in doc.with_attr("style") {
        if FONT_SIZE_PX_RE.is_match(&inline_style(&element)) {
            findings.push(
                issue("resize", Severity::Low, "Font size is fixed in pixels")
                    .with_description("Pixel font sizes do not follow the user's preferred text size")
                    .with_element(element.snippet())
                    .with_recommendation("Use relative units such as rem or em")
                    .with_wcag("1.4.4 Resize text"),
            );
        }
    }

    findings
}

fn check_focus_indicators(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for css in style_blocks(doc) {
        let css = without_spaces(&css);
        if css.contains("outline:none") || css.contains("outline:0") {
            findings.push(
                issue("focus-indicators", Severity::Medium, "Stylesheet removes the focus outline")
                    .with_description("outline: none hides the keyboard focus indicator")
                    .with_recommendation("Provide a visible :focus style when removing the outline")
                    .with_wcag("2.4.7 Focus Visible"),
            );
        }
    }

    for element in doc.by_tags(INTERACTIVE_TAGS) {
        let style = without_spaces(&inline_style(&element));
        let removes_outline = style.contains("outline:none") || style.contains("outline:0");
        let replaced = contains_any(&style, &["border", "box-shadow", "background"]);
        if removes_outline && !replaced {
            findings.push(
                issue("focus-indicators", Severity::Medium, "Focus outline removed from interactive element")
                    .with_description("The element has no visible focus indicator")
                    .with_element(element.snippet())
                    .with_recommendation("Keep the outline or add a border or box-shadow on focus")
                    .with_wcag("2.4.7 Focus Visible")
                    .as_fixable(),
            );
        }
    }

    findings
}

fn has_carousel_controls(carousel: Element<'_>) -> bool {
    carousel.find_all("button").iter().any(|button| {
        let label = format!(
            "{} {} {}",
            button.text(),
            button.attr("aria-label").unwrap_or(""),
            button.attr("title").unwrap_or("")
        )
        .to_lowercase();
        contains_any(&label, CAROUSEL_CONTROL_KEYWORDS)
    })
}

fn check_motion(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for css in style_blocks(doc) {
        let animated = css.contains("@keyframes") || css.contains("animation:");
        if animated && !css.contains("prefers-reduced-motion") {
            findings.push(
                issue("motion", Severity::Low, "Animation does not respect reduced-motion preference")
                    .with_description("CSS animations run without a prefers-reduced-motion query")
                    .with_recommendation("Wrap animations in @media (prefers-reduced-motion: no-preference)")
                    .with_wcag("2.3.3 Animation from Interactions"),
            );
        }
    }

    for element in doc.with_attr("class") {
        if CAROUSEL_RE.is_match(&element.class_string()) && !has_carousel_controls(element) {
            findings.push(
                issue("motion", Severity::Medium, "Moving content has no pause control")
                    .with_description("Carousels and sliders need a way to pause, stop or hide them")
                    .with_element(element.snippet())
                    .with_recommendation("Add pause/play and previous/next buttons")
                    .with_wcag("2.2.2 Pause, Stop, Hide"),
            );
        }
    }

    findings
}

fn check_flashing(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    if let Some(blink) = doc.find("blink") {
        findings.push(
            issue("flashing", Severity::High, "Blinking content")
                .with_description("The <blink> element flashes content")
                .with_element(blink.snippet())
                .with_recommendation("Remove <blink> and use a static emphasis instead")
                .with_wcag("2.3.1 Three Flashes or Below Threshold")
                .as_fixable(),
        );
    }

    if let Some(marquee) = doc.find("marquee") {
        findings.push(
            issue("flashing", Severity::Medium, "Scrolling marquee content")
                .with_description("The <marquee> element moves content continuously")
                .with_element(marquee.snippet())
                .with_recommendation("Replace <marquee> with static content")
                .with_wcag("2.2.2 Pause, Stop, Hide")
                .as_fixable(),
        );
    }

    for css in style_blocks(doc) {
        if FAST_ANIMATION_RE.is_match(&css) {
            findings.push(
                issue("flashing", Severity::Medium, "Very fast animation")
                    .with_description("Animations shorter than 0.5s can produce flashing")
                    .with_recommendation("Slow animations down or remove rapid repeats")
                    .with_wcag("2.3.1 Three Flashes or Below Threshold"),
            );
        }
    }

    findings
}

fn is_excessive_width(style: &str) -> bool {
    let Some(caps) = WIDTH_RE.captures(style) else {
        return false;
    };
    let Ok(value) = caps[1].parse::<f64>() else {
        return false;
    };
    match &caps[2] {
        "px" => value > 1200.0,
        _ => value > 80.0,
    }
}

fn check_visual_layout(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for element in doc.with_attr("style") {
        let style = inline_style(&element);

        if is_excessive_width(&style) && element.stripped_text().chars().count() > LAYOUT_TEXT_CHARS {
            findings.push(
                issue("visual-layout", Severity::Low, "Text block is too wide")
                    .with_description("Long lines of text are hard to track")
                    .with_element(element.snippet())
                    .with_recommendation("Limit line length to about 80 characters, e.g. max-width: 80ch")
                    .with_wcag("1.4.8 Visual Presentation"),
            );
        }

        if without_spaces(&style).contains("text-align:justify") {
            findings.push(
                issue("visual-layout", Severity::Low, "Justified text")
                    .with_description("Justified text creates uneven spacing between words")
                    .with_element(element.snippet())
                    .with_recommendation("Use left-aligned text")
                    .with_wcag("1.4.8 Visual Presentation")
                    .as_fixable(),
            );
        }
    }

    findings
}
