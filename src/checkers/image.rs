// SPDX-License-Identifier: PMPL-1.0-or-later
//! Image checker - WCAG 1.1.1 Non-text Content (Level A)
//!
//! Checks that images carry appropriate alternatives:
//! - Every `<img>` has an `alt` attribute, and non-empty alt is meaningful
//! - Decorative images use `alt=""` or `role="presentation"`
//! - Charts, graphs and maps have a long description
//! - Image links, CSS background images, figures and inline SVG are named

use super::{contains_any, Rule, SeverityWeights};
use crate::document::{Document, Element};
use crate::model::{Category, Finding, Severity};
use regex::Regex;
use std::sync::LazyLock;

pub const WEIGHTS: SeverityWeights = SeverityWeights::new(12.0, 8.0, 4.0, 1.0);

pub const RULES: &[Rule] = &[
    Rule { id: "img-alt", check: check_alt_attributes },
    Rule { id: "alt-quality", check: check_alt_quality },
    Rule { id: "decorative-images", check: check_decorative },
    Rule { id: "complex-images", check: check_complex },
    Rule { id: "background-images", check: check_background_images },
    Rule { id: "image-links", check: check_image_links },
    Rule { id: "figure-captions", check: check_figures },
    Rule { id: "svg-names", check: check_svg },
];

/// Alt values that say nothing about the image
const MEANINGLESS_ALT: &[&str] = &[
    "image", "img", "picture", "pic", "photo", "graphic", "untitled", "no title", "no name",
    "default", "placeholder", "temp", "test",
];

const FILE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg"];

const REDUNDANT_PREFIXES: &[&str] = &[
    "image of", "picture of", "photo of", "graphic of", "illustration of", "이미지", "사진",
    "그래픽", "일러스트", "그림",
];

const DECORATIVE_KEYWORDS: &[&str] = &[
    "decoration", "decorative", "ornament", "ornamental", "bg", "background", "spacer",
    "divider", "separator", "bullet", "icon-bg", "pattern",
];

const COMPLEX_FILENAME_KEYWORDS: &[&str] = &["chart", "graph", "diagram", "infographic", "map"];

const COMPLEX_ALT_KEYWORDS: &[&str] = &[
    "chart", "graph", "diagram", "map", "차트", "그래프", "도표", "지도", "다이어그램",
];

const INFORMATIVE_BACKGROUND_CLASSES: &[&str] = &["logo", "banner", "hero", "chart", "graph"];

const MAX_ALT_CHARS: usize = 125;

/// Largest declared dimension of a spacer-style image
const TINY_IMAGE_PX: u32 = 5;

/// Sibling text length that counts as a nearby long description
const LONG_DESCRIPTION_CHARS: usize = 50;

fn issue(rule_id: &str, severity: Severity, message: &str) -> Finding {
    Finding::new(rule_id, Category::Image, severity, message)
}

/// Filename stem of an image source with separators turned into spaces,
/// e.g. `/img/team-photo_2024.png` gives `team photo 2024`
pub fn filename_tokens(src: &str) -> Option<String> {
    let stem = src
        .split(['?', '#'])
        .next()
        .unwrap_or("")
        .rsplit('/')
        .next()
        .unwrap_or("")
        .split('.')
        .next()
        .unwrap_or("");
    if stem.is_empty() {
        return None;
    }
    Some(stem.to_lowercase().replace(['-', '_'], " "))
}

/// Whether non-empty alt text is a placeholder or just the filename
pub fn is_meaningless_alt(alt: &str, src: &str) -> bool {
    let alt = alt.trim().to_lowercase();
    MEANINGLESS_ALT.contains(&alt.as_str()) || filename_tokens(src).map_or(false, |f| f == alt)
}

fn parse_dimension(value: Option<&str>) -> Option<u32> {
    value?.trim().trim_end_matches("px").parse().ok()
}

/// Whether the image looks like decoration (spacers, dividers, backgrounds)
pub fn is_likely_decorative(img: Element<'_>) -> bool {
    let src = img.attr("src").unwrap_or("").to_lowercase();
    if contains_any(&src, DECORATIVE_KEYWORDS) {
        return true;
    }

    if img
        .classes()
        .any(|c| contains_any(&c.to_lowercase(), DECORATIVE_KEYWORDS))
    {
        return true;
    }

    match (parse_dimension(img.attr("width")), parse_dimension(img.attr("height"))) {
        (Some(w), Some(h)) => w <= TINY_IMAGE_PX || h <= TINY_IMAGE_PX,
        _ => false,
    }
}

/// Whether the image looks like a chart, graph, diagram or map
pub fn is_complex_image(img: Element<'_>) -> bool {
    let src = img.attr("src").unwrap_or("").to_lowercase();
    let alt = img.attr("alt").unwrap_or("").to_lowercase();
    contains_any(&src, COMPLEX_FILENAME_KEYWORDS) || contains_any(&alt, COMPLEX_ALT_KEYWORDS)
}

fn has_nearby_description(img: Element<'_>) -> bool {
    img.parent().map_or(false, |parent| {
        parent
            .next_siblings()
            .take(3)
            .any(|s| s.stripped_text().chars().count() > LONG_DESCRIPTION_CHARS)
    })
}

fn check_alt_attributes(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for img in doc.by_tag("img") {
        let src = img.attr("src").unwrap_or("");
        let presentation = img.attr("role") == Some("presentation");

        let Some(alt) = img.attr("alt") else {
            if !presentation {
                findings.push(
                    issue("img-alt", Severity::High, "Image has no alt attribute")
                        .with_description(&format!(
                            "Image '{}' has no accessible name: the alt attribute is missing",
                            src
                        ))
                        .with_element(img.snippet())
                        .with_recommendation("Add alt text describing the image, or alt=\"\" if it is decorative")
                        .with_wcag("1.1.1 Non-text Content")
                        .as_fixable(),
                );
            }
            continue;
        };

        if alt.is_empty() || presentation {
            continue;
        }

        if is_meaningless_alt(alt, src) {
            findings.push(
                issue("img-alt", Severity::Medium, &format!("Meaningless alt text: '{}'", alt))
                    .with_description("The alt text does not describe the image content or purpose")
                    .with_element(img.snippet())
                    .with_recommendation("Describe what the image shows or why it is there")
                    .with_wcag("1.1.1 Non-text Content"),
            );
        }

        let length = alt.chars().count();
        if length > MAX_ALT_CHARS {
            findings.push(
                issue("img-alt", Severity::Low, &format!("Alt text is too long ({} characters)", length))
                    .with_description("Alt text longer than 125 characters is hard to follow")
                    .with_element(img.snippet())
                    .with_recommendation("Shorten the alt text and move details to a caption or long description")
                    .with_wcag("1.1.1 Non-text Content"),
            );
        }

        if contains_any(&alt.to_lowercase(), FILE_EXTENSIONS) {
            findings.push(
                issue("img-alt", Severity::Low, "Alt text contains a file extension")
                    .with_description("The alt text includes an image file extension")
                    .with_element(img.snippet())
                    .with_recommendation("Remove the file name and describe the image")
                    .with_wcag("1.1.1 Non-text Content")
                    .as_fixable(),
            );
        }
    }

    findings
}

fn check_alt_quality(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for img in doc.by_tag("img") {
        let Some(alt) = img.attr("alt").map(str::trim).filter(|a| !a.is_empty()) else {
            continue;
        };
        let alt_lower = alt.to_lowercase();

        if let Some(prefix) = REDUNDANT_PREFIXES.iter().find(|p| alt_lower.starts_with(*p)) {
            findings.push(
                issue("alt-quality", Severity::Low, &format!("Redundant alt text prefix: '{}'", prefix))
                    .with_description("Screen readers already announce images; the prefix adds noise")
                    .with_element(img.snippet())
                    .with_recommendation("Remove the prefix and start with the description")
                    .with_wcag("1.1.1 Non-text Content")
                    .as_fixable(),
            );
        }

        let from_filename = img
            .attr("src")
            .and_then(filename_tokens)
            .map_or(false, |tokens| alt_lower.contains(&tokens));
        if from_filename {
            findings.push(
                issue("alt-quality", Severity::Medium, "Alt text resembles the file name")
                    .with_description("The alt text appears to reuse the image file name")
                    .with_element(img.snippet())
                    .with_recommendation("Write alt text that describes the image content")
                    .with_wcag("1.1.1 Non-text Content"),
            );
        }
    }

    findings
}

fn check_decorative(doc: &Document) -> Vec<Finding> {
    doc.by_tag("img")
        .into_iter()
        .filter(|img| {
            is_likely_decorative(*img)
                && img.attr("alt").map_or(false, |alt| !alt.is_empty())
                && img.attr("role") != Some("presentation")
        })
        .map(|img| {
            issue("decorative-images", Severity::Medium, "Decorative image has alt text")
                .with_description("The image looks decorative but screen readers will announce its alt text")
                .with_element(img.snippet())
                .with_recommendation("Use alt=\"\" or role=\"presentation\" for decorative images")
                .with_wcag("1.1.1 Non-text Content")
                .as_fixable()
        })
        .collect()
}

fn check_complex(doc: &Document) -> Vec<Finding> {
    doc.by_tag("img")
        .into_iter()
        .filter(|img| {
            is_complex_image(*img)
                && img.non_empty_attr("longdesc").is_none()
                && img.non_empty_attr("aria-describedby").is_none()
                && !has_nearby_description(*img)
        })
        .map(|img| {
            issue("complex-images", Severity::Medium, "Complex image has no long description")
                .with_description("Charts, graphs and maps need a detailed text description")
                .with_element(img.snippet())
                .with_recommendation("Describe the data next to the image or link it with aria-describedby")
                .with_wcag("1.1.1 Non-text Content")
        })
        .collect()
}

static BACKGROUND_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)background-image").expect("valid regex"));

fn check_background_images(doc: &Document) -> Vec<Finding> {
    doc.with_attr("style")
        .into_iter()
        .filter(|e| BACKGROUND_IMAGE_RE.is_match(e.attr("style").unwrap_or("")))
        .filter(|e| {
            let text = e.stripped_text();
            let informative = text.is_empty()
                || e.classes()
                    .any(|c| contains_any(&c.to_lowercase(), INFORMATIVE_BACKGROUND_CLASSES));
            let named = e.non_empty_attr("aria-label").is_some()
                || e.non_empty_attr("aria-labelledby").is_some()
                || !text.is_empty();
            informative && !named
        })
        .map(|e| {
            issue("background-images", Severity::Medium, "Informative background image has no text alternative")
                .with_description("A CSS background image that conveys content has no text alternative")
                .with_element(e.snippet())
                .with_recommendation("Add aria-label with role=\"img\", or visually hidden text")
                .with_wcag("1.1.1 Non-text Content")
        })
        .collect()
}

fn check_image_links(doc: &Document) -> Vec<Finding> {
    doc.by_tag("a")
        .into_iter()
        .filter(|link| link.has_attr("href"))
        .filter(|link| {
            let images = link.find_all("img");
            if images.is_empty() || !link.stripped_text().is_empty() {
                return false;
            }
            let named = images.iter().any(|img| img.non_empty_attr("alt").is_some())
                || link.non_empty_attr("aria-label").is_some()
                || link.non_empty_attr("aria-labelledby").is_some();
            !named
        })
        .map(|link| {
            issue("image-links", Severity::High, "Image link has no accessible name")
                .with_description("The link contains only images and none of them has alt text")
                .with_element(link.snippet())
                .with_recommendation("Give the image alt text describing the link destination")
                .with_wcag("2.4.4 Link Purpose")
                .as_fixable()
        })
        .collect()
}

fn check_figures(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for figure in doc.by_tag("figure") {
        match figure.find("figcaption") {
            None => findings.push(
                issue("figure-captions", Severity::Low, "Figure has no figcaption")
                    .with_description("The figure has no caption")
                    .with_element(figure.snippet())
                    .with_recommendation("Add a <figcaption> describing the figure")
                    .with_wcag("1.1.1 Non-text Content"),
            ),
            Some(caption) if caption.stripped_text().is_empty() => findings.push(
                issue("figure-captions", Severity::Low, "Empty figcaption")
                    .with_description("The figcaption has no text")
                    .with_element(caption.snippet())
                    .with_recommendation("Write a caption or remove the empty figcaption")
                    .with_wcag("1.1.1 Non-text Content"),
            ),
            Some(_) => {}
        }
    }

    findings
}

fn check_svg(doc: &Document) -> Vec<Finding> {
    doc.by_tag("svg")
        .into_iter()
        .filter(|svg| {
            let decorative =
                svg.attr("role") == Some("presentation") || svg.attr("aria-hidden") == Some("true");
            let named = svg.find("title").is_some()
                || svg.non_empty_attr("aria-label").is_some()
                || svg.non_empty_attr("aria-labelledby").is_some();
            !decorative && !named
        })
        .map(|svg| {
            issue("svg-names", Severity::Medium, "SVG has no accessible name")
                .with_description("An informative SVG has no title or label")
                .with_element(svg.snippet())
                .with_recommendation("Add a <title>, aria-label, or aria-hidden=\"true\" if decorative")
                .with_wcag("1.1.1 Non-text Content")
                .as_fixable()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(check: fn(&Document) -> Vec<Finding>, html: &str) -> Vec<Finding> {
        check(&Document::parse(html).unwrap())
    }

    #[test]
    fn test_missing_alt() {
        let findings = run(check_alt_attributes, r#"<img src="team.png">"#);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
        assert!(findings[0].description.contains("accessible name"));
    }

    #[test]
    fn test_empty_alt_and_presentation_are_decorative() {
        assert!(run(check_alt_attributes, r#"<img src="team.png" alt="">"#).is_empty());
        assert!(run(check_alt_attributes, r#"<img src="a.png" role="presentation">"#).is_empty());
        assert!(run(check_alt_attributes, r#"<img src="a.png" alt="image" role="presentation">"#).is_empty());
    }

    #[test]
    fn test_meaningless_alt() {
        let findings = run(check_alt_attributes, r#"<img src="x.png" alt="Photo">"#);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);

        let findings = run(check_alt_attributes, r#"<img src="/img/team-lead.jpg" alt="Team lead">"#);
        assert_eq!(findings.len(), 1);

        // Equality, not substring
        assert!(run(check_alt_attributes, r#"<img src="x.png" alt="Photo of the harbour at dawn">"#).is_empty());
    }

    #[test]
    fn test_long_alt_and_extension() {
        let long = "a".repeat(130);
        let findings = run(check_alt_attributes, &format!(r#"<img src="x.png" alt="{}">"#, long));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Low);

        let findings = run(check_alt_attributes, r#"<img src="x.png" alt="sunset.jpg over hills">"#);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("extension"));
    }

    #[test]
    fn test_filename_tokens() {
        assert_eq!(filename_tokens("/img/team-photo_2024.png?v=2").as_deref(), Some("team photo 2024"));
        assert_eq!(filename_tokens("https://cdn.example.com/"), None);
    }

    #[test]
    fn test_alt_quality() {
        let findings = run(
            check_alt_quality,
            r#"<img src="dog-1.png" alt="Image of a dog"><img src="red-barn.jpg" alt="Red barn at sunset">"#,
        );
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].severity, Severity::Low);
        assert_eq!(findings[1].severity, Severity::Medium);
    }

    #[test]
    fn test_decorative_heuristics() {
        let findings = run(
            check_decorative,
            r#"<img src="spacer.gif" alt="spacer">
               <img src="photo.jpg" class="divider-line" alt="line">
               <img src="p.png" width="1" height="1" alt="pixel">
               <img src="bg-wave.png" alt="">
               <img src="bg-wave.png" alt="wave" role="presentation">"#,
        );
        assert_eq!(findings.len(), 3);
    }

    #[test]
    fn test_tiny_size_needs_both_dimensions() {
        let doc = Document::parse(
            r#"<img src="a.png" width="2" alt="a">
               <img src="b.png" width="400" height="3" alt="b">
               <img src="c.png" height="1" alt="c">"#,
        )
        .unwrap();
        let decorative: Vec<bool> = doc.by_tag("img").into_iter().map(is_likely_decorative).collect();
        assert_eq!(decorative, vec![false, true, false]);
    }

    #[test]
    fn test_complex_images() {
        let findings = run(check_complex, r#"<div><img src="sales-chart.png" alt="Sales"></div>"#);
        assert_eq!(findings.len(), 1);

        let described = run(
            check_complex,
            r#"<div><img src="sales-chart.png" alt="Sales"></div>
               <p>Sales grew from 10 to 40 units per month across the first three quarters.</p>"#,
        );
        assert!(described.is_empty());

        let linked = run(check_complex, r#"<img src="map.png" alt="Campus map" aria-describedby="d">"#);
        assert!(linked.is_empty());
    }

    #[test]
    fn test_background_images() {
        let findings = run(
            check_background_images,
            r#"<div class="hero" style="background-image: url(h.jpg)"></div>
               <div style="background-image: url(h.jpg)">Welcome</div>
               <div style="background-image: url(h.jpg)" aria-label="Company logo"></div>"#,
        );
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_image_links() {
        let findings = run(
            check_image_links,
            r#"<a href="/"><img src="home.png"></a>
               <a href="/"><img src="home.png" alt="Home"></a>
               <a href="/" aria-label="Home"><img src="home.png"></a>
               <a href="/">Home <img src="home.png"></a>"#,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
    }

    #[test]
    fn test_figures() {
        let findings = run(
            check_figures,
            "<figure><img src='a.png' alt='A'></figure><figure><figcaption> </figcaption></figure>",
        );
        assert_eq!(findings.len(), 2);
        assert!(run(check_figures, "<figure><figcaption>Fig 1</figcaption></figure>").is_empty());
    }

    #[test]
    fn test_svg_names() {
        let findings = run(
            check_svg,
            r#"<svg></svg><svg aria-hidden="true"></svg><svg><title>Logo</title></svg><svg aria-label="Logo"></svg>"#,
        );
        assert_eq!(findings.len(), 1);
    }
}
