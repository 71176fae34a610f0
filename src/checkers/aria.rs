// SPDX-License-Identifier: PMPL-1.0-or-later
//! ARIA checker - WCAG 4.1.2 Name, Role, Value and 2.4.1 Bypass Blocks
//!
//! Validates accessible names on form controls, role values and their
//! required states, boolean ARIA attribute values, landmark cardinality,
//! `aria-hidden` on focusable elements, live regions, `aria-describedby`
//! references, tabindex values and the presence of a skip link.

use super::{Rule, SeverityWeights};
use crate::document::{Document, Element};
use crate::model::{Category, Finding, Severity};

pub const WEIGHTS: SeverityWeights = SeverityWeights::new(20.0, 10.0, 5.0, 2.0);

pub const RULES: &[Rule] = &[
    Rule { id: "aria-labels", check: check_labels },
    Rule { id: "aria-roles", check: check_roles },
    Rule { id: "aria-properties", check: check_properties },
    Rule { id: "landmark-roles", check: check_landmarks },
    Rule { id: "aria-hidden-focusable", check: check_hidden_focusable },
    Rule { id: "aria-live-regions", check: check_live_regions },
    Rule { id: "aria-describedby", check: check_describedby },
    Rule { id: "tabindex-usage", check: check_tabindex },
    Rule { id: "skip-link", check: check_skip_link },
];

const INTERACTIVE_ROLES: &[&str] = &[
    "button", "checkbox", "combobox", "gridcell", "link", "menuitem", "menuitemcheckbox",
    "menuitemradio", "option", "radio", "searchbox", "slider", "spinbutton", "switch", "tab",
    "textbox", "treeitem",
];

const LANDMARK_ROLES: &[&str] = &[
    "banner", "complementary", "contentinfo", "form", "main", "navigation", "region", "search",
];

const OTHER_ROLES: &[&str] = &[
    "alert", "alertdialog", "application", "article", "cell", "columnheader", "definition",
    "dialog", "directory", "document", "figure", "group", "heading", "img", "list", "listitem",
    "log", "marquee", "math", "note", "presentation", "progressbar", "row", "rowgroup",
    "rowheader", "scrollbar", "separator", "status", "table", "tablist", "tabpanel", "term",
    "timer", "toolbar", "tooltip", "tree", "treegrid",
];

/// States a role cannot be used without
const REQUIRED_PROPS: &[(&str, &[&str])] = &[
    ("checkbox", &["aria-checked"]),
    ("combobox", &["aria-expanded"]),
    ("gridcell", &["aria-selected"]),
    ("menuitemcheckbox", &["aria-checked"]),
    ("menuitemradio", &["aria-checked"]),
    ("radio", &["aria-checked"]),
    ("slider", &["aria-valuemin", "aria-valuemax", "aria-valuenow"]),
    ("spinbutton", &["aria-valuemin", "aria-valuemax", "aria-valuenow"]),
    ("switch", &["aria-checked"]),
    ("tab", &["aria-selected"]),
    ("treeitem", &["aria-selected"]),
];

const BOOLEAN_PROPS: &[&str] = &[
    "aria-checked",
    "aria-disabled",
    "aria-expanded",
    "aria-hidden",
    "aria-invalid",
    "aria-pressed",
    "aria-readonly",
    "aria-required",
    "aria-selected",
];

const LIVE_VALUES: &[&str] = &["off", "polite", "assertive"];

const FOCUSABLE_TAGS: &[&str] = &["a", "button", "input", "select", "textarea"];

const EXEMPT_INPUT_TYPES: &[&str] = &["hidden", "submit", "button"];

fn issue(rule_id: &str, severity: Severity, message: &str) -> Finding {
    Finding::new(rule_id, Category::Aria, severity, message)
}

/// Whether the role value is on the allow-list
pub fn is_valid_role(role: &str) -> bool {
    INTERACTIVE_ROLES.contains(&role) || LANDMARK_ROLES.contains(&role) || OTHER_ROLES.contains(&role)
}

/// Whether a form control has an accessible name
pub fn has_accessible_name(doc: &Document, element: Element<'_>) -> bool {
    if element.non_empty_attr("aria-label").is_some()
        || element.non_empty_attr("aria-labelledby").is_some()
    {
        return true;
    }

    if let Some(id) = element.non_empty_attr("id") {
        if doc.label_for(id).is_some() {
            return true;
        }
    }

    element.name() == "button" && !element.stripped_text().is_empty()
}

fn is_focusable(element: Element<'_>) -> bool {
    if FOCUSABLE_TAGS.contains(&element.name()) {
        return true;
    }
    element
        .attr("tabindex")
        .and_then(|t| t.trim().parse::<i64>().ok())
        .map_or(false, |t| t >= 0)
}

fn check_labels(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for element in doc.by_tags(&["button", "input", "select", "textarea"]) {
        if element.name() == "input" {
            let input_type = element.attr("type").unwrap_or("").to_lowercase();
            if EXEMPT_INPUT_TYPES.contains(&input_type.as_str()) {
                continue;
            }
        }

        if !has_accessible_name(doc, element) {
            findings.push(
                issue(
                    "aria-labels",
                    Severity::High,
                    &format!("<{}> element has no accessible name", element.name()),
                )
                .with_description(&format!(
                    "<{}> needs an aria-label, aria-labelledby or an associated <label>",
                    element.name()
                ))
                .with_element(element.snippet())
                .with_recommendation("Add an aria-label attribute or associate a <label> element")
                .with_wcag("4.1.2 Name, Role, Value")
                .as_fixable(),
            );
        }
    }

    findings
}

fn check_roles(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for element in doc.with_attr("role") {
        let role = element.attr("role").unwrap_or("");

        if !is_valid_role(role) {
            findings.push(
                issue("aria-roles", Severity::Medium, &format!("Invalid role value: '{}'", role))
                    .with_description(&format!("'{}' is not a valid ARIA role", role))
                    .with_element(element.snippet())
                    .with_recommendation("Use a valid ARIA role")
                    .with_wcag("4.1.2 Name, Role, Value"),
            );
            continue;
        }

        let required = REQUIRED_PROPS
            .iter()
            .find(|(r, _)| *r == role)
            .map_or(&[][..], |(_, props)| *props);

        for prop in required {
            if element.attr(prop).map_or(true, str::is_empty) {
                findings.push(
                    issue(
                        "aria-roles",
                        Severity::High,
                        &format!("role='{}' is missing required attribute '{}'", role, prop),
                    )
                    .with_description(&format!("The {} role requires the {} attribute", role, prop))
                    .with_element(element.snippet())
                    .with_recommendation(&format!("Add the {} attribute", prop))
                    .with_wcag("4.1.2 Name, Role, Value")
                    .as_fixable(),
                );
            }
        }
    }

    findings
}

fn check_properties(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for element in doc.elements() {
        for (name, value) in element.attrs().filter(|(n, _)| n.starts_with("aria-")) {
            if BOOLEAN_PROPS.contains(&name) && value != "true" && value != "false" {
                findings.push(
                    issue(
                        "aria-properties",
                        Severity::Medium,
                        &format!("Invalid ARIA boolean value: {}='{}'", name, value),
                    )
                    .with_description(&format!("{} only accepts 'true' or 'false'", name))
                    .with_element(element.snippet())
                    .with_recommendation(&format!("Set {} to 'true' or 'false'", name))
                    .with_wcag("4.1.1 Parsing")
                    .as_fixable(),
                );
            }

            if value.trim().is_empty() {
                findings.push(
                    issue("aria-properties", Severity::Medium, &format!("Empty ARIA attribute: {}", name))
                        .with_description(&format!("{} needs a meaningful value", name))
                        .with_element(element.snippet())
                        .with_recommendation(&format!("Give {} an appropriate value", name))
                        .with_wcag("4.1.2 Name, Role, Value"),
                );
            }
        }
    }

    findings
}

fn check_landmarks(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    let main_count = doc
        .elements()
        .filter(|e| e.name() == "main" || e.attr("role") == Some("main"))
        .count();

    if main_count == 0 {
        findings.push(
            issue("landmark-roles", Severity::Medium, "Page has no main landmark")
                .with_description("No <main> element or role='main' was found")
                .with_recommendation("Wrap the primary content in <main> or add role='main'")
                .with_wcag("2.4.1 Bypass Blocks")
                .as_fixable(),
        );
    } else if main_count > 1 {
        findings.push(
            issue("landmark-roles", Severity::Medium, "Page has more than one main landmark")
                .with_description(&format!(
                    "Found {} main landmarks; a page should have exactly one",
                    main_count
                ))
                .with_recommendation("Keep a single <main> element")
                .with_wcag("2.4.1 Bypass Blocks"),
        );
    }

    let has_nav = doc
        .elements()
        .any(|e| e.name() == "nav" || e.attr("role") == Some("navigation"));
    if !has_nav {
        findings.push(
            issue("landmark-roles", Severity::Low, "Page has no navigation landmark")
                .with_description("No <nav> element or role='navigation' was found")
                .with_recommendation("Wrap navigation menus in <nav> or add role='navigation'")
                .with_wcag("2.4.1 Bypass Blocks"),
        );
    }

    findings
}

fn check_hidden_focusable(doc: &Document) -> Vec<Finding> {
    doc.elements()
        .filter(|e| e.attr("aria-hidden") == Some("true") && is_focusable(*e))
        .map(|e| {
            issue(
                "aria-hidden-focusable",
                Severity::High,
                "Focusable element has aria-hidden='true'",
            )
            .with_description("Elements that can receive focus must not be hidden from assistive technology")
            .with_element(e.snippet())
            .with_recommendation("Remove aria-hidden='true' or also set tabindex='-1'")
            .with_wcag("4.1.2 Name, Role, Value")
        })
        .collect()
}

fn check_live_regions(doc: &Document) -> Vec<Finding> {
    doc.with_attr("aria-live")
        .into_iter()
        .filter_map(|e| {
            let value = e.attr("aria-live").unwrap_or("");
            if LIVE_VALUES.contains(&value) {
                return None;
            }
            Some(
                issue(
                    "aria-live-regions",
                    Severity::Medium,
                    &format!("Invalid aria-live value: '{}'", value),
                )
                .with_description("aria-live only accepts 'off', 'polite' or 'assertive'")
                .with_element(e.snippet())
                .with_recommendation("Set aria-live to 'off', 'polite' or 'assertive'")
                .with_wcag("4.1.3 Status Messages")
                .as_fixable(),
            )
        })
        .collect()
}

fn check_describedby(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for element in doc.with_attr("aria-describedby") {
        let ids = element.attr("aria-describedby").unwrap_or("");
        for id in ids.split_whitespace() {
            if doc.by_id(id).is_none() {
                findings.push(
                    issue(
                        "aria-describedby",
                        Severity::Medium,
                        &format!("aria-describedby references a missing id: '{}'", id),
                    )
                    .with_description(&format!("No element with id '{}' exists in the page", id))
                    .with_element(element.snippet())
                    .with_recommendation(&format!(
                        "Add an element with id '{}' or correct the aria-describedby value",
                        id
                    ))
                    .with_wcag("4.1.2 Name, Role, Value"),
                );
            }
        }
    }

    findings
}

fn check_tabindex(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for element in doc.with_attr("tabindex") {
        let value = element.attr("tabindex").unwrap_or("");
        match value.trim().parse::<i64>() {
            Ok(n) if n > 0 => findings.push(
                issue("tabindex-usage", Severity::Medium, &format!("Positive tabindex: {}", value))
                    .with_description("Positive tabindex values make keyboard order hard to predict")
                    .with_element(element.snippet())
                    .with_recommendation("Use tabindex='0' or tabindex='-1'")
                    .with_wcag("2.4.3 Focus Order")
                    .as_fixable(),
            ),
            Ok(_) => {}
            Err(_) => findings.push(
                issue("tabindex-usage", Severity::Medium, &format!("Invalid tabindex value: '{}'", value))
                    .with_description("tabindex must be an integer")
                    .with_element(element.snippet())
                    .with_recommendation("Set tabindex to an integer value")
                    .with_wcag("4.1.1 Parsing")
                    .as_fixable(),
            ),
        }
    }

    findings
}

fn check_skip_link(doc: &Document) -> Vec<Finding> {
    let has_skip_link = doc.by_tag("a").iter().any(|a| {
        let href = a.attr("href").unwrap_or("");
        href.starts_with('#')
            && (a.text().to_lowercase().contains("skip") || href.to_lowercase().contains("main"))
    });

    if has_skip_link {
        return Vec::new();
    }

    vec![issue("skip-link", Severity::Low, "Page has no skip link")
        .with_description("A link at the start of the page should let keyboard users jump to the main content")
        .with_recommendation("Add a 'Skip to main content' link as the first focusable element")
        .with_wcag("2.4.1 Bypass Blocks")
        .as_fixable()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(check: fn(&Document) -> Vec<Finding>, html: &str) -> Vec<Finding> {
        check(&Document::parse(html).unwrap())
    }

    #[test]
    fn test_unlabelled_controls() {
        let findings = run(
            check_labels,
            r#"<input type="text"><select></select><textarea></textarea><button></button>"#,
        );
        assert_eq!(findings.len(), 4);
        assert!(findings.iter().all(|f| f.severity == Severity::High));
    }

    #[test]
    fn test_labelled_controls() {
        let findings = run(
            check_labels,
            r#"
            <label for="email">Email</label><input id="email" type="email">
            <input aria-label="Search">
            <span id="n">Name</span><input aria-labelledby="n">
            <button>Send</button>
            <input type="hidden"><input type="submit"><input type="button">
            "#,
        );
        assert!(findings.is_empty(), "{:?}", findings);
    }

    #[test]
    fn test_large_labelled_form() {
        let mut html = String::new();
        for i in 0..3000 {
            html.push_str(&format!(r#"<label for="f{i}">Field {i}</label><input id="f{i}">"#));
        }
        html.push_str(r#"<label for="other">Other</label><input id="orphan">"#);

        let findings = run(check_labels, &html);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].element.as_deref().unwrap_or("").contains("orphan"));
    }

    #[test]
    fn test_blank_aria_label_is_not_a_name() {
        let findings = run(check_labels, r#"<input aria-label="   ">"#);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_invalid_role() {
        let findings = run(check_roles, r#"<div role="fooinvalid">x</div>"#);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);
    }

    #[test]
    fn test_checkbox_role_requires_checked() {
        let findings = run(check_roles, r#"<div role="checkbox">x</div>"#);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
        assert!(findings[0].message.contains("aria-checked"));

        let ok = run(check_roles, r#"<div role="checkbox" aria-checked="false">x</div>"#);
        assert!(ok.is_empty());
    }

    #[test]
    fn test_slider_requires_three_values() {
        let findings = run(check_roles, r#"<div role="slider" aria-valuenow="3">x</div>"#);
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn test_boolean_properties() {
        let findings = run(check_properties, r#"<div aria-expanded="yes">x</div>"#);
        assert_eq!(findings.len(), 1);

        // Empty boolean is both an invalid boolean and an empty attribute
        let findings = run(check_properties, r#"<div aria-hidden="">x</div>"#);
        assert_eq!(findings.len(), 2);

        let findings = run(check_properties, r#"<div aria-label=" ">x</div>"#);
        assert_eq!(findings.len(), 1);

        assert!(run(check_properties, r#"<div aria-pressed="true">x</div>"#).is_empty());
    }

    #[test]
    fn test_missing_main_landmark() {
        let findings = run(check_landmarks, "<nav>menu</nav><div>content</div>");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);

        let findings = run(check_landmarks, "<nav>menu</nav><main>content</main>");
        assert!(findings.is_empty());

        let findings = run(check_landmarks, r#"<nav>menu</nav><div role="main">content</div>"#);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_multiple_main_counts_role() {
        let findings = run(
            check_landmarks,
            r#"<nav>menu</nav><main>a</main><div role="main">b</div>"#,
        );
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("more than one"));
    }

    #[test]
    fn test_missing_navigation() {
        let findings = run(check_landmarks, "<main>content</main>");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Low);
    }

    #[test]
    fn test_hidden_focusable() {
        let findings = run(
            check_hidden_focusable,
            r##"<a href="#" aria-hidden="true">x</a><div tabindex="0" aria-hidden="true">y</div>
               <div tabindex="-1" aria-hidden="true">z</div><span aria-hidden="true">w</span>"##,
        );
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn test_live_regions() {
        assert_eq!(run(check_live_regions, r#"<div aria-live="loud">x</div>"#).len(), 1);
        assert!(run(check_live_regions, r#"<div aria-live="polite">x</div>"#).is_empty());
    }

    #[test]
    fn test_describedby_tokens_flagged_individually() {
        let findings = run(
            check_describedby,
            r#"<input aria-describedby="hint gone1 gone2"><p id="hint">Help</p>"#,
        );
        assert_eq!(findings.len(), 2);
        assert!(findings[0].message.contains("gone1"));
        assert!(findings[1].message.contains("gone2"));
    }

    #[test]
    fn test_tabindex_usage() {
        let findings = run(
            check_tabindex,
            r#"<div tabindex="3">a</div><div tabindex="abc">b</div><div tabindex="0">c</div><div tabindex="-1">d</div>"#,
        );
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.severity == Severity::Medium));
    }

    #[test]
    fn test_skip_link() {
        assert_eq!(run(check_skip_link, "<a href='/about'>About</a>").len(), 1);
        assert!(run(check_skip_link, "<a href='#content'>Skip to content</a>").is_empty());
        assert!(run(check_skip_link, "<a href='#main'>Jump</a>").is_empty());
    }
}
