// SPDX-License-Identifier: PMPL-1.0-or-later
//! Semantic structure checker - WCAG 1.3.1 Info and Relationships
//!
//! Checks document skeleton, heading hierarchy, landmark elements, list
//! and table structure, form labelling, link purpose, page language and
//! page title.

use super::{contains_any, Rule, SeverityWeights};
use crate::document::{Document, Element};
use crate::model::{Category, Finding, Severity};

pub const WEIGHTS: SeverityWeights = SeverityWeights::new(15.0, 8.0, 4.0, 1.0);

pub const RULES: &[Rule] = &[
    Rule { id: "document-structure", check: check_document_structure },
    Rule { id: "heading-hierarchy", check: check_heading_hierarchy },
    Rule { id: "semantic-tags", check: check_semantic_tags },
    Rule { id: "list-structure", check: check_lists },
    Rule { id: "table-structure", check: check_tables },
    Rule { id: "form-structure", check: check_forms },
    Rule { id: "link-purpose", check: check_link_purpose },
    Rule { id: "language", check: check_language },
    Rule { id: "page-title", check: check_page_title },
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Elements expected once at page level
const SINGLE_USE_TAGS: &[&str] = &["main", "header", "footer"];

/// Class name fragments that suggest a div should be a semantic element
const SEMANTIC_CLASS_HINTS: &[&str] = &["header", "nav", "main", "section", "article", "aside", "footer"];

const UNLABELLED_INPUT_TYPES: &[&str] = &["hidden", "submit", "button", "reset"];

const VAGUE_LINK_TEXT: &[&str] = &[
    "click", "here", "more", "read more", "link", "view", "여기", "클릭", "더보기", "자세히",
    "바로가기", "링크", "확인", "보기",
];

const REQUIRED_MARKERS: &[&str] = &["*", "required", "필수"];

const MIN_TITLE_CHARS: usize = 10;

fn issue(rule_id: &str, severity: Severity, message: &str) -> Finding {
    Finding::new(rule_id, Category::Semantic, severity, message)
}

fn heading_level(element: Element<'_>) -> Option<u8> {
    let name = element.name();
    if HEADINGS.contains(&name) {
        name[1..].parse().ok()
    } else {
        None
    }
}

fn check_document_structure(doc: &Document) -> Vec<Finding> {
    let tags = doc.explicit_tags();
    [("html", tags.html), ("head", tags.head), ("body", tags.body)]
        .into_iter()
        .filter(|(_, present)| !present)
        .map(|(tag, _)| {
            issue(
                "document-structure",
                Severity::High,
                &format!("Document has no <{}> element", tag),
            )
            .with_description(&format!("The markup does not declare a <{}> element", tag))
            .with_recommendation(&format!("Add an explicit <{}> element", tag))
            .with_wcag("4.1.1 Parsing")
            .as_fixable()
        })
        .collect()
}

fn check_heading_hierarchy(doc: &Document) -> Vec<Finding> {
    let headings = doc.by_tags(HEADINGS);
    if headings.is_empty() {
        return vec![issue("heading-hierarchy", Severity::Medium, "Page has no headings")
            .with_description("No h1-h6 elements were found")
            .with_recommendation("Add headings that reflect the content structure")
            .with_wcag("2.4.6 Headings and Labels")];
    }

    let mut findings = Vec::new();
    let h1_count = headings.iter().filter(|h| h.name() == "h1").count();
    if h1_count == 0 {
        findings.push(
            issue("heading-hierarchy", Severity::Medium, "Page has no h1 heading")
                .with_description("No h1 element was found")
                .with_recommendation("Add an h1 describing the page")
                .with_wcag("2.4.6 Headings and Labels"),
        );
    } else if h1_count > 1 {
        findings.push(
            issue("heading-hierarchy", Severity::Low, "Page has more than one h1 heading")
                .with_description(&format!("Found {} h1 elements", h1_count))
                .with_recommendation("Use a single h1 per page")
                .with_wcag("2.4.6 Headings and Labels"),
        );
    }

    let mut previous = 0u8;
    for heading in headings {
        let Some(level) = heading_level(heading) else {
            continue;
        };

        if heading.stripped_text().is_empty() {
            findings.push(
                issue("heading-hierarchy", Severity::Medium, &format!("Empty heading: {}", heading.name()))
                    .with_description(&format!("The {} element has no text", heading.name()))
                    .with_element(heading.snippet())
                    .with_recommendation("Give the heading meaningful text")
                    .with_wcag("2.4.6 Headings and Labels"),
            );
        }

        if previous > 0 && level > previous + 1 {
            findings.push(
                issue(
                    "heading-hierarchy",
                    Severity::Low,
                    &format!("Heading level skipped: h{} followed by h{}", previous, level),
                )
                .with_description("Heading levels should increase one step at a time")
                .with_element(heading.snippet())
                .with_recommendation(&format!("Use h{} or adjust the previous heading level", previous + 1))
                .with_wcag("2.4.6 Headings and Labels"),
            );
        }
        previous = level;
    }

    findings
}

fn check_semantic_tags(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    if doc.find("main").is_none() {
        findings.push(
            issue("semantic-tags", Severity::Medium, "Page has no <main> element")
                .with_description("The primary content is not wrapped in <main>")
                .with_recommendation("Wrap the primary content in <main>")
                .with_wcag("2.4.1 Bypass Blocks")
                .as_fixable(),
        );
    }

    for tag in SINGLE_USE_TAGS {
        let top_level = doc
            .by_tag(tag)
            .into_iter()
            .filter(|e| !e.ancestors().any(|a| SINGLE_USE_TAGS.contains(&a.name())))
            .count();
        if top_level > 1 {
            findings.push(
                issue("semantic-tags", Severity::Low, &format!("Page has {} page-level <{}> elements", top_level, tag))
                    .with_description(&format!("<{}> should appear once at page level", tag))
                    .with_recommendation(&format!("Keep a single page-level <{}>", tag))
                    .with_wcag("4.1.1 Parsing"),
            );
        }
    }

    let replaceable = doc
        .by_tag("div")
        .iter()
        .filter(|div| {
            div.classes()
                .any(|class| contains_any(&class.to_lowercase(), SEMANTIC_CLASS_HINTS))
        })
        .count();
    if replaceable > 0 {
        findings.push(
            issue(
                "semantic-tags",
                Severity::Low,
                &format!("{} div elements could be semantic elements", replaceable),
            )
            .with_description("Some divs carry class names that describe a semantic role")
            .with_recommendation("Use header, nav, main, section, article, aside or footer instead")
            .with_wcag("4.1.2 Name, Role, Value"),
        );
    }

    findings
}

fn check_lists(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for list in doc.by_tags(&["ul", "ol"]) {
        if list.children().any(|c| c.name() != "li") {
            findings.push(
                issue(
                    "list-structure",
                    Severity::Medium,
                    &format!("<{}> has direct children other than <li>", list.name()),
                )
                .with_description(&format!("Only <li> may be a direct child of <{}>", list.name()))
                .with_element(list.snippet())
                .with_recommendation("Wrap list content in <li> elements")
                .with_wcag("4.1.1 Parsing"),
            );
        }

        if list.find("li").is_none() {
            findings.push(
                issue("list-structure", Severity::Low, &format!("Empty <{}> element", list.name()))
                    .with_description(&format!("<{}> contains no list items", list.name()))
                    .with_element(list.snippet())
                    .with_recommendation("Add list items or remove the list")
                    .with_wcag("4.1.1 Parsing"),
            );
        }
    }

    for dl in doc.by_tag("dl") {
        if dl.find("dt").is_none() || dl.find("dd").is_none() {
            findings.push(
                issue("list-structure", Severity::Medium, "<dl> is missing <dt> or <dd>")
                    .with_description("Definition lists need terms and descriptions")
                    .with_element(dl.snippet())
                    .with_recommendation("Pair <dt> and <dd> elements")
                    .with_wcag("4.1.1 Parsing"),
            );
        }
    }

    findings
}

/// Heuristic for tables used for layout rather than data
pub fn is_layout_table(table: Element<'_>) -> bool {
    let th = table.find_all("th").len();
    let td = table.find_all("td").len();
    if th == 0 || (td > 0 && (th as f64 / td as f64) < 0.1) {
        return true;
    }
    ["border", "cellpadding", "cellspacing"]
        .iter()
        .any(|attr| table.attr(attr) == Some("0"))
}

fn check_tables(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for table in doc.by_tag("table") {
        if table.find("caption").is_none() {
            findings.push(
                issue("table-structure", Severity::Medium, "Table has no caption")
                    .with_description("Tables need a <caption> describing their purpose")
                    .with_element(table.snippet())
                    .with_recommendation("Add a <caption> element")
                    .with_wcag("1.3.1 Info and Relationships")
                    .as_fixable(),
            );
        }

        let headers = table.find_all("th");
        if headers.is_empty() {
            findings.push(
                issue("table-structure", Severity::High, "Table has no header cells")
                    .with_description("No <th> elements were found in the table")
                    .with_element(table.snippet())
                    .with_recommendation("Mark header cells with <th>")
                    .with_wcag("1.3.1 Info and Relationships"),
            );
        }
        for th in headers {
            if th.non_empty_attr("scope").is_none() {
                findings.push(
                    issue("table-structure", Severity::Medium, "Header cell has no scope")
                        .with_description("<th> without a scope attribute")
                        .with_element(th.snippet())
                        .with_recommendation("Add scope='col' or scope='row'")
                        .with_wcag("1.3.1 Info and Relationships")
                        .as_fixable(),
                );
            }
        }

        if is_layout_table(table) {
            findings.push(
                issue("table-structure", Severity::Low, "Table appears to be used for layout")
                    .with_description("The table has few or no header cells, or layout attributes set to 0")
                    .with_element(table.snippet())
                    .with_recommendation("Use CSS for layout and reserve tables for tabular data")
                    .with_wcag("1.3.1 Info and Relationships"),
            );
        }
    }

    findings
}

fn input_has_label(doc: &Document, input: Element<'_>) -> bool {
    if let Some(id) = input.non_empty_attr("id") {
        if doc.label_for(id).is_some() {
            return true;
        }
    }
    input.ancestors().any(|a| a.name() == "label")
        || input.non_empty_attr("aria-label").is_some()
        || input.non_empty_attr("aria-labelledby").is_some()
}

fn check_forms(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for form in doc.by_tag("form") {
        let fields = form
            .descendants()
            .filter(|e| matches!(e.name(), "input" | "select" | "textarea"))
            .count();
        if fields > 3 && form.find("fieldset").is_none() {
            findings.push(
                issue("form-structure", Severity::Low, "Complex form has no fieldset")
                    .with_description(&format!("The form has {} fields but no grouping", fields))
                    .with_element(form.snippet())
                    .with_recommendation("Group related fields with <fieldset> and <legend>")
                    .with_wcag("1.3.1 Info and Relationships"),
            );
        }
    }

    for input in doc.by_tag("input") {
        let input_type = input.attr("type").unwrap_or("text").to_lowercase();
        if UNLABELLED_INPUT_TYPES.contains(&input_type.as_str()) {
            continue;
        }

        if !input_has_label(doc, input) {
            findings.push(
                issue("form-structure", Severity::High, "Input has no associated label")
                    .with_description(&format!("The type='{}' input has no label", input_type))
                    .with_element(input.snippet())
                    .with_recommendation("Associate a <label> with the input or add aria-label")
                    .with_wcag("1.3.1 Info and Relationships")
                    .as_fixable(),
            );
        }

        if input.has_attr("required") {
            let context = input.parent().map(|p| p.text().to_lowercase()).unwrap_or_default();
            let indicated = contains_any(&context, REQUIRED_MARKERS)
                || input.attr("aria-required") == Some("true");
            if !indicated {
                findings.push(
                    issue("form-structure", Severity::Medium, "Required field is not clearly indicated")
                        .with_description("The field is required but has no visible or ARIA indicator")
                        .with_element(input.snippet())
                        .with_recommendation("Add a visible marker (*) and aria-required='true'")
                        .with_wcag("3.3.2 Labels or Instructions")
                        .as_fixable(),
                );
            }
        }
    }

    findings
}

fn check_link_purpose(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for link in doc.by_tag("a").into_iter().filter(|a| a.has_attr("href")) {
        let text = link.stripped_text();

        if text.is_empty() {
            let image_named = link
                .find("img")
                .and_then(|img| img.attr("alt"))
                .map_or(false, |alt| !alt.is_empty());
            if !image_named {
                findings.push(
                    issue("link-purpose", Severity::High, "Link has no text")
                        .with_description("The link has no text content")
                        .with_element(link.snippet())
                        .with_recommendation("Add text that describes the link destination")
                        .with_wcag("2.4.4 Link Purpose"),
                );
            }
            continue;
        }

        if VAGUE_LINK_TEXT.contains(&text.to_lowercase().as_str()) {
            findings.push(
                issue("link-purpose", Severity::Medium, &format!("Vague link text: '{}'", text))
                    .with_description("The link text does not describe its purpose")
                    .with_element(link.snippet())
                    .with_recommendation("Use link text that describes the destination")
                    .with_wcag("2.4.4 Link Purpose"),
            );
        }
    }

    findings
}

fn check_language(doc: &Document) -> Vec<Finding> {
    let Some(html) = doc.root_element() else {
        return Vec::new();
    };

    match html.attr("lang") {
        None | Some("") => vec![issue("language", Severity::Medium, "<html> has no lang attribute")
            .with_description("The primary language of the page is not declared")
            .with_recommendation("Add a lang attribute to <html>, e.g. lang='en'")
            .with_wcag("3.1.1 Language of Page")
            .as_fixable()],
        Some(lang) if lang.chars().count() < 2 => {
            vec![issue("language", Severity::Medium, &format!("Invalid lang value: '{}'", lang))
                .with_description("The lang value is not a valid language code")
                .with_recommendation("Use a valid language code such as 'en' or 'ko-KR'")
                .with_wcag("3.1.1 Language of Page")
                .as_fixable()]
        }
        Some(_) => Vec::new(),
    }
}

fn check_page_title(doc: &Document) -> Vec<Finding> {
    let Some(title) = doc.find("title") else {
        return vec![issue("page-title", Severity::High, "Document has no <title>")
            .with_description("No <title> element was found")
            .with_recommendation("Add a <title> inside <head>")
            .with_wcag("2.4.2 Page Titled")
            .as_fixable()];
    };

    let text = title.stripped_text();
    let chars = text.chars().count();
    if chars == 0 {
        vec![issue("page-title", Severity::High, "Empty <title> element")
            .with_description("The <title> element has no text")
            .with_recommendation("Give the page a descriptive title")
            .with_wcag("2.4.2 Page Titled")]
    } else if chars < MIN_TITLE_CHARS {
        vec![issue("page-title", Severity::Low, "Page title is too short")
            .with_description(&format!("The title is only {} characters long", chars))
            .with_recommendation("Use a title that describes the page content and purpose")
            .with_wcag("2.4.2 Page Titled")]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(check: fn(&Document) -> Vec<Finding>, html: &str) -> Vec<Finding> {
        check(&Document::parse(html).unwrap())
    }

    #[test]
    fn test_document_structure() {
        assert_eq!(run(check_document_structure, "<p>fragment</p>").len(), 3);
        assert!(run(
            check_document_structure,
            "<html><head><title>t</title></head><body></body></html>"
        )
        .is_empty());
    }

    #[test]
    fn test_no_headings_stops_early() {
        let findings = run(check_heading_hierarchy, "<p>text</p>");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);
    }

    #[test]
    fn test_heading_rules() {
        let findings = run(
            check_heading_hierarchy,
            "<h1>Title</h1><h3>Skipped</h3><h1>Again</h1><h2></h2>",
        );
        // multiple h1 (low), h1 -> h3 jump (low), empty h2 (medium)
        assert_eq!(findings.len(), 3);
        assert_eq!(findings.iter().filter(|f| f.severity == Severity::Low).count(), 2);
        assert_eq!(findings.iter().filter(|f| f.severity == Severity::Medium).count(), 1);
    }

    #[test]
    fn test_missing_h1() {
        let findings = run(check_heading_hierarchy, "<h2>Section</h2><h3>Sub</h3>");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("h1"));
    }

    #[test]
    fn test_semantic_tags() {
        let findings = run(
            check_semantic_tags,
            r#"<header>a</header><header>b</header><div class="site-nav">n</div>"#,
        );
        assert_eq!(findings.len(), 3);

        // A header nested inside a footer is not page level
        let findings = run(
            check_semantic_tags,
            "<main>m</main><header>a</header><footer><header>b</header></footer>",
        );
        assert!(findings.is_empty(), "{:?}", findings);
    }

    #[test]
    fn test_lists() {
        let findings = run(check_lists, "<ul><div>bad</div></ul><ol></ol><dl><dt>term</dt></dl>");
        // ul: non-li child + no li; ol: no li; dl: no dd
        assert_eq!(findings.len(), 4);
        assert!(run(check_lists, "<ul><li>a</li></ul><dl><dt>t</dt><dd>d</dd></dl>").is_empty());
    }

    #[test]
    fn test_table_without_headers() {
        let findings = run(check_tables, "<table><tr><td>1</td></tr></table>");
        let severities: Vec<_> = findings.iter().map(|f| f.severity).collect();
        assert_eq!(severities, vec![Severity::Medium, Severity::High, Severity::Low]);
    }

    #[test]
    fn test_data_table() {
        let findings = run(
            check_tables,
            r#"<table><caption>Prices</caption><tr><th scope="col">Item</th><th>Cost</th></tr>
               <tr><td>Tea</td><td>2</td></tr></table>"#,
        );
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("scope"));
    }

    #[test]
    fn test_layout_attribute_zero() {
        let doc = Document::parse(
            r#"<table border="0"><tr><th scope="col">a</th></tr><tr><td>b</td></tr></table>"#,
        )
        .unwrap();
        assert!(is_layout_table(doc.find("table").unwrap()));
    }

    #[test]
    fn test_form_labels() {
        let findings = run(
            check_forms,
            r#"<form>
                 <label for="a">A</label><input id="a">
                 <label>B <input></label>
                 <input aria-label="C">
                 <input type="text">
                 <input type="submit">
               </form>"#,
        );
        // four fields, no fieldset (low); one unlabelled input (high)
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].severity, Severity::Low);
        assert_eq!(findings[1].severity, Severity::High);
    }

    #[test]
    fn test_large_labelled_input_list() {
        let mut html = String::new();
        for i in 0..3000 {
            html.push_str(&format!(r#"<label for="q{i}">Question {i}</label><input id="q{i}">"#));
        }
        html.push_str(r#"<input id="unlabelled">"#);

        let findings = run(check_forms, &html);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
    }

    #[test]
    fn test_required_indicator() {
        let findings = run(check_forms, r#"<div><input aria-label="Name" required></div>"#);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);

        let marked = run(check_forms, r#"<div>Name *<input aria-label="Name" required></div>"#);
        assert!(marked.is_empty());
    }

    #[test]
    fn test_link_purpose() {
        let findings = run(
            check_link_purpose,
            r#"<a href="/a"></a><a href="/b">Click</a><a href="/c"><img src="x.png" alt="Home"></a>
               <a href="/d">Annual report 2024</a><a>no href</a>"#,
        );
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].severity, Severity::High);
        assert_eq!(findings[1].severity, Severity::Medium);
    }

    #[test]
    fn test_language() {
        assert_eq!(run(check_language, "<html><body>x</body></html>").len(), 1);
        assert_eq!(run(check_language, r#"<html lang="e"><body>x</body></html>"#).len(), 1);
        assert!(run(check_language, r#"<html lang="en"><body>x</body></html>"#).is_empty());
    }

    #[test]
    fn test_page_title() {
        assert_eq!(run(check_page_title, "<p>x</p>")[0].severity, Severity::High);
        assert_eq!(run(check_page_title, "<title>  </title>")[0].severity, Severity::High);
        assert_eq!(run(check_page_title, "<title>Home</title>")[0].severity, Severity::Low);
        assert!(run(check_page_title, "<title>Quarterly results</title>").is_empty());
    }
}
