// SPDX-License-Identifier: PMPL-1.0-or-later
//! Immutable parsed-HTML document.
//!
//! The html5ever tree produced by `scraper` is copied once into a flat arena
//! of owned nodes in document order. The arena is `Send + Sync`, so one parse
//! can be shared by every category checker through an `Arc`.

use crate::error::{AuditError, Result};
use regex::Regex;
use scraper::{Html, Node as HtmlNode};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Largest document accepted for analysis
pub const MAX_DOCUMENT_BYTES: usize = 32 * 1024 * 1024;

/// Maximum length of an element snippet, in characters
pub const SNIPPET_CHARS: usize = 200;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

type NodeId = usize;

#[derive(Debug)]
enum NodeData {
    Document,
    Element {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    Other,
}

#[derive(Debug)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Last node of this node's subtree (itself when it has no children)
    subtree_end: NodeId,
}

/// Structural tags html5ever would otherwise synthesize silently
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExplicitTags {
    pub html: bool,
    pub head: bool,
    pub body: bool,
}

/// Parsed, read-only HTML document
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    ids: HashMap<String, NodeId>,
    /// `<label for>` targets
    label_targets: HashMap<String, NodeId>,
    explicit: ExplicitTags,
}

impl Document {
    /// Parse an HTML snapshot.
    ///
    /// Fails only on empty input or input above [`MAX_DOCUMENT_BYTES`];
    /// malformed markup is recovered by the HTML5 parser.
    pub fn parse(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Err(AuditError::EmptyDocument);
        }
        if source.len() > MAX_DOCUMENT_BYTES {
            return Err(AuditError::DocumentTooLarge {
                size: source.len(),
                limit: MAX_DOCUMENT_BYTES,
            });
        }

        let html = Html::parse_document(source);
        let mut nodes: Vec<Node> = Vec::new();
        let mut ids = HashMap::new();
        let mut label_targets = HashMap::new();

        let mut stack = vec![(html.tree.root(), None)];
        while let Some((node_ref, parent)) = stack.pop() {
            let id = nodes.len();
            let data = match node_ref.value() {
                HtmlNode::Document | HtmlNode::Fragment => NodeData::Document,
                HtmlNode::Element(e) => {
                    if let Some(value) = e.attr("id") {
                        ids.entry(value.to_string()).or_insert(id);
                    }
                    if e.name() == "label" {
                        if let Some(target) = e.attr("for") {
                            label_targets.entry(target.to_string()).or_insert(id);
                        }
                    }
                    NodeData::Element {
                        name: e.name().to_string(),
                        attrs: e
                            .attrs()
                            .map(|(k, v)| (k.to_string(), v.to_string()))
                            .collect(),
                    }
                }
                HtmlNode::Text(t) => NodeData::Text(String::from(&**t)),
                _ => NodeData::Other,
            };

            nodes.push(Node {
                data,
                parent,
                children: Vec::new(),
                subtree_end: id,
            });
            if let Some(p) = parent {
                nodes[p].children.push(id);
            }

            // Reversed so the next pop is the first child: ids follow document order
            for child in node_ref.children().rev() {
                stack.push((child, Some(id)));
            }
        }

        for id in (0..nodes.len()).rev() {
            if let Some(&last) = nodes[id].children.last() {
                nodes[id].subtree_end = nodes[last].subtree_end;
            }
        }

        Ok(Self {
            nodes,
            ids,
            label_targets,
            explicit: explicit_tags(source),
        })
    }

    /// Which of `<html>`, `<head>`, `<body>` appear literally in the source
    pub fn explicit_tags(&self) -> ExplicitTags {
        self.explicit
    }

    /// All elements in document order
    pub fn elements(&self) -> impl Iterator<Item = Element<'_>> + '_ {
        (0..self.nodes.len()).filter_map(move |id| self.element(id))
    }

    /// Elements with the given tag name
    pub fn by_tag(&self, name: &str) -> Vec<Element<'_>> {
        self.elements().filter(|e| e.name() == name).collect()
    }

    /// Elements whose tag name is any of `names`, in document order
    pub fn by_tags(&self, names: &[&str]) -> Vec<Element<'_>> {
        self.elements().filter(|e| names.contains(&e.name())).collect()
    }

    /// Elements carrying the attribute
    pub fn with_attr(&self, attr: &str) -> Vec<Element<'_>> {
        self.elements().filter(|e| e.has_attr(attr)).collect()
    }

    /// First element whose `id` equals `id`
    pub fn by_id(&self, id: &str) -> Option<Element<'_>> {
        self.ids.get(id).and_then(|&node| self.element(node))
    }

    /// First `<label>` whose `for` attribute names `id`
    pub fn label_for(&self, id: &str) -> Option<Element<'_>> {
        self.label_targets.get(id).and_then(|&node| self.element(node))
    }

    /// The `<html>` element
    pub fn root_element(&self) -> Option<Element<'_>> {
        self.elements().find(|e| e.name() == "html")
    }

    /// First element with the given tag name
    pub fn find(&self, name: &str) -> Option<Element<'_>> {
        self.elements().find(|e| e.name() == name)
    }

    fn element(&self, id: NodeId) -> Option<Element<'_>> {
        match self.nodes.get(id)?.data {
            NodeData::Element { .. } => Some(Element { doc: self, id }),
            _ => None,
        }
    }
}

static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<html[\s>]").expect("valid regex"));
static HEAD_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<head[\s>]").expect("valid regex"));
static BODY_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<body[\s>]").expect("valid regex"));

fn explicit_tags(source: &str) -> ExplicitTags {
    ExplicitTags {
        html: HTML_TAG_RE.is_match(source),
        head: HEAD_TAG_RE.is_match(source),
        body: BODY_TAG_RE.is_match(source),
    }
}

/// Borrowed handle to one element of a [`Document`]
#[derive(Clone, Copy)]
pub struct Element<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl std::fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("name", &self.name())
            .field("id", &self.id)
            .finish()
    }
}

impl PartialEq for Element<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for Element<'_> {}

impl<'a> Element<'a> {
    fn node(&self) -> &'a Node {
        &self.doc.nodes[self.id]
    }

    /// Lowercase tag name
    pub fn name(&self) -> &'a str {
        match &self.node().data {
            NodeData::Element { name, .. } => name,
            _ => "",
        }
    }

    /// Attribute value
    pub fn attr(&self, attr: &str) -> Option<&'a str> {
        self.attrs().find(|(k, _)| *k == attr).map(|(_, v)| v)
    }

    pub fn has_attr(&self, attr: &str) -> bool {
        self.attr(attr).is_some()
    }

    /// Attribute value, if present and not blank
    pub fn non_empty_attr(&self, attr: &str) -> Option<&'a str> {
        self.attr(attr).filter(|v| !v.trim().is_empty())
    }

    /// Attributes in source order
    pub fn attrs(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let attrs: &'a [(String, String)] = match &self.node().data {
            NodeData::Element { attrs, .. } => attrs,
            _ => &[],
        };
        attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whitespace-separated class names
    pub fn classes(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    /// Lowercased `class` attribute, for keyword matching
    pub fn class_string(&self) -> String {
        self.attr("class").unwrap_or("").to_lowercase()
    }

    /// All descendant text, concatenated as-is
    pub fn text(&self) -> String {
        self.text_nodes().collect()
    }

    /// Descendant text with each text node trimmed and empty nodes dropped
    pub fn stripped_text(&self) -> String {
        self.text_nodes()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn text_nodes(&self) -> impl Iterator<Item = &'a str> + 'a {
        let doc = self.doc;
        (self.id + 1..=self.node().subtree_end).filter_map(move |id| match &doc.nodes[id].data {
            NodeData::Text(t) => Some(t.as_str()),
            _ => None,
        })
    }

    /// Parent element
    pub fn parent(&self) -> Option<Element<'a>> {
        self.node().parent.and_then(|p| self.doc.element(p))
    }

    /// Ancestor elements, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        std::iter::successors(self.parent(), |e| e.parent())
    }

    /// Element children in order
    pub fn children(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        let doc = self.doc;
        self.node().children.iter().filter_map(move |&c| doc.element(c))
    }

    /// Following element siblings in order
    pub fn next_siblings(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        let doc = self.doc;
        let id = self.id;
        let siblings: &'a [NodeId] = match self.node().parent {
            Some(p) => &doc.nodes[p].children,
            None => &[],
        };
        siblings
            .iter()
            .skip_while(move |&&s| s != id)
            .skip(1)
            .filter_map(move |&s| doc.element(s))
    }

    /// Descendant elements in document order
    pub fn descendants(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        let doc = self.doc;
        (self.id + 1..=self.node().subtree_end).filter_map(move |id| doc.element(id))
    }

    /// First descendant element with the tag name
    pub fn find(&self, name: &str) -> Option<Element<'a>> {
        self.descendants().find(|e| e.name() == name)
    }

    /// Descendant elements with the tag name
    pub fn find_all(&self, name: &str) -> Vec<Element<'a>> {
        self.descendants().filter(|e| e.name() == name).collect()
    }

    /// Outer HTML cut to [`SNIPPET_CHARS`] characters
    pub fn snippet(&self) -> String {
        let mut out = String::new();
        self.doc.serialize(self.id, &mut out, SNIPPET_CHARS * 4);
        match out.char_indices().nth(SNIPPET_CHARS) {
            Some((idx, _)) => out[..idx].to_string(),
            None => out,
        }
    }
}

impl Document {
    /// Serialize a subtree, stopping once `budget` bytes have been written
    fn serialize(&self, id: NodeId, out: &mut String, budget: usize) {
        if out.len() >= budget {
            return;
        }
        match &self.nodes[id].data {
            NodeData::Element { name, attrs } => {
                out.push('<');
                out.push_str(name);
                for (k, v) in attrs {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(&v.replace('&', "&amp;").replace('"', "&quot;"));
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&name.as_str()) {
                    return;
                }
                for &child in &self.nodes[id].children {
                    self.serialize(child, out, budget);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            NodeData::Text(t) => {
                out.push_str(&t.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;"))
            }
            NodeData::Document | NodeData::Other => {
                for &child in &self.nodes[id].children {
                    self.serialize(child, out, budget);
                }
            }
        }
    }
}
