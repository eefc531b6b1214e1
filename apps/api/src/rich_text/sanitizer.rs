//! Allow-list HTML sanitizer.
//!
//! Input is parsed as a body fragment and a fresh tree is rebuilt bottom-up:
//! allowed elements are copied without attributes (except a safe `href` on
//! anchors), everything else is unwrapped so its text survives. Empty list
//! items and the lists they leave behind are pruned afterwards.

use scraper::{ElementRef, Html, Node};
use thiserror::Error;
use tracing::warn;
use url::Url;

use super::{escape_text, write_link_open};

/// Fragments larger than this are refused outright.
const MAX_INPUT_BYTES: usize = 512 * 1024;

/// Upper bound on re-parse passes while waiting for the output to settle.
const MAX_PASSES: usize = 4;

/// Relative hrefs resolve against this base, so they count as `https`.
const SAFE_BASE: &str = "https://folio.invalid/";

/// Zero-width characters that do not count as visible list-item text.
const ZERO_WIDTH: &[char] = &['\u{200b}', '\u{200c}', '\u{200d}', '\u{feff}'];

#[derive(Debug, Error)]
pub enum SanitizeError {
    #[error("input of {len} bytes exceeds the {max} byte limit")]
    TooLarge { len: usize, max: usize },

    #[error("output did not stabilise after {0} passes")]
    Unstable(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Bold,
    Strong,
    Italic,
    Emphasis,
    Underline,
    Anchor,
    UnorderedList,
    OrderedList,
    ListItem,
    Paragraph,
    LineBreak,
    Block,
    Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributePolicy {
    /// Every attribute is stripped.
    None,
    /// Only an `href` with an http(s) scheme survives.
    SafeHref,
}

/// Element kind -> tag name and attribute policy. Anything absent is unwrapped.
const ELEMENT_POLICIES: &[(&str, ElementKind, AttributePolicy)] = &[
    ("b", ElementKind::Bold, AttributePolicy::None),
    ("strong", ElementKind::Strong, AttributePolicy::None),
    ("i", ElementKind::Italic, AttributePolicy::None),
    ("em", ElementKind::Emphasis, AttributePolicy::None),
    ("u", ElementKind::Underline, AttributePolicy::None),
    ("a", ElementKind::Anchor, AttributePolicy::SafeHref),
    ("ul", ElementKind::UnorderedList, AttributePolicy::None),
    ("ol", ElementKind::OrderedList, AttributePolicy::None),
    ("li", ElementKind::ListItem, AttributePolicy::None),
    ("p", ElementKind::Paragraph, AttributePolicy::None),
    ("br", ElementKind::LineBreak, AttributePolicy::None),
    ("div", ElementKind::Block, AttributePolicy::None),
    ("span", ElementKind::Span, AttributePolicy::None),
];

/// Containers whose content is never renderable text; dropped with their children.
const DROP_WITH_CONTENT: &[&str] = &["script", "style", "template", "noscript", "iframe"];

impl ElementKind {
    fn lookup(tag: &str) -> Option<(ElementKind, AttributePolicy)> {
        ELEMENT_POLICIES
            .iter()
            .find(|(name, _, _)| name.eq_ignore_ascii_case(tag))
            .map(|&(_, kind, policy)| (kind, policy))
    }

    pub fn tag(self) -> &'static str {
        ELEMENT_POLICIES
            .iter()
            .find(|(_, kind, _)| *kind == self)
            .map(|(name, _, _)| *name)
            .unwrap_or("span")
    }

    fn is_list(self) -> bool {
        matches!(self, ElementKind::UnorderedList | ElementKind::OrderedList)
    }

    fn is_void(self) -> bool {
        self == ElementKind::LineBreak
    }

    fn breaks_line(self) -> bool {
        matches!(
            self,
            ElementKind::Paragraph
                | ElementKind::Block
                | ElementKind::ListItem
                | ElementKind::LineBreak
        )
    }
}

/// A node of the rebuilt, already-safe tree.
#[derive(Debug, Clone, PartialEq)]
enum SafeNode {
    Text(String),
    Element {
        kind: ElementKind,
        href: Option<String>,
        children: Vec<SafeNode>,
    },
}

impl SafeNode {
    fn collect_text(&self, out: &mut String) {
        match self {
            SafeNode::Text(text) => out.push_str(text),
            SafeNode::Element { children, .. } => {
                children.iter().for_each(|c| c.collect_text(out));
            }
        }
    }

    fn contains_list_item(&self) -> bool {
        match self {
            SafeNode::Text(_) => false,
            SafeNode::Element { kind, children, .. } => {
                *kind == ElementKind::ListItem || children.iter().any(SafeNode::contains_list_item)
            }
        }
    }

    fn is_list_item(&self) -> bool {
        matches!(
            self,
            SafeNode::Element {
                kind: ElementKind::ListItem,
                ..
            }
        )
    }
}

fn has_visible_text(nodes: &[SafeNode]) -> bool {
    let mut text = String::new();
    nodes.iter().for_each(|n| n.collect_text(&mut text));
    !text.replace(ZERO_WIDTH, "").trim().is_empty()
}

/// Sanitizes with the default policy. Never fails: errors yield an empty string.
pub fn sanitize(html: &str) -> String {
    HtmlSanitizer::new().clean(html)
}

/// Visible text of a fragment after sanitization, one line per block.
pub fn to_plain_text(html: &str) -> String {
    let sanitizer = HtmlSanitizer::new();
    let nodes = sanitizer.rebuild(&sanitizer.clean(html));
    let mut out = String::new();
    write_plain(&nodes, &mut out);
    out.lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_plain(nodes: &[SafeNode], out: &mut String) {
    for node in nodes {
        match node {
            SafeNode::Text(text) => out.push_str(text),
            SafeNode::Element { kind, children, .. } => {
                write_plain(children, out);
                if kind.breaks_line() {
                    out.push('\n');
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HtmlSanitizer {
    keep_trailing_empty_item: bool,
}

impl HtmlSanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the last list item of each list even when it is empty, so a
    /// caret can still sit in a freshly inserted bullet.
    pub fn keep_trailing_empty_item(mut self, keep: bool) -> Self {
        self.keep_trailing_empty_item = keep;
        self
    }

    pub fn clean(&self, html: &str) -> String {
        match self.try_clean(html) {
            Ok(clean) => clean,
            Err(e) => {
                warn!("Sanitization failed, discarding fragment: {e}");
                String::new()
            }
        }
    }

    pub fn try_clean(&self, html: &str) -> Result<String, SanitizeError> {
        if html.len() > MAX_INPUT_BYTES {
            return Err(SanitizeError::TooLarge {
                len: html.len(),
                max: MAX_INPUT_BYTES,
            });
        }
        if html.is_empty() {
            return Ok(String::new());
        }

        // A single pass can emit markup the parser would restructure (an
        // unwrapped container leaving a block inside a paragraph). Re-run
        // until the serialization is a fixed point.
        let mut current = self.single_pass(html);
        for _ in 0..MAX_PASSES {
            let next = self.single_pass(&current);
            if next == current {
                return Ok(current);
            }
            current = next;
        }
        Err(SanitizeError::Unstable(MAX_PASSES))
    }

    fn single_pass(&self, html: &str) -> String {
        let nodes = self.rebuild(html);
        let mut out = String::with_capacity(html.len());
        write_nodes(&nodes, &mut out);
        out
    }

    fn rebuild(&self, html: &str) -> Vec<SafeNode> {
        let fragment = Html::parse_fragment(html);
        let mut nodes = Vec::new();
        rebuild_children(fragment.root_element(), &mut nodes);
        self.prune(nodes, false)
    }

    fn prune(&self, nodes: Vec<SafeNode>, in_list: bool) -> Vec<SafeNode> {
        let kept_item = if in_list && self.keep_trailing_empty_item {
            nodes.iter().rposition(SafeNode::is_list_item)
        } else {
            None
        };

        nodes
            .into_iter()
            .enumerate()
            .filter_map(|(idx, node)| match node {
                SafeNode::Text(_) => Some(node),
                SafeNode::Element {
                    kind,
                    href,
                    children,
                } => {
                    let children = self.prune(children, kind.is_list());
                    if kind == ElementKind::ListItem
                        && Some(idx) != kept_item
                        && !has_visible_text(&children)
                    {
                        return None;
                    }
                    if kind.is_list() && !children.iter().any(SafeNode::contains_list_item) {
                        return None;
                    }
                    Some(SafeNode::Element {
                        kind,
                        href,
                        children,
                    })
                }
            })
            .collect()
    }
}

fn rebuild_children(parent: ElementRef<'_>, out: &mut Vec<SafeNode>) {
    for child in parent.children() {
        match child.value() {
            Node::Text(text) => push_text(out, text),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child) {
                    rebuild_element(element, out);
                }
            }
            // comments, doctypes and processing instructions
            _ => {}
        }
    }
}

fn rebuild_element(element: ElementRef<'_>, out: &mut Vec<SafeNode>) {
    let tag = element.value().name();
    if DROP_WITH_CONTENT.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
        return;
    }

    let Some((kind, policy)) = ElementKind::lookup(tag) else {
        // unwrap: children take the element's place
        rebuild_children(element, out);
        return;
    };

    let href = match policy {
        AttributePolicy::SafeHref => element.value().attr("href").and_then(safe_href),
        AttributePolicy::None => None,
    };

    let mut children = Vec::new();
    if !kind.is_void() {
        rebuild_children(element, &mut children);
    }
    out.push(SafeNode::Element {
        kind,
        href,
        children,
    });
}

fn push_text(out: &mut Vec<SafeNode>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(SafeNode::Text(prev)) = out.last_mut() {
        prev.push_str(text);
    } else {
        out.push(SafeNode::Text(text.to_string()));
    }
}

/// Keeps `href` only when it resolves to an http(s) URL.
fn safe_href(raw: &str) -> Option<String> {
    let base = Url::parse(SAFE_BASE).ok()?;
    let resolved = base.join(raw).ok()?;
    matches!(resolved.scheme(), "http" | "https").then(|| raw.to_string())
}

fn write_nodes(nodes: &[SafeNode], out: &mut String) {
    for node in nodes {
        match node {
            SafeNode::Text(text) => escape_text(text, out),
            SafeNode::Element {
                kind,
                href,
                children,
            } => {
                let tag = kind.tag();
                match href {
                    Some(href) => write_link_open(href, out),
                    None => {
                        out.push('<');
                        out.push_str(tag);
                        out.push('>');
                    }
                }
                if kind.is_void() {
                    continue;
                }
                write_nodes(children, out);
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_is_dropped_entirely() {
        assert_eq!(sanitize("<script>alert(1)</script>"), "");
    }

    #[test]
    fn test_disallowed_element_is_unwrapped() {
        assert_eq!(sanitize("<div><marquee>hi</marquee></div>"), "<div>hi</div>");
    }

    #[test]
    fn test_javascript_href_dropped() {
        assert_eq!(sanitize(r#"<a href="javascript:alert(1)">x</a>"#), "<a>x</a>");
    }

    #[test]
    fn test_obfuscated_javascript_href_dropped() {
        assert_eq!(
            sanitize("<a href=\"  JaVaScRiPt:alert(1)\">x</a>"),
            "<a>x</a>"
        );
    }

    #[test]
    fn test_https_href_kept_with_markers() {
        assert_eq!(
            sanitize(r#"<a href="https://example.com">x</a>"#),
            r#"<a href="https://example.com" target="_blank" rel="noopener noreferrer">x</a>"#
        );
    }

    #[test]
    fn test_input_markers_are_overwritten() {
        assert_eq!(
            sanitize(r#"<a href="https://example.com" target="_self" rel="opener" onclick="steal()">x</a>"#),
            r#"<a href="https://example.com" target="_blank" rel="noopener noreferrer">x</a>"#
        );
    }

    #[test]
    fn test_relative_href_resolves_to_https() {
        assert_eq!(
            sanitize(r#"<a href="/about">about</a>"#),
            r#"<a href="/about" target="_blank" rel="noopener noreferrer">about</a>"#
        );
    }

    #[test]
    fn test_non_http_schemes_dropped() {
        assert_eq!(sanitize(r#"<a href="mailto:a@b.test">mail</a>"#), "<a>mail</a>");
        assert_eq!(
            sanitize(r#"<a href="data:text/html,<b>x</b>">d</a>"#),
            "<a>d</a>"
        );
    }

    #[test]
    fn test_attributes_stripped_from_allowed_elements() {
        assert_eq!(
            sanitize(r#"<p class="lead" style="color:red" onclick="x()">hi</p>"#),
            "<p>hi</p>"
        );
    }

    #[test]
    fn test_href_on_non_anchor_is_stripped() {
        assert_eq!(sanitize(r#"<span href="https://a.test">s</span>"#), "<span>s</span>");
    }

    #[test]
    fn test_comments_removed() {
        assert_eq!(sanitize("<!-- note --><b>x</b>"), "<b>x</b>");
    }

    #[test]
    fn test_childless_disallowed_element_vanishes() {
        assert_eq!(sanitize(r#"a<img src="x" onerror="alert(1)">b"#), "ab");
    }

    #[test]
    fn test_table_unwrapped_to_text() {
        assert_eq!(sanitize("<table><tr><td>cell</td></tr></table>"), "cell");
    }

    #[test]
    fn test_style_content_dropped() {
        assert_eq!(sanitize("<style>p { color: red }</style><p>x</p>"), "<p>x</p>");
    }

    #[test]
    fn test_empty_list_items_pruned() {
        assert_eq!(sanitize("<ul><li>a</li><li>  </li><li><br></li></ul>"), "<ul><li>a</li></ul>");
    }

    #[test]
    fn test_zero_width_only_item_pruned() {
        assert_eq!(sanitize("<ul><li>a</li><li>\u{200b}</li></ul>"), "<ul><li>a</li></ul>");
    }

    #[test]
    fn test_emptied_list_removed() {
        assert_eq!(sanitize("<p>x</p><ul><li><br></li></ul><ol><li></li></ol>"), "<p>x</p>");
    }

    #[test]
    fn test_trailing_empty_item_kept_when_requested() {
        let sanitizer = HtmlSanitizer::new().keep_trailing_empty_item(true);
        assert_eq!(
            sanitizer.clean("<ul><li>a</li><li></li><li><br></li></ul>"),
            "<ul><li>a</li><li><br></li></ul>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(sanitize("1 &lt; 2 &amp;&amp; 3 &gt; 2"), "1 &lt; 2 &amp;&amp; 3 &gt; 2");
    }

    #[test]
    fn test_unwrap_inside_paragraph_settles() {
        let once = sanitize("<p>a<object><div>b</div></object></p>");
        assert!(!once.contains("object"));
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn test_idempotent_on_mixed_inputs() {
        let inputs = [
            "",
            "plain text",
            "<b>bold <i>both</i></b>",
            "<ul><li>one<ul><li></li></ul></li></ul>",
            "<p>unclosed <em>tags",
            "<a href=\"https://x.test/?q=1&r=2\">q</a>",
            "<div><section><p>deep</p></section></div>",
            "<li>stray item</li>",
            "x\u{a0}y",
            "<svg><script>alert(1)</script><text>t</text></svg>",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_oversized_input_yields_empty() {
        let huge = "a".repeat(MAX_INPUT_BYTES + 1);
        assert!(matches!(
            HtmlSanitizer::new().try_clean(&huge),
            Err(SanitizeError::TooLarge { .. })
        ));
        assert_eq!(sanitize(&huge), "");
    }

    #[test]
    fn test_plain_text_extraction() {
        assert_eq!(
            to_plain_text("<p>Intro</p><ul><li>one</li><li>two <b>bold</b></li></ul>"),
            "Intro\none\ntwo bold"
        );
    }
}
