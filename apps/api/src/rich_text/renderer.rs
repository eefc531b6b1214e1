//! Read-only fallback formatter for legacy marker text that has not been
//! migrated yet. Produces structured nodes; never touches stored values.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::{escape_text, write_link_open};

/// A `-` or `*` bullet at the start of a line. Horizontal whitespace only, so
/// it can sit inside multi-line patterns.
pub(crate) const BULLET_MARKER: &str = r"^[^\S\n]*[-*][^\S\n]+";

static BULLET_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(BULLET_MARKER).expect("valid bullet regex"));
static LINK_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(.+?)\]\((https?://[^\s)]+)\)").expect("valid link regex")
});
static BOLD_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold regex"));
static UNDERLINE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__(.+?)__").expect("valid underline regex"));
static ITALIC_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.+?)\*").expect("valid italic regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineNode {
    Text { text: String },
    Bold { text: String },
    Italic { text: String },
    Underline { text: String },
    Link { label: String, href: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph { content: Vec<InlineNode> },
    List { items: Vec<Vec<InlineNode>> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TextBlock {
    List(Vec<String>),
    Paragraph(String),
}

/// Consecutive bullet lines form one list; other non-blank runs form a
/// paragraph joined by single spaces; blank lines only separate.
fn split_blocks(text: &str) -> Vec<TextBlock> {
    let lines: Vec<&str> = text.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if BULLET_LINE.is_match(lines[i]) {
            let mut items = Vec::new();
            while let Some(item) = lines.get(i).copied().and_then(bullet_item) {
                items.push(item.to_string());
                i += 1;
            }
            blocks.push(TextBlock::List(items));
        } else if lines[i].trim().is_empty() {
            i += 1;
        } else {
            let mut para = vec![lines[i]];
            i += 1;
            while i < lines.len() && !lines[i].trim().is_empty() && !BULLET_LINE.is_match(lines[i])
            {
                para.push(lines[i]);
                i += 1;
            }
            blocks.push(TextBlock::Paragraph(para.join(" ")));
        }
    }
    blocks
}

fn bullet_item(line: &str) -> Option<&str> {
    BULLET_LINE.find(line).map(|m| &line[m.end()..])
}

/// Renders one run of text into inline nodes.
///
/// Link markers split the run first (left to right, first match wins); each
/// plain segment then gets single, non-nesting passes for bold, underline
/// and italic in that order. A later pass only sees text no earlier pass
/// claimed, so `__a *b*__` stays one underline.
pub fn render(text: &str) -> Vec<InlineNode> {
    let mut nodes = Vec::new();
    let mut last = 0;
    for caps in LINK_MARKER.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        render_plain(&text[last..whole.start()], &mut nodes);
        nodes.push(InlineNode::Link {
            label: caps[1].to_string(),
            href: caps[2].to_string(),
        });
        last = whole.end();
    }
    render_plain(&text[last..], &mut nodes);
    nodes
}

/// Block classification first, then inline rendering inside each block.
pub fn render_blocks(text: &str) -> Vec<Block> {
    split_blocks(text)
        .into_iter()
        .map(|block| match block {
            TextBlock::List(items) => Block::List {
                items: items.iter().map(|item| render(item)).collect(),
            },
            TextBlock::Paragraph(para) => Block::Paragraph {
                content: render(&para),
            },
        })
        .collect()
}

fn render_plain(run: &str, out: &mut Vec<InlineNode>) {
    if run.is_empty() {
        return;
    }
    let bold = split_styled(vec![InlineNode::Text { text: run.to_string() }], &BOLD_MARKER, |text| {
        InlineNode::Bold { text }
    });
    let underline = split_styled(bold, &UNDERLINE_MARKER, |text| InlineNode::Underline { text });
    out.extend(split_styled(underline, &ITALIC_MARKER, |text| {
        InlineNode::Italic { text }
    }));
}

/// One substitution pass over the plain-text segments of `nodes`.
fn split_styled(
    nodes: Vec<InlineNode>,
    marker: &Regex,
    styled: impl Fn(String) -> InlineNode,
) -> Vec<InlineNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        let InlineNode::Text { text } = node else {
            out.push(node);
            continue;
        };
        let mut last = 0;
        for caps in marker.captures_iter(&text) {
            let Some(whole) = caps.get(0) else { continue };
            if whole.start() > last {
                out.push(InlineNode::Text {
                    text: text[last..whole.start()].to_string(),
                });
            }
            out.push(styled(caps[1].to_string()));
            last = whole.end();
        }
        if last < text.len() {
            out.push(InlineNode::Text {
                text: text[last..].to_string(),
            });
        }
    }
    out
}

/// Serializes rendered blocks as constrained HTML. The normalizer uses this
/// too, so both paths emit the same markup.
pub fn to_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            Block::Paragraph { content } => {
                out.push_str("<p>");
                write_inline(content, &mut out);
                out.push_str("</p>");
            }
            Block::List { items } => {
                let items: Vec<_> = items.iter().filter(|i| has_text(i)).collect();
                if items.is_empty() {
                    continue;
                }
                out.push_str("<ul>");
                for item in items {
                    out.push_str("<li>");
                    write_inline(item, &mut out);
                    out.push_str("</li>");
                }
                out.push_str("</ul>");
            }
        }
    }
    out
}

fn has_text(nodes: &[InlineNode]) -> bool {
    nodes.iter().any(|n| match n {
        InlineNode::Text { text }
        | InlineNode::Bold { text }
        | InlineNode::Italic { text }
        | InlineNode::Underline { text } => !text.trim().is_empty(),
        InlineNode::Link { label, .. } => !label.trim().is_empty(),
    })
}

fn write_inline(nodes: &[InlineNode], out: &mut String) {
    for node in nodes {
        let (tag, text) = match node {
            InlineNode::Text { text } => {
                escape_text(text, out);
                continue;
            }
            InlineNode::Link { label, href } => {
                write_link_open(href, out);
                escape_text(label, out);
                out.push_str("</a>");
                continue;
            }
            InlineNode::Bold { text } => ("strong", text),
            InlineNode::Italic { text } => ("em", text),
            InlineNode::Underline { text } => ("u", text),
        };
        out.push('<');
        out.push_str(tag);
        out.push('>');
        escape_text(text, out);
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
}
