//! Legacy marker text -> constrained HTML.
//!
//! Fields written before rich editing existed use `**bold**`, `__underline__`,
//! `*italic*`, `[label](https://url)` and `-`/`*` bullet lines. Those are
//! converted once; anything that already looks like HTML is left alone so a
//! second run is a no-op.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::renderer::{render_blocks, to_html, BULLET_MARKER};

/// Any opening tag: `<p>`, `<a href="...">`, `<br/>`.
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\w+[^>]*>").expect("valid tag regex"));

/// Union of every legacy marker the old editor understood. Bullet lines use
/// the same pattern the block splitter does.
static LEGACY_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?m)\*\*|__|\*[^*\s][^*\n]*\*|{BULLET_MARKER}|\[.+?\]\(https?://[^\s)]+\)"
    ))
    .expect("valid marker regex")
});

/// What a stored text blob currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    Empty,
    Html,
    LegacyMarked,
    Plain,
}

/// Single detector shared by the migration pass, the editor and the API.
pub fn classify(text: &str) -> TextKind {
    if text.trim().is_empty() {
        TextKind::Empty
    } else if HTML_TAG.is_match(text) {
        TextKind::Html
    } else if LEGACY_MARKER.is_match(text) {
        TextKind::LegacyMarked
    } else {
        TextKind::Plain
    }
}

/// Converts legacy-marked text to constrained HTML. HTML, plain and empty
/// input is returned unchanged.
pub fn normalize(text: &str) -> String {
    match classify(text) {
        TextKind::LegacyMarked => convert_legacy(text),
        TextKind::Empty | TextKind::Html | TextKind::Plain => text.to_string(),
    }
}

/// Blocks first, then links, bold, underline and italic inside each block.
/// Shares the fallback renderer's segmenter and serializer, so migrated
/// text and unmigrated text look the same.
fn convert_legacy(text: &str) -> String {
    to_html(&render_blocks(text))
}
