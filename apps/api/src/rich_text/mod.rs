// Rich-text pipeline: legacy marker text -> constrained HTML -> safe HTML.
// Every stored rich field passes through `sanitize` before it is kept.

pub mod handlers;
pub mod migration;
pub mod normalizer;
pub mod renderer;
pub mod sanitizer;

pub use migration::{migrate_document, MigrationReport};
pub use normalizer::{classify, normalize, TextKind};
pub use renderer::{render_blocks, Block};
pub use sanitizer::{sanitize, to_plain_text};

/// Escapes a text run for placement between tags.
pub(crate) fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

/// Escapes a double-quoted attribute value.
pub(crate) fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

/// Attributes forced onto every anchor that keeps its `href`.
pub(crate) const LINK_TARGET: &str = "_blank";
pub(crate) const LINK_REL: &str = "noopener noreferrer";

/// Writes an opening anchor tag with the forced new-context markers.
pub(crate) fn write_link_open(href: &str, out: &mut String) {
    out.push_str("<a href=\"");
    escape_attr(href, out);
    out.push_str("\" target=\"");
    out.push_str(LINK_TARGET);
    out.push_str("\" rel=\"");
    out.push_str(LINK_REL);
    out.push_str("\">");
}
