//! Small display helpers used by the editor and preview.

use chrono::NaiveDate;
use url::Url;

use crate::models::resume::ResumeDocument;
use crate::rich_text::to_plain_text;

/// `"Jan 2022 – Mar 2023"`, `"Jan 2022 – Present"`, `"Mar 2023"` or `""`.
pub fn date_range(start: &str, end: &str) -> String {
    match (start.trim(), end.trim()) {
        ("", "") => String::new(),
        (s, "") => format!("{s} – Present"),
        ("", e) => e.to_string(),
        (s, e) => format!("{s} – {e}"),
    }
}

/// Month picker value (`YYYY-MM`) to the display form `"Jan 2022"`.
pub fn format_month(value: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d").ok()?;
    Some(date.format("%b %Y").to_string())
}

/// Month picker values are shown as `"Jan 2022"`; anything else as typed.
pub fn display_date(value: &str) -> String {
    format_month(value).unwrap_or_else(|| value.trim().to_string())
}

/// Compact contact link: host plus path, without the scheme.
///
/// Bare handles (no dot, no slash) are expanded with `host_hint`,
/// e.g. `"@ada"` with `"github.com/"` becomes `"github.com/ada"`.
pub fn display_link(value: &str, host_hint: Option<&str>) -> String {
    let value = value.trim();
    if value.is_empty() {
        return String::new();
    }

    let is_bare_handle = (!value.contains('.') && !value.contains('/')) || value.starts_with('@');
    if let (Some(hint), true) = (host_hint, is_bare_handle) {
        return format!("{hint}{}", value.trim_start_matches(['@', '/']));
    }

    let candidate = if value.starts_with("http") {
        value.to_string()
    } else {
        format!("https://{value}")
    };
    match Url::parse(&candidate) {
        Ok(url) => match url.host_str() {
            Some(host) if url.path() == "/" => host.to_string(),
            Some(host) => format!("{host}{}", url.path()),
            None => value.to_string(),
        },
        Err(_) => value.to_string(),
    }
}

/// Plain-text rendition of a document, used as cover-letter context.
pub fn resume_text(doc: &ResumeDocument) -> String {
    let p = &doc.personal;
    let mut lines: Vec<String> = [p.full_name.as_str(), p.title.as_str()]
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    let contact: Vec<String> = [
        p.email.trim().to_string(),
        p.phone.trim().to_string(),
        p.location.trim().to_string(),
        display_link(&p.website, None),
        display_link(&p.linkedin, Some("linkedin.com/in/")),
        display_link(&p.github, Some("github.com/")),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect();
    if !contact.is_empty() {
        lines.push(contact.join(" | "));
    }

    push_labelled(&mut lines, "Summary", &doc.summary);
    push_labelled(&mut lines, "Skills", &doc.skills);

    let mut section = |title: &str, entries: Vec<(String, String, String)>| {
        let entries: Vec<_> = entries
            .into_iter()
            .filter(|(heading, _, details)| !heading.is_empty() || !details.is_empty())
            .collect();
        if entries.is_empty() {
            return;
        }
        lines.push(format!("{title}:"));
        for (heading, dates, details) in entries {
            match dates.as_str() {
                "" => lines.push(format!("- {heading}")),
                _ => lines.push(format!("- {heading} ({dates})")),
            }
            if !details.is_empty() {
                lines.push(format!("  {details}"));
            }
        }
    };

    section(
        "Experience",
        doc.experience
            .iter()
            .map(|e| {
                (
                    joined(&e.role, " at ", &e.company),
                    date_range(&display_date(&e.start), &display_date(&e.end)),
                    to_plain_text(&e.details),
                )
            })
            .collect(),
    );
    section(
        "Education",
        doc.education
            .iter()
            .map(|e| {
                (
                    joined(&e.degree, ", ", &e.school),
                    date_range(&display_date(&e.start), &display_date(&e.end)),
                    to_plain_text(&e.details),
                )
            })
            .collect(),
    );
    section(
        "Projects",
        doc.projects
            .iter()
            .map(|pr| {
                (
                    joined(&pr.name, " ", &display_link(&pr.link, None)),
                    date_range(&display_date(&pr.start), &display_date(&pr.end)),
                    to_plain_text(&pr.details),
                )
            })
            .collect(),
    );

    push_labelled(&mut lines, &doc.achievements_title, &to_plain_text(&doc.achievements));
    lines.join("\n")
}

fn joined(a: &str, sep: &str, b: &str) -> String {
    match (a.trim(), b.trim()) {
        ("", b) => b.to_string(),
        (a, "") => a.to_string(),
        (a, b) => format!("{a}{sep}{b}"),
    }
}

fn push_labelled(lines: &mut Vec<String>, label: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        lines.push(format!("{label}: {value}"));
    }
}
