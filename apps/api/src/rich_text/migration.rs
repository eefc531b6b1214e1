//! One-time conversion of legacy marker fields, run when a document loads.

use serde::Serialize;
use tracing::info;

use super::normalizer::{classify, normalize, TextKind};
use super::sanitizer::sanitize;
use crate::models::resume::ResumeDocument;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MigrationReport {
    /// Paths of the fields that were rewritten, e.g. `experience[0].details`.
    pub migrated: Vec<String>,
}

impl MigrationReport {
    pub fn is_empty(&self) -> bool {
        self.migrated.is_empty()
    }
}

/// Returns the migrated value, or `None` when the field must stay as is
/// (empty, already HTML, or plain unmarked text).
pub fn migrate_field(value: &str) -> Option<String> {
    match classify(value) {
        TextKind::LegacyMarked => Some(sanitize(&normalize(value))),
        TextKind::Empty | TextKind::Html | TextKind::Plain => None,
    }
}

/// Rewrites every legacy-marked rich-text field in place.
pub fn migrate_document(doc: &mut ResumeDocument) -> MigrationReport {
    let mut report = MigrationReport::default();
    for (path, field) in doc.rich_text_fields_mut() {
        if let Some(migrated) = migrate_field(field) {
            *field = migrated;
            report.migrated.push(path);
        }
    }
    if !report.is_empty() {
        info!("Migrated {} legacy rich-text field(s)", report.migrated.len());
    }
    report
}
