//! Editor state: the document being edited plus the UI state around it,
//! updated only through `EditorState::apply`.

pub mod format;
pub mod handlers;
pub mod layout;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::resume::{
    AwardEntry, CertificationEntry, EducationEntry, ExperienceEntry, ProjectEntry, ResumeDocument,
};
use crate::rich_text::{migrate_document, normalize, sanitize, MigrationReport};
use layout::{SectionId, SectionLayout};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Personal,
    Education,
    Experience,
    Projects,
    Skills,
    Certifications,
    Awards,
    Achievements,
    Customize,
    Templates,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    #[default]
    Basic,
    Modern,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    #[default]
    Sans,
    Serif,
}

pub const DEFAULT_ACCENT: &str = "#2563eb";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub font: FontFamily,
    /// `#rrggbb`
    pub accent: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            font: FontFamily::default(),
            accent: DEFAULT_ACCENT.to_string(),
        }
    }
}

fn is_hex_colour(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalField {
    FullName,
    Title,
    Email,
    Phone,
    Location,
    Website,
    Linkedin,
    Github,
}

/// A single-valued field of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldTarget {
    Summary,
    Skills,
    Hobbies,
    CertificationsTitle,
    AwardsTitle,
    AchievementsTitle,
    Achievements,
    ExperienceDetails(usize),
    EducationDetails(usize),
    ProjectDetails(usize),
}

impl FieldTarget {
    /// Rich fields hold sanitized HTML; the rest hold plain text.
    pub fn is_rich(self) -> bool {
        matches!(
            self,
            FieldTarget::Achievements
                | FieldTarget::ExperienceDetails(_)
                | FieldTarget::EducationDetails(_)
                | FieldTarget::ProjectDetails(_)
        )
    }

    /// Fields with a "generate" control.
    pub fn is_generatable(self) -> bool {
        self == FieldTarget::Summary || self.is_rich()
    }

    fn section(self) -> Option<ListSection> {
        match self {
            FieldTarget::ExperienceDetails(_) => Some(ListSection::Experience),
            FieldTarget::EducationDetails(_) => Some(ListSection::Education),
            FieldTarget::ProjectDetails(_) => Some(ListSection::Projects),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListSection {
    Experience,
    Education,
    Projects,
    Certifications,
    Awards,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationTicket(Uuid);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PendingGeneration {
    target: FieldTarget,
    ticket: GenerationTicket,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationFailure {
    pub target: FieldTarget,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationOutcome {
    Completed { text: String },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorAction {
    /// Replaces the document and runs the legacy migration once.
    Load { document: ResumeDocument },
    SelectTab { tab: Tab },
    SetTemplate { template: Template },
    SetTheme { theme: Theme },
    SetPersonal { field: PersonalField, value: String },
    SetField { target: FieldTarget, value: String },
    SetEntryField {
        section: ListSection,
        index: usize,
        field: String,
        value: String,
    },
    AddRow { section: ListSection },
    RemoveRow { section: ListSection, index: usize },
    MoveSection { active: SectionId, over: SectionId },
    ToggleSection { section: SectionId },
    ShowSection { section: SectionId },
    BeginGeneration { target: FieldTarget },
    FinishGeneration {
        ticket: GenerationTicket,
        outcome: GenerationOutcome,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorState {
    pub document: ResumeDocument,
    pub tab: Tab,
    pub template: Template,
    pub theme: Theme,
    pub layout: SectionLayout,
    #[serde(default)]
    pending: Vec<PendingGeneration>,
    #[serde(default)]
    errors: Vec<GenerationFailure>,
}

impl EditorState {
    /// Fresh editor around `document`, legacy fields already migrated.
    pub fn load(document: ResumeDocument) -> (Self, MigrationReport) {
        let mut state = Self::default();
        let report = state.replace_document(document);
        (state, report)
    }

    /// True while a generation for `target` is outstanding; its control is disabled.
    pub fn is_generating(&self, target: FieldTarget) -> bool {
        self.pending.iter().any(|p| p.target == target)
    }

    pub fn pending_ticket(&self, target: FieldTarget) -> Option<GenerationTicket> {
        self.pending
            .iter()
            .find(|p| p.target == target)
            .map(|p| p.ticket)
    }

    /// Inline error left by the last failed generation for `target`.
    pub fn generation_error(&self, target: FieldTarget) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.target == target)
            .map(|e| e.message.as_str())
    }

    /// Starts a generation, or returns `None` if one is already running for
    /// `target` (or the field has no generate control).
    pub fn begin_generation(&mut self, target: FieldTarget) -> Option<GenerationTicket> {
        if !target.is_generatable() || self.is_generating(target) {
            return None;
        }
        self.apply(EditorAction::BeginGeneration { target });
        self.pending_ticket(target)
    }

    pub fn apply(&mut self, action: EditorAction) {
        match action {
            EditorAction::Load { document } => {
                self.replace_document(document);
            }
            EditorAction::SelectTab { tab } => self.tab = tab,
            EditorAction::SetTemplate { template } => self.template = template,
            EditorAction::SetTheme { theme } => {
                if is_hex_colour(&theme.accent) {
                    self.theme = theme;
                } else {
                    warn!("Ignoring theme with invalid accent colour {:?}", theme.accent);
                }
            }
            EditorAction::SetPersonal { field, value } => {
                *self.personal_field_mut(field) = value;
            }
            EditorAction::SetField { target, value } => self.write_field(target, value),
            EditorAction::SetEntryField {
                section,
                index,
                field,
                value,
            } => self.set_entry_field(section, index, &field, value),
            EditorAction::AddRow { section } => self.add_row(section),
            EditorAction::RemoveRow { section, index } => self.remove_row(section, index),
            EditorAction::MoveSection { active, over } => {
                self.layout.move_section(active, over);
            }
            EditorAction::ToggleSection { section } => {
                self.layout.toggle(section);
            }
            EditorAction::ShowSection { section } => self.layout.set_visible(section, true),
            EditorAction::BeginGeneration { target } => {
                if target.is_generatable() && !self.is_generating(target) {
                    self.errors.retain(|e| e.target != target);
                    self.pending.push(PendingGeneration {
                        target,
                        ticket: GenerationTicket(Uuid::new_v4()),
                    });
                }
            }
            EditorAction::FinishGeneration { ticket, outcome } => {
                self.finish_generation(ticket, outcome)
            }
        }
    }

    fn replace_document(&mut self, mut document: ResumeDocument) -> MigrationReport {
        let report = migrate_document(&mut document);
        self.document = document;
        // results for the old document no longer have anywhere to go
        self.pending.clear();
        self.errors.clear();
        report
    }

    fn finish_generation(&mut self, ticket: GenerationTicket, outcome: GenerationOutcome) {
        let Some(idx) = self.pending.iter().position(|p| p.ticket == ticket) else {
            debug!("Dropping stale generation result {:?}", ticket);
            return;
        };
        let target = self.pending.remove(idx).target;

        match outcome {
            GenerationOutcome::Completed { text } => {
                let value = if target.is_rich() {
                    normalize(&text)
                } else {
                    text
                };
                self.write_field(target, value);
            }
            GenerationOutcome::Failed { message } => {
                self.errors.retain(|e| e.target != target);
                self.errors.push(GenerationFailure { target, message });
            }
        }
    }

    /// Rich fields are sanitized on every write; plain fields are stored as typed.
    fn write_field(&mut self, target: FieldTarget, value: String) {
        let value = if target.is_rich() {
            sanitize(&value)
        } else {
            value
        };
        let doc = &mut self.document;
        let slot = match target {
            FieldTarget::Summary => Some(&mut doc.summary),
            FieldTarget::Skills => Some(&mut doc.skills),
            FieldTarget::Hobbies => Some(&mut doc.hobbies),
            FieldTarget::CertificationsTitle => Some(&mut doc.certifications_title),
            FieldTarget::AwardsTitle => Some(&mut doc.awards_title),
            FieldTarget::AchievementsTitle => Some(&mut doc.achievements_title),
            FieldTarget::Achievements => Some(&mut doc.achievements),
            FieldTarget::ExperienceDetails(i) => doc.experience.get_mut(i).map(|e| &mut e.details),
            FieldTarget::EducationDetails(i) => doc.education.get_mut(i).map(|e| &mut e.details),
            FieldTarget::ProjectDetails(i) => doc.projects.get_mut(i).map(|p| &mut p.details),
        };
        match slot {
            Some(slot) => *slot = value,
            None => warn!("Ignoring write to missing field {:?}", target),
        }
    }

    fn personal_field_mut(&mut self, field: PersonalField) -> &mut String {
        let p = &mut self.document.personal;
        match field {
            PersonalField::FullName => &mut p.full_name,
            PersonalField::Title => &mut p.title,
            PersonalField::Email => &mut p.email,
            PersonalField::Phone => &mut p.phone,
            PersonalField::Location => &mut p.location,
            PersonalField::Website => &mut p.website,
            PersonalField::Linkedin => &mut p.linkedin,
            PersonalField::Github => &mut p.github,
        }
    }

    fn set_entry_field(&mut self, section: ListSection, index: usize, field: &str, value: String) {
        if field == "details" {
            let target = match section {
                ListSection::Experience => FieldTarget::ExperienceDetails(index),
                ListSection::Education => FieldTarget::EducationDetails(index),
                ListSection::Projects => FieldTarget::ProjectDetails(index),
                ListSection::Certifications | ListSection::Awards => {
                    warn!("{:?} rows have no details field", section);
                    return;
                }
            };
            self.write_field(target, value);
            return;
        }

        let doc = &mut self.document;
        let slot = match section {
            ListSection::Experience => doc.experience.get_mut(index).and_then(|e| match field {
                "company" => Some(&mut e.company),
                "role" => Some(&mut e.role),
                "start" => Some(&mut e.start),
                "end" => Some(&mut e.end),
                _ => None,
            }),
            ListSection::Education => doc.education.get_mut(index).and_then(|e| match field {
                "school" => Some(&mut e.school),
                "degree" => Some(&mut e.degree),
                "start" => Some(&mut e.start),
                "end" => Some(&mut e.end),
                _ => None,
            }),
            ListSection::Projects => doc.projects.get_mut(index).and_then(|p| match field {
                "name" => Some(&mut p.name),
                "link" => Some(&mut p.link),
                "start" => Some(&mut p.start),
                "end" => Some(&mut p.end),
                _ => None,
            }),
            ListSection::Certifications => {
                doc.certifications.get_mut(index).and_then(|c| match field {
                    "name" => Some(&mut c.name),
                    "org" => Some(&mut c.org),
                    "start" => Some(&mut c.start),
                    "end" => Some(&mut c.end),
                    _ => None,
                })
            }
            ListSection::Awards => doc.awards.get_mut(index).and_then(|a| match field {
                "name" => Some(&mut a.name),
                "issuer" => Some(&mut a.issuer),
                "year" => Some(&mut a.year),
                _ => None,
            }),
        };
        match slot {
            Some(slot) => *slot = value,
            None => warn!("Ignoring write to {:?}[{}].{}", section, index, field),
        }
    }

    fn add_row(&mut self, section: ListSection) {
        let doc = &mut self.document;
        match section {
            ListSection::Experience => doc.experience.push(ExperienceEntry::default()),
            ListSection::Education => doc.education.push(EducationEntry::default()),
            ListSection::Projects => doc.projects.push(ProjectEntry::default()),
            ListSection::Certifications => doc.certifications.push(CertificationEntry::default()),
            ListSection::Awards => doc.awards.push(AwardEntry::default()),
        }
    }

    /// A list always keeps at least one row.
    fn remove_row(&mut self, section: ListSection, index: usize) {
        let doc = &mut self.document;
        let removed = match section {
            ListSection::Experience => remove_keeping_one(&mut doc.experience, index),
            ListSection::Education => remove_keeping_one(&mut doc.education, index),
            ListSection::Projects => remove_keeping_one(&mut doc.projects, index),
            ListSection::Certifications => remove_keeping_one(&mut doc.certifications, index),
            ListSection::Awards => remove_keeping_one(&mut doc.awards, index),
        };
        if removed {
            // row indices shifted: outstanding results for this list are stale
            self.pending.retain(|p| p.target.section() != Some(section));
            self.errors.retain(|e| e.target.section() != Some(section));
        }
    }
}

fn remove_keeping_one<T>(rows: &mut Vec<T>, index: usize) -> bool {
    if rows.len() <= 1 || index >= rows.len() {
        return false;
    }
    rows.remove(index);
    true
}
