use serde::{Deserialize, Serialize};

pub const DEFAULT_CERTIFICATIONS_TITLE: &str = "Certifications";
pub const DEFAULT_AWARDS_TITLE: &str = "Awards";
pub const DEFAULT_ACHIEVEMENTS_TITLE: &str = "Achievements";

/// The resume being edited. Field names mirror the editor's JSON shape.
///
/// `details` on experience/education/project rows and `achievements` are
/// rich text: sanitized HTML (or empty) once the document has been loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeDocument {
    pub personal: PersonalDetails,
    pub summary: String,
    /// Comma separated.
    pub skills: String,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub projects: Vec<ProjectEntry>,
    pub certifications: Vec<CertificationEntry>,
    pub awards: Vec<AwardEntry>,
    pub certifications_title: String,
    pub awards_title: String,
    pub achievements_title: String,
    pub achievements: String,
    pub hobbies: String,
}

impl Default for ResumeDocument {
    /// One blank row per list, default section titles.
    fn default() -> Self {
        Self {
            personal: PersonalDetails::default(),
            summary: String::new(),
            skills: String::new(),
            experience: vec![ExperienceEntry::default()],
            education: vec![EducationEntry::default()],
            projects: vec![ProjectEntry::default()],
            certifications: vec![CertificationEntry::default()],
            awards: vec![AwardEntry::default()],
            certifications_title: DEFAULT_CERTIFICATIONS_TITLE.to_string(),
            awards_title: DEFAULT_AWARDS_TITLE.to_string(),
            achievements_title: DEFAULT_ACHIEVEMENTS_TITLE.to_string(),
            achievements: String::new(),
            hobbies: String::new(),
        }
    }
}

impl ResumeDocument {
    /// Every rich-text field with a stable path for reporting,
    /// e.g. `experience[1].details`.
    pub fn rich_text_fields_mut(&mut self) -> Vec<(String, &mut String)> {
        let mut fields = Vec::new();
        for (i, e) in self.experience.iter_mut().enumerate() {
            fields.push((format!("experience[{i}].details"), &mut e.details));
        }
        for (i, e) in self.education.iter_mut().enumerate() {
            fields.push((format!("education[{i}].details"), &mut e.details));
        }
        for (i, p) in self.projects.iter_mut().enumerate() {
            fields.push((format!("projects[{i}].details"), &mut p.details));
        }
        fields.push(("achievements".to_string(), &mut self.achievements));
        fields
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalDetails {
    pub full_name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub website: String,
    pub linkedin: String,
    pub github: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub company: String,
    pub role: String,
    pub start: String,
    pub end: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub school: String,
    pub degree: String,
    pub start: String,
    pub end: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEntry {
    pub name: String,
    pub link: String,
    pub start: String,
    pub end: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificationEntry {
    pub name: String,
    pub org: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwardEntry {
    pub name: String,
    pub issuer: String,
    pub year: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_one_row_per_list() {
        let doc = ResumeDocument::default();
        assert_eq!(doc.experience.len(), 1);
        assert_eq!(doc.awards.len(), 1);
        assert_eq!(doc.awards_title, "Awards");
    }

    #[test]
    fn test_deserializes_camel_case_with_missing_fields() {
        let doc: ResumeDocument = serde_json::from_str(
            r#"{"personal": {"fullName": "Ada"}, "experience": [{"company": "X", "details": "- a"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.personal.full_name, "Ada");
        assert_eq!(doc.experience[0].details, "- a");
        assert_eq!(doc.certifications_title, "Certifications");
        assert_eq!(doc.education.len(), 1);
    }

    #[test]
    fn test_rich_text_field_paths() {
        let mut doc = ResumeDocument::default();
        doc.projects.push(ProjectEntry::default());
        let paths: Vec<String> = doc
            .rich_text_fields_mut()
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        assert_eq!(
            paths,
            vec![
                "experience[0].details",
                "education[0].details",
                "projects[0].details",
                "projects[1].details",
                "achievements",
            ]
        );
    }
}
