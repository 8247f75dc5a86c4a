use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::null_as_default;

/// Structured profile extracted from a resume.
///
/// `id`, `file_name`, `raw_text` and `parsed_at` are assigned by the extraction
/// stage and never taken from model output. Everything else may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub id: Uuid,
    pub file_name: String,
    pub raw_text: String,
    pub candidate_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub educations: Vec<Education>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    pub parsed_at: DateTime<Utc>,
}

impl CandidateProfile {
    /// A profile carrying only the identity fields, with every structured
    /// field in its empty form.
    pub fn bare(raw_text: &str, file_name: &str, metadata: HashMap<String, Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.to_string(),
            raw_text: raw_text.to_string(),
            candidate_name: None,
            email: None,
            phone: None,
            summary: None,
            skills: Vec::new(),
            experiences: Vec::new(),
            educations: Vec::new(),
            certifications: Vec::new(),
            metadata,
            parsed_at: Utc::now(),
        }
    }

    /// True when an email or phone number is present and non-blank.
    pub fn has_contact_info(&self) -> bool {
        is_present(&self.email) || is_present(&self.phone)
    }
}

fn is_present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub position: String,
    /// Free text, e.g. "Jan 2020 - Present".
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default, deserialize_with = "null_as_default")]
    pub institution: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub degree: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub field: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub year: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_profile_has_empty_structured_fields() {
        let profile = CandidateProfile::bare("text", "cv.pdf", HashMap::new());
        assert_eq!(profile.raw_text, "text");
        assert_eq!(profile.file_name, "cv.pdf");
        assert!(profile.skills.is_empty());
        assert!(profile.experiences.is_empty());
        assert!(profile.educations.is_empty());
        assert!(profile.certifications.is_empty());
        assert!(profile.metadata.is_empty());
        assert!(profile.candidate_name.is_none());
    }

    #[test]
    fn test_contact_info_ignores_blank_values() {
        let mut profile = CandidateProfile::bare("", "cv.pdf", HashMap::new());
        assert!(!profile.has_contact_info());
        profile.email = Some("  ".to_string());
        assert!(!profile.has_contact_info());
        profile.phone = Some("+1 555 0100".to_string());
        assert!(profile.has_contact_info());
    }

    #[test]
    fn test_experience_tolerates_nulls() {
        let json = r#"{"company": null, "position": "Engineer", "achievements": null}"#;
        let exp: Experience = serde_json::from_str(json).unwrap();
        assert_eq!(exp.company, "");
        assert_eq!(exp.position, "Engineer");
        assert!(exp.achievements.is_empty());
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let profile = CandidateProfile::bare("raw", "cv.docx", HashMap::new());
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["fileName"], "cv.docx");
        assert_eq!(value["rawText"], "raw");
        assert!(value.get("parsedAt").is_some());
        assert!(value.get("candidateName").is_some());
    }
}
