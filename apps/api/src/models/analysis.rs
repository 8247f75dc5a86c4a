use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scored comparison of a profile against a job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub resume_id: Uuid,
    pub job_description_id: Option<String>,
    /// 0.0 – 1.0
    pub match_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub analysis: String,
    /// `skills`, `experience`, `education` → 0.0 – 1.0
    pub category_scores: BTreeMap<String, f64>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Lenient parse for model output. Unknown labels map to `Medium`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Priority::High,
            "LOW" => Priority::Low,
            _ => Priority::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub category: String,
    pub issue: String,
    pub recommendation: String,
    pub priority: Priority,
}

/// Locally computed ATS signals. Never depends on the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsMetrics {
    pub total_words: usize,
    pub unique_words: usize,
    /// skill count / total words; 0.0 when there are no words.
    pub keyword_density: f64,
    pub has_contact_info: bool,
    pub has_standard_sections: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsOptimizationResult {
    pub resume_id: Uuid,
    /// 0.0 – 100.0
    pub ats_score: f64,
    pub suggestions: Vec<Suggestion>,
    pub metrics: AtsMetrics,
    pub overall_assessment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"HIGH\"");
        let p: Priority = serde_json::from_str("\"LOW\"").unwrap();
        assert_eq!(p, Priority::Low);
    }

    #[test]
    fn test_priority_from_label_is_lenient() {
        assert_eq!(Priority::from_label("high"), Priority::High);
        assert_eq!(Priority::from_label(" Low "), Priority::Low);
        assert_eq!(Priority::from_label("urgent"), Priority::Medium);
        assert_eq!(Priority::from_label(""), Priority::Medium);
    }

    #[test]
    fn test_metrics_serialize_camel_case() {
        let metrics = AtsMetrics {
            total_words: 10,
            unique_words: 8,
            keyword_density: 0.2,
            has_contact_info: true,
            has_standard_sections: false,
        };
        let value = serde_json::to_value(&metrics).unwrap();
        assert_eq!(value["totalWords"], 10);
        assert_eq!(value["hasContactInfo"], true);
        assert_eq!(value["hasStandardSections"], false);
    }
}
