//! ATS Optimization — scores a profile for ATS-friendliness and suggests fixes.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::analysis::fallback::{ask_json, recover};
use crate::analysis::prompts::ATS_OPTIMIZATION;
use crate::llm_client::LanguageModel;
use crate::models::analysis::{AtsMetrics, AtsOptimizationResult, Priority, Suggestion};
use crate::models::null_as_default;
use crate::models::profile::CandidateProfile;

pub const DEFAULT_ATS_SCORE: f64 = 50.0;
pub const FALLBACK_ASSESSMENT: &str = "Manual review recommended.";
pub const DEFAULT_MAX_SUGGESTIONS: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AtsReply {
    ats_score: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    suggestions: Vec<SuggestionReply>,
    #[serde(default, deserialize_with = "null_as_default")]
    overall_assessment: String,
}

#[derive(Debug, Deserialize)]
struct SuggestionReply {
    category: Option<String>,
    issue: Option<String>,
    recommendation: Option<String>,
    priority: Option<String>,
}

impl From<SuggestionReply> for Suggestion {
    fn from(reply: SuggestionReply) -> Self {
        Suggestion {
            category: reply.category.unwrap_or_else(|| "General".to_string()),
            issue: reply.issue.unwrap_or_default(),
            recommendation: reply.recommendation.unwrap_or_default(),
            priority: reply
                .priority
                .as_deref()
                .map(Priority::from_label)
                .unwrap_or_default(),
        }
    }
}

#[derive(Clone)]
pub struct AtsOptimizer {
    llm: Arc<dyn LanguageModel>,
    max_suggestions: usize,
}

impl AtsOptimizer {
    pub fn new(llm: Arc<dyn LanguageModel>, max_suggestions: usize) -> Self {
        Self {
            llm,
            max_suggestions,
        }
    }

    /// Scores `profile` for ATS-friendliness. Never fails.
    pub async fn optimize(&self, profile: &CandidateProfile) -> AtsOptimizationResult {
        info!("Optimizing resume for ATS: {}", profile.id);

        let metrics = compute_metrics(profile);
        let vars = HashMap::from([("resumeText", render_resume_text(profile))]);
        let outcome = ask_json::<AtsReply>(self.llm.as_ref(), &ATS_OPTIMIZATION, &vars)
            .await
            .map(|reply| AtsOptimizationResult {
                resume_id: profile.id,
                ats_score: reply
                    .ats_score
                    .unwrap_or(DEFAULT_ATS_SCORE)
                    .clamp(0.0, 100.0),
                suggestions: reply
                    .suggestions
                    .into_iter()
                    .take(self.max_suggestions)
                    .map(Suggestion::from)
                    .collect(),
                metrics: metrics.clone(),
                overall_assessment: reply.overall_assessment,
            });

        recover("ATS optimization", outcome, || AtsOptimizationResult {
            resume_id: profile.id,
            ats_score: DEFAULT_ATS_SCORE,
            suggestions: vec![Suggestion {
                category: "General".to_string(),
                issue: "Unable to perform automated analysis".to_string(),
                recommendation: "Please review resume manually for ATS optimization".to_string(),
                priority: Priority::Medium,
            }],
            metrics,
            overall_assessment: FALLBACK_ASSESSMENT.to_string(),
        })
    }
}

/// Plain-text rendering of a profile: contact header, then SUMMARY, SKILLS,
/// EXPERIENCE and EDUCATION blocks for whatever is present.
pub fn render_resume_text(profile: &CandidateProfile) -> String {
    let mut text = String::new();

    if let Some(name) = &profile.candidate_name {
        let _ = writeln!(text, "Name: {name}");
    }
    if let Some(email) = &profile.email {
        let _ = writeln!(text, "Email: {email}");
    }
    if let Some(phone) = &profile.phone {
        let _ = writeln!(text, "Phone: {phone}");
    }
    text.push('\n');

    if let Some(summary) = &profile.summary {
        let _ = write!(text, "SUMMARY\n{summary}\n\n");
    }

    if !profile.skills.is_empty() {
        let _ = write!(text, "SKILLS\n{}\n\n", profile.skills.join(", "));
    }

    if !profile.experiences.is_empty() {
        text.push_str("EXPERIENCE\n");
        for exp in &profile.experiences {
            let _ = writeln!(text, "{} | {} | {}", exp.position, exp.company, exp.duration);
            if !exp.description.is_empty() {
                let _ = writeln!(text, "{}", exp.description);
            }
            text.push('\n');
        }
    }

    if !profile.educations.is_empty() {
        text.push_str("EDUCATION\n");
        for edu in &profile.educations {
            let _ = writeln!(
                text,
                "{} - {} | {} | {}",
                edu.degree, edu.field, edu.institution, edu.year
            );
        }
    }

    text
}

/// Word counts, keyword density and section checks over the raw text.
pub fn compute_metrics(profile: &CandidateProfile) -> AtsMetrics {
    let words: Vec<&str> = profile.raw_text.split_whitespace().collect();
    let unique: HashSet<&str> = words.iter().copied().collect();
    let keyword_density = if words.is_empty() {
        0.0
    } else {
        profile.skills.len() as f64 / words.len() as f64
    };

    AtsMetrics {
        total_words: words.len(),
        unique_words: unique.len(),
        keyword_density,
        has_contact_info: profile.has_contact_info(),
        has_standard_sections: !profile.skills.is_empty() && !profile.experiences.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;
    use crate::models::profile::{Education, Experience};

    fn make_profile(raw_text: &str) -> CandidateProfile {
        CandidateProfile::bare(raw_text, "cv.pdf", HashMap::new())
    }

    fn optimizer(llm: ScriptedModel) -> AtsOptimizer {
        AtsOptimizer::new(Arc::new(llm), DEFAULT_MAX_SUGGESTIONS)
    }

    #[test]
    fn test_keyword_density_is_skills_over_words() {
        let raw = vec!["word"; 100].join(" ");
        let mut profile = make_profile(&raw);
        profile.skills = ["Rust", "Go", "SQL", "Docker", "AWS"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let metrics = compute_metrics(&profile);
        assert_eq!(metrics.total_words, 100);
        assert_eq!(metrics.unique_words, 1);
        assert!((metrics.keyword_density - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_metrics_on_empty_text() {
        let metrics = compute_metrics(&make_profile("   \n\t"));
        assert_eq!(metrics.total_words, 0);
        assert_eq!(metrics.unique_words, 0);
        assert_eq!(metrics.keyword_density, 0.0);
        assert!(!metrics.has_contact_info);
        assert!(!metrics.has_standard_sections);
    }

    #[test]
    fn test_standard_sections_need_skills_and_experience() {
        let mut profile = make_profile("text");
        profile.skills.push("Rust".to_string());
        assert!(!compute_metrics(&profile).has_standard_sections);
        profile.experiences.push(Experience::default());
        assert!(compute_metrics(&profile).has_standard_sections);
    }

    #[test]
    fn test_render_resume_text_layout() {
        let mut profile = make_profile("raw");
        profile.candidate_name = Some("Jane Roe".to_string());
        profile.email = Some("jane@example.com".to_string());
        profile.summary = Some("Systems engineer".to_string());
        profile.skills = vec!["Rust".to_string(), "Go".to_string()];
        profile.experiences.push(Experience {
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            duration: "2020 - 2024".to_string(),
            description: "Built storage".to_string(),
            achievements: vec![],
        });
        profile.educations.push(Education {
            institution: "MIT".to_string(),
            degree: "BSc".to_string(),
            field: "CS".to_string(),
            year: "2019".to_string(),
        });

        let expected = "Name: Jane Roe\nEmail: jane@example.com\n\n\
            SUMMARY\nSystems engineer\n\n\
            SKILLS\nRust, Go\n\n\
            EXPERIENCE\nEngineer | Acme | 2020 - 2024\nBuilt storage\n\n\
            EDUCATION\nBSc - CS | MIT | 2019\n";
        assert_eq!(render_resume_text(&profile), expected);
    }

    #[tokio::test]
    async fn test_model_reply_with_suggestion_defaults() {
        let reply = r#"{
            "atsScore": 72.5,
            "suggestions": [
                {"category": "Keywords", "issue": "Few keywords", "recommendation": "Add skills", "priority": "HIGH"},
                {"issue": "No summary", "recommendation": "Add one"}
            ],
            "overallAssessment": "Decent."
        }"#;
        let result = optimizer(ScriptedModel::replying(reply))
            .optimize(&make_profile("some words"))
            .await;

        assert_eq!(result.ats_score, 72.5);
        assert_eq!(result.suggestions.len(), 2);
        assert_eq!(result.suggestions[0].priority, Priority::High);
        assert_eq!(result.suggestions[1].category, "General");
        assert_eq!(result.suggestions[1].priority, Priority::Medium);
        assert_eq!(result.overall_assessment, "Decent.");
        assert_eq!(result.metrics.total_words, 2);
    }

    #[tokio::test]
    async fn test_missing_score_defaults_to_fifty() {
        let result = optimizer(ScriptedModel::replying("{}"))
            .optimize(&make_profile("text"))
            .await;
        assert_eq!(result.ats_score, DEFAULT_ATS_SCORE);
        assert!(result.suggestions.is_empty());
        assert_eq!(result.overall_assessment, "");
    }

    #[tokio::test]
    async fn test_suggestions_are_capped() {
        let suggestions: Vec<String> = (0..5)
            .map(|i| format!(r#"{{"issue": "issue {i}"}}"#))
            .collect();
        let reply = format!(r#"{{"atsScore": 60, "suggestions": [{}]}}"#, suggestions.join(","));
        let result = AtsOptimizer::new(Arc::new(ScriptedModel::replying(&reply)), 3)
            .optimize(&make_profile("text"))
            .await;
        assert_eq!(result.suggestions.len(), 3);
        assert_eq!(result.suggestions[2].issue, "issue 2");
    }

    #[tokio::test]
    async fn test_fallback_when_model_unreachable() {
        let mut profile = make_profile("Jane Roe jane@example.com Rust");
        profile.email = Some("jane@example.com".to_string());
        let result = optimizer(ScriptedModel::unavailable()).optimize(&profile).await;

        assert_eq!(result.resume_id, profile.id);
        assert_eq!(result.ats_score, 50.0);
        assert_eq!(result.suggestions.len(), 1);
        assert_eq!(result.suggestions[0].priority, Priority::Medium);
        assert_eq!(result.suggestions[0].category, "General");
        assert_eq!(result.suggestions[0].issue, "Unable to perform automated analysis");
        assert_eq!(result.overall_assessment, FALLBACK_ASSESSMENT);
        assert!(result.metrics.has_contact_info);
        assert_eq!(result.metrics.total_words, 4);
    }

    #[tokio::test]
    async fn test_fallback_reports_missing_contact_info() {
        let result = optimizer(ScriptedModel::replying("not json"))
            .optimize(&make_profile("anonymous resume"))
            .await;
        assert_eq!(result.ats_score, 50.0);
        assert!(!result.metrics.has_contact_info);
    }

    #[tokio::test]
    async fn test_prompt_embeds_rendered_resume() {
        let llm = Arc::new(ScriptedModel::unavailable());
        let mut profile = make_profile("raw");
        profile.skills = vec!["Kotlin".to_string()];
        AtsOptimizer::new(llm.clone(), DEFAULT_MAX_SUGGESTIONS)
            .optimize(&profile)
            .await;
        assert!(llm.last_prompt().unwrap().contains("SKILLS\nKotlin\n"));
    }
}
