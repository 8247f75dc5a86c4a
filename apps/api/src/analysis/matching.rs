//! Match Scoring — compares a profile against a job posting.
//!
//! The model supplies `matchScore`, skill lists, analysis text and
//! recommendations. Category scores are always computed locally:
//!
//! - skills: |required ∩ candidate| / |required|, case-insensitive exact match
//! - experience: 0.8 with at least one entry, else 0.4
//! - education: 0.8 with at least one entry, else 0.4

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::analysis::fallback::{ask_json, recover};
use crate::analysis::prompts::MATCH_ANALYSIS;
use crate::llm_client::LanguageModel;
use crate::models::analysis::MatchResult;
use crate::models::job::JobPosting;
use crate::models::null_as_default;
use crate::models::profile::CandidateProfile;

pub const FALLBACK_MATCH_SCORE: f64 = 0.5;
pub const FALLBACK_ANALYSIS: &str =
    "Unable to perform detailed analysis. Manual review of this resume is needed.";
pub const FALLBACK_RECOMMENDATION: &str = "Please review the resume manually";

const PRESENT_SECTION_SCORE: f64 = 0.8;
const MISSING_SECTION_SCORE: f64 = 0.4;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchReply {
    #[serde(default, deserialize_with = "null_as_default")]
    match_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    matched_skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    missing_skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    analysis: String,
    #[serde(default, deserialize_with = "null_as_default")]
    recommendations: Vec<String>,
}

#[derive(Clone)]
pub struct MatchAnalyzer {
    llm: Arc<dyn LanguageModel>,
}

impl MatchAnalyzer {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Scores `profile` against `job`. Never fails.
    pub async fn score_match(&self, profile: &CandidateProfile, job: &JobPosting) -> MatchResult {
        info!(
            "Analyzing match between resume {} and job {}",
            profile.id,
            job.id.as_deref().unwrap_or("<none>")
        );

        let category_scores = category_scores(profile, job);
        let vars = prompt_vars(profile, job);
        let outcome = ask_json::<MatchReply>(self.llm.as_ref(), &MATCH_ANALYSIS, &vars)
            .await
            .map(|reply| MatchResult {
                resume_id: profile.id,
                job_description_id: job.id.clone(),
                match_score: reply.match_score.clamp(0.0, 1.0),
                matched_skills: reply.matched_skills,
                missing_skills: reply.missing_skills,
                analysis: reply.analysis,
                category_scores: category_scores.clone(),
                recommendations: reply.recommendations,
            });

        recover("match analysis", outcome, || MatchResult {
            resume_id: profile.id,
            job_description_id: job.id.clone(),
            match_score: FALLBACK_MATCH_SCORE,
            matched_skills: Vec::new(),
            missing_skills: Vec::new(),
            analysis: FALLBACK_ANALYSIS.to_string(),
            category_scores,
            recommendations: vec![FALLBACK_RECOMMENDATION.to_string()],
        })
    }
}

fn prompt_vars(profile: &CandidateProfile, job: &JobPosting) -> HashMap<&'static str, String> {
    let experience: Vec<String> = profile
        .experiences
        .iter()
        .map(|e| format!("{} at {}", e.position, e.company))
        .collect();
    let education: Vec<String> = profile
        .educations
        .iter()
        .map(|e| format!("{} in {}", e.degree, e.field))
        .collect();

    HashMap::from([
        (
            "candidateName",
            profile
                .candidate_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
        ),
        ("skills", join_or(&profile.skills, ", ", "None listed")),
        ("experience", join_or(&experience, "; ", "No experience listed")),
        ("education", join_or(&education, "; ", "No education listed")),
        (
            "jobTitle",
            job.title.clone().unwrap_or_else(|| "Not specified".to_string()),
        ),
        ("requiredSkills", join_or(&job.required_skills, ", ", "Not specified")),
        ("responsibilities", join_or(&job.responsibilities, "; ", "Not specified")),
        ("qualifications", join_or(&job.qualifications, "; ", "Not specified")),
    ])
}

fn join_or(items: &[String], separator: &str, default: &str) -> String {
    if items.is_empty() {
        default.to_string()
    } else {
        items.join(separator)
    }
}

/// Deterministic per-category scores, independent of the model.
pub fn category_scores(profile: &CandidateProfile, job: &JobPosting) -> BTreeMap<String, f64> {
    BTreeMap::from([
        (
            "skills".to_string(),
            skills_match_score(&job.required_skills, &profile.skills),
        ),
        (
            "experience".to_string(),
            section_score(!profile.experiences.is_empty()),
        ),
        (
            "education".to_string(),
            section_score(!profile.educations.is_empty()),
        ),
    ])
}

/// Fraction of distinct required skills the candidate lists, compared
/// case-insensitively. 0.0 when either side is empty.
pub fn skills_match_score(required: &[String], candidate: &[String]) -> f64 {
    let required: HashSet<String> = required.iter().map(|s| s.to_lowercase()).collect();
    let candidate: HashSet<String> = candidate.iter().map(|s| s.to_lowercase()).collect();
    if required.is_empty() || candidate.is_empty() {
        return 0.0;
    }
    let matched = required.intersection(&candidate).count();
    matched as f64 / required.len() as f64
}

fn section_score(present: bool) -> f64 {
    if present {
        PRESENT_SECTION_SCORE
    } else {
        MISSING_SECTION_SCORE
    }
}
