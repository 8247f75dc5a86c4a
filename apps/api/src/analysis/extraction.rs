//! Structured Extraction — turns raw resume text into a `CandidateProfile`.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::analysis::fallback::{ask_json, ask_text, recover};
use crate::analysis::prompts::{KEYWORD_EXTRACTION, RESUME_PARSING};
use crate::llm_client::LanguageModel;
use crate::models::null_as_default;
use crate::models::profile::{CandidateProfile, Education, Experience};

/// The subset of a profile the model is allowed to fill in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileReply {
    candidate_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    summary: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    experiences: Vec<Experience>,
    #[serde(default, deserialize_with = "null_as_default")]
    educations: Vec<Education>,
    #[serde(default, deserialize_with = "null_as_default")]
    certifications: Vec<String>,
}

#[derive(Clone)]
pub struct ResumeParser {
    llm: Arc<dyn LanguageModel>,
}

impl ResumeParser {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Extracts a profile from `raw_text`. Never fails: when the model is
    /// unreachable or its reply is unusable, the profile carries only its
    /// identity fields.
    #[allow(dead_code)]
    pub async fn extract_profile(&self, raw_text: &str, file_name: &str) -> CandidateProfile {
        self.extract_profile_with_metadata(raw_text, file_name, HashMap::new())
            .await
    }

    /// Same as `extract_profile`, attaching caller-supplied metadata (upload
    /// size, content type) at creation time.
    pub async fn extract_profile_with_metadata(
        &self,
        raw_text: &str,
        file_name: &str,
        metadata: HashMap<String, Value>,
    ) -> CandidateProfile {
        info!("Parsing resume: {file_name}");

        let vars = HashMap::from([("resumeText", raw_text.to_string())]);
        let outcome = ask_json::<ProfileReply>(self.llm.as_ref(), &RESUME_PARSING, &vars).await;

        let mut profile = CandidateProfile::bare(raw_text, file_name, metadata);
        let reply = recover("resume parsing", outcome.map(Some), || None);
        if let Some(reply) = reply {
            profile.candidate_name = reply.candidate_name;
            profile.email = reply.email;
            profile.phone = reply.phone;
            profile.summary = reply.summary;
            profile.skills = reply.skills;
            profile.experiences = reply.experiences;
            profile.educations = reply.educations;
            profile.certifications = reply.certifications;
        }

        info!(
            "Parsed resume {}: {} skills, {} experiences",
            profile.id,
            profile.skills.len(),
            profile.experiences.len()
        );
        profile
    }

    /// Asks the model for the most important keywords in `text`.
    /// Returns an empty list when the model is unavailable.
    pub async fn extract_keywords(&self, text: &str) -> Vec<String> {
        let vars = HashMap::from([("text", text.to_string())]);
        let outcome = ask_text(self.llm.as_ref(), &KEYWORD_EXTRACTION, &vars)
            .await
            .map(|reply| split_keywords(&reply));
        recover("keyword extraction", outcome, Vec::new)
    }
}

fn split_keywords(reply: &str) -> Vec<String> {
    reply
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}
