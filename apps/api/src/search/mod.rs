//! Similarity search over stored profiles.
//!
//! `InMemoryResumeIndex` ranks by query-term coverage: the fraction of
//! distinct query terms that occur in the indexed profile text.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

use crate::models::profile::CandidateProfile;
use crate::store::ResumeStore;

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub content: String,
    pub metadata: Map<String, Value>,
    pub score: f64,
}

#[async_trait]
pub trait ResumeIndex: Send + Sync {
    async fn store(&self, profile: &CandidateProfile) -> Result<()>;

    /// Up to `top_k` hits scoring at least `threshold`, best first.
    async fn query_similar(&self, query: &str, top_k: usize, threshold: f64)
        -> Result<Vec<SearchHit>>;
}

struct IndexedDocument {
    content: String,
    terms: HashSet<String>,
    metadata: Map<String, Value>,
}

#[derive(Default)]
pub struct InMemoryResumeIndex {
    documents: RwLock<Vec<IndexedDocument>>,
}

#[async_trait]
impl ResumeIndex for InMemoryResumeIndex {
    async fn store(&self, profile: &CandidateProfile) -> Result<()> {
        let content = index_text(profile);
        let document = IndexedDocument {
            terms: tokenize(&content),
            content,
            metadata: index_metadata(profile),
        };

        let resume_id = Value::String(profile.id.to_string());
        let mut documents = self.documents.write().await;
        documents.retain(|d| d.metadata.get("resumeId") != Some(&resume_id));
        documents.push(document);
        Ok(())
    }

    async fn query_similar(
        &self,
        query: &str,
        top_k: usize,
        threshold: f64,
    ) -> Result<Vec<SearchHit>> {
        let query_terms = tokenize(query);
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let documents = self.documents.read().await;
        let mut hits: Vec<SearchHit> = documents
            .iter()
            .filter_map(|doc| {
                let covered = query_terms.intersection(&doc.terms).count();
                let score = covered as f64 / query_terms.len() as f64;
                (score > 0.0 && score >= threshold).then(|| SearchHit {
                    content: doc.content.clone(),
                    metadata: doc.metadata.clone(),
                    score,
                })
            })
            .collect();

        // stable: equal scores keep insertion order
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(top_k);
        Ok(hits)
    }
}

/// Indexes every profile in `store`, returning how many were indexed.
/// Run at startup so profiles persisted before a restart stay searchable.
pub async fn rebuild_index(store: &dyn ResumeStore, index: &dyn ResumeIndex) -> Result<usize> {
    let profiles = store.list().await?;
    for profile in &profiles {
        index.store(profile).await?;
    }
    Ok(profiles.len())
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Searchable summary of a profile.
pub fn index_text(profile: &CandidateProfile) -> String {
    let mut text = format!(
        "Candidate: {}\n\n",
        profile.candidate_name.as_deref().unwrap_or("Unknown")
    );

    if let Some(summary) = &profile.summary {
        text.push_str(&format!("Summary: {summary}\n\n"));
    }
    if !profile.skills.is_empty() {
        text.push_str(&format!("Skills: {}\n\n", profile.skills.join(", ")));
    }
    if !profile.experiences.is_empty() {
        text.push_str("Experience:\n");
        for exp in &profile.experiences {
            text.push_str(&format!(
                "- {} at {} ({})\n",
                exp.position, exp.company, exp.duration
            ));
            if !exp.description.is_empty() {
                text.push_str(&format!("  {}\n", exp.description));
            }
        }
        text.push('\n');
    }
    if !profile.educations.is_empty() {
        text.push_str("Education:\n");
        for edu in &profile.educations {
            text.push_str(&format!(
                "- {} in {} from {} ({})\n",
                edu.degree, edu.field, edu.institution, edu.year
            ));
        }
        text.push('\n');
    }
    if !profile.certifications.is_empty() {
        text.push_str(&format!(
            "Certifications: {}",
            profile.certifications.join(", ")
        ));
    }
    text
}

fn index_metadata(profile: &CandidateProfile) -> Map<String, Value> {
    let value = json!({
        "resumeId": profile.id.to_string(),
        "fileName": profile.file_name,
        "candidateName": profile.candidate_name,
        "email": profile.email,
        "type": "resume",
    });
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::store::InMemoryResumeStore;

    fn make_profile(name: &str, skills: &[&str]) -> CandidateProfile {
        let mut profile = CandidateProfile::bare("raw", "cv.pdf", HashMap::new());
        profile.candidate_name = Some(name.to_string());
        profile.skills = skills.iter().map(|s| s.to_string()).collect();
        profile
    }

    #[test]
    fn test_tokenize_keeps_language_names() {
        let terms = tokenize("C++, C# and Node.js!");
        assert!(terms.contains("c++"));
        assert!(terms.contains("c#"));
        assert!(terms.contains("node"));
        assert!(terms.contains("js"));
    }

    #[tokio::test]
    async fn test_query_ranks_by_coverage() {
        let index = InMemoryResumeIndex::default();
        let rust_dev = make_profile("Ada", &["Rust", "Tokio", "Postgres"]);
        let go_dev = make_profile("Grace", &["Go", "Postgres"]);
        index.store(&go_dev).await.unwrap();
        index.store(&rust_dev).await.unwrap();

        let hits = index.query_similar("rust postgres", 5, 0.0).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].metadata["candidateName"], "Ada");
        assert_eq!(hits[0].score, 1.0);
        assert_eq!(hits[1].score, 0.5);
    }

    #[tokio::test]
    async fn test_threshold_and_top_k() {
        let index = InMemoryResumeIndex::default();
        for name in ["A", "B", "C"] {
            index.store(&make_profile(name, &["Kotlin"])).await.unwrap();
        }
        index.store(&make_profile("D", &["Swift"])).await.unwrap();

        let hits = index.query_similar("kotlin android", 2, 0.5).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].metadata["candidateName"], "A");

        let strict = index.query_similar("kotlin android", 10, 0.7).await.unwrap();
        assert!(strict.is_empty());
    }

    #[tokio::test]
    async fn test_metadata_and_restore() {
        let index = InMemoryResumeIndex::default();
        let profile = make_profile("Ada", &["Rust"]);
        index.store(&profile).await.unwrap();
        index.store(&profile).await.unwrap();

        let hits = index.query_similar("rust", 10, 0.1).await.unwrap();
        assert_eq!(hits.len(), 1);
        let metadata = &hits[0].metadata;
        assert_eq!(metadata["resumeId"], profile.id.to_string());
        assert_eq!(metadata["fileName"], "cv.pdf");
        assert_eq!(metadata["type"], "resume");
        assert!(metadata["email"].is_null());
    }

    #[tokio::test]
    async fn test_empty_query_has_no_hits() {
        let index = InMemoryResumeIndex::default();
        index.store(&make_profile("Ada", &["Rust"])).await.unwrap();
        assert!(index.query_similar("  ,, ", 5, 0.0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rebuild_index_from_store() {
        let store = InMemoryResumeStore::default();
        store.save(&make_profile("Ada", &["Rust"])).await.unwrap();
        store.save(&make_profile("Grace", &["Cobol"])).await.unwrap();

        let index = InMemoryResumeIndex::default();
        assert!(index.query_similar("rust", 5, 0.7).await.unwrap().is_empty());

        let indexed = rebuild_index(&store, &index).await.unwrap();
        assert_eq!(indexed, 2);

        let hits = index.query_similar("rust", 5, 0.7).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].metadata["candidateName"], "Ada");
        assert_eq!(index.query_similar("cobol", 5, 0.7).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rebuild_index_on_empty_store() {
        let index = InMemoryResumeIndex::default();
        let indexed = rebuild_index(&InMemoryResumeStore::default(), &index)
            .await
            .unwrap();
        assert_eq!(indexed, 0);
    }

    #[test]
    fn test_index_text_summarizes_profile() {
        let mut profile = make_profile("Ada", &["Rust", "Go"]);
        profile.certifications = vec!["CKA".to_string()];
        let text = index_text(&profile);
        assert!(text.starts_with("Candidate: Ada\n\n"));
        assert!(text.contains("Skills: Rust, Go\n\n"));
        assert!(text.ends_with("Certifications: CKA"));
    }
}
