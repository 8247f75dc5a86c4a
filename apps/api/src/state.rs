use std::sync::Arc;

use crate::analysis::ats::AtsOptimizer;
use crate::analysis::extraction::ResumeParser;
use crate::analysis::matching::MatchAnalyzer;
use crate::archive::DocumentArchive;
use crate::config::Config;
use crate::llm_client::LanguageModel;
use crate::search::ResumeIndex;
use crate::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub parser: ResumeParser,
    pub matcher: MatchAnalyzer,
    pub ats: AtsOptimizer,
    pub store: Arc<dyn ResumeStore>,
    pub index: Arc<dyn ResumeIndex>,
    /// Present only when S3 settings are configured.
    pub archive: Option<DocumentArchive>,
    pub search_similarity_threshold: f64,
    pub candidate_similarity_threshold: f64,
}

impl AppState {
    pub fn new(
        config: &Config,
        llm: Arc<dyn LanguageModel>,
        store: Arc<dyn ResumeStore>,
        index: Arc<dyn ResumeIndex>,
        archive: Option<DocumentArchive>,
    ) -> Self {
        Self {
            parser: ResumeParser::new(llm.clone()),
            matcher: MatchAnalyzer::new(llm.clone()),
            ats: AtsOptimizer::new(llm, config.ats_max_suggestions),
            store,
            index,
            archive,
            search_similarity_threshold: config.search_similarity_threshold,
            candidate_similarity_threshold: config.candidate_similarity_threshold,
        }
    }
}
