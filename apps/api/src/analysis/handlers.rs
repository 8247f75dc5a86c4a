//! Axum route handlers for the Resume API.

use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::documents::{extract_text, file_extension, is_supported, DocumentError};
use crate::errors::AppError;
use crate::models::analysis::{AtsOptimizationResult, MatchResult};
use crate::models::job::JobPosting;
use crate::models::profile::CandidateProfile;
use crate::search::SearchHit;
use crate::state::AppState;

const DEFAULT_TOP_K: usize = 5;
const CANDIDATE_TOP_K: usize = 10;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(rename = "topK", default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateHit {
    pub resume_id: Value,
    pub candidate_name: Value,
    pub relevance_score: f64,
}

#[derive(Debug, Deserialize)]
pub struct KeywordsRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct KeywordsResponse {
    pub keywords: Vec<String>,
}

struct Upload {
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/upload
///
/// Multipart field `file`. Extracts text, builds the profile, stores and
/// indexes it, and archives the original document when S3 is configured.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CandidateProfile>, AppError> {
    let upload = read_upload(multipart).await?;
    info!("Received resume upload: {}", upload.file_name);

    if !is_supported(&upload.file_name) {
        return Err(DocumentError::UnsupportedFormat(file_extension(&upload.file_name)).into());
    }

    let data = upload.data.clone();
    let file_name = upload.file_name.clone();
    let text = tokio::task::spawn_blocking(move || extract_text(&data, &file_name))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;
    info!("Extracted {} characters from {}", text.len(), upload.file_name);

    let metadata = HashMap::from([
        ("fileName".to_string(), Value::from(upload.file_name.clone())),
        ("fileSize".to_string(), Value::from(upload.data.len())),
        (
            "contentType".to_string(),
            upload.content_type.clone().map(Value::from).unwrap_or(Value::Null),
        ),
    ]);
    let profile = state
        .parser
        .extract_profile_with_metadata(&text, &upload.file_name, metadata)
        .await;

    // Archive before saving: a failed request must not leave a stored profile.
    if let Some(archive) = &state.archive {
        archive
            .put(
                profile.id,
                &upload.file_name,
                upload.content_type.as_deref(),
                upload.data,
            )
            .await
            .map_err(|e| AppError::S3(e.to_string()))?;
    }

    state.store.save(&profile).await?;

    // The index is rebuilt from the store at startup, so a miss here is recoverable.
    if let Err(e) = state.index.store(&profile).await {
        warn!("Resume {} saved but not indexed: {e:#}", profile.id);
    }

    info!("Successfully parsed resume: {}", profile.id);
    Ok(Json(profile))
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<CandidateProfile>>, AppError> {
    Ok(Json(state.store.list().await?))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<CandidateProfile>, AppError> {
    Ok(Json(load_profile(&state, resume_id).await?))
}

/// POST /api/v1/resumes/:id/match
pub async fn handle_match(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(job): Json<JobPosting>,
) -> Result<Json<MatchResult>, AppError> {
    let profile = load_profile(&state, resume_id).await?;
    info!(
        "Matching resume {} with job {}",
        resume_id,
        job.title.as_deref().unwrap_or("<untitled>")
    );
    Ok(Json(state.matcher.score_match(&profile, &job).await))
}

/// POST /api/v1/resumes/:id/optimize-ats
pub async fn handle_optimize_ats(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<AtsOptimizationResult>, AppError> {
    let profile = load_profile(&state, resume_id).await?;
    Ok(Json(state.ats.optimize(&profile).await))
}

/// GET /api/v1/resumes/search?query=...&topK=5
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    if params.query.trim().is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }
    info!("Searching for resumes similar to: {}", params.query);

    let hits = state
        .index
        .query_similar(&params.query, params.top_k, state.search_similarity_threshold)
        .await?;
    Ok(Json(hits))
}

/// POST /api/v1/resumes/find-candidates
///
/// Looks up the stored profiles closest to a job posting.
pub async fn handle_find_candidates(
    State(state): State<AppState>,
    Json(job): Json<JobPosting>,
) -> Result<Json<Vec<CandidateHit>>, AppError> {
    info!(
        "Finding candidates for job: {}",
        job.title.as_deref().unwrap_or("<untitled>")
    );

    let hits = state
        .index
        .query_similar(
            &job.search_query(),
            CANDIDATE_TOP_K,
            state.candidate_similarity_threshold,
        )
        .await?;

    let candidates = hits
        .into_iter()
        .map(|hit| CandidateHit {
            resume_id: hit.metadata.get("resumeId").cloned().unwrap_or(Value::Null),
            candidate_name: hit
                .metadata
                .get("candidateName")
                .cloned()
                .unwrap_or(Value::Null),
            relevance_score: hit.score,
        })
        .collect();
    Ok(Json(candidates))
}

/// POST /api/v1/keywords
pub async fn handle_extract_keywords(
    State(state): State<AppState>,
    Json(request): Json<KeywordsRequest>,
) -> Result<Json<KeywordsResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    let keywords = state.parser.extract_keywords(&request.text).await;
    Ok(Json(KeywordsResponse { keywords }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn load_profile(state: &AppState, resume_id: Uuid) -> Result<CandidateProfile, AppError> {
    state
        .store
        .get(resume_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_owned)
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::Validation("file name cannot be empty".to_string()))?;
        let content_type = field.content_type().map(str::to_owned);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
        if data.is_empty() {
            return Err(AppError::Validation("uploaded file is empty".to_string()));
        }
        return Ok(Upload {
            file_name,
            content_type,
            data,
        });
    }
    Err(AppError::Validation("multipart field 'file' is required".to_string()))
}
