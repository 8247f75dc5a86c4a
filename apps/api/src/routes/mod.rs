pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

/// Uploaded resumes can exceed axum's 2 MB default.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/resumes", get(handlers::handle_list_resumes))
        .route("/api/v1/resumes/upload", post(handlers::handle_upload))
        .route("/api/v1/resumes/search", get(handlers::handle_search))
        .route(
            "/api/v1/resumes/find-candidates",
            post(handlers::handle_find_candidates),
        )
        .route("/api/v1/resumes/:id", get(handlers::handle_get_resume))
        .route("/api/v1/resumes/:id/match", post(handlers::handle_match))
        .route(
            "/api/v1/resumes/:id/optimize-ats",
            post(handlers::handle_optimize_ats),
        )
        .route("/api/v1/keywords", post(handlers::handle_extract_keywords))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
