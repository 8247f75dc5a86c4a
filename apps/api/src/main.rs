mod analysis;
mod archive;
mod config;
mod documents;
mod errors;
mod llm_client;
mod models;
mod routes;
mod search;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::archive::DocumentArchive;
use crate::config::Config;
use crate::llm_client::{LanguageModel, LlmClient};
use crate::routes::build_router;
use crate::search::{rebuild_index, InMemoryResumeIndex, ResumeIndex};
use crate::state::AppState;
use crate::store::postgres::PgResumeStore;
use crate::store::{InMemoryResumeStore, ResumeStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    // Profile store: PostgreSQL when configured, otherwise process memory
    let store: Arc<dyn ResumeStore> = match &config.database_url {
        Some(url) => {
            let store = PgResumeStore::connect(url).await?;
            info!("PostgreSQL profile store initialized");
            Arc::new(store)
        }
        None => {
            info!("DATABASE_URL not set, profiles are kept in memory");
            Arc::new(InMemoryResumeStore::default())
        }
    };

    let index: Arc<dyn ResumeIndex> = Arc::new(InMemoryResumeIndex::default());
    let indexed = rebuild_index(store.as_ref(), index.as_ref()).await?;
    info!("Search index built from {indexed} stored profiles");

    // Initialize S3 / MinIO
    let archive = match &config.s3 {
        Some(s3) => {
            let archive = DocumentArchive::connect(s3).await;
            info!("S3 document archive initialized (bucket: {})", s3.bucket);
            Some(archive)
        }
        None => None,
    };

    // Initialize LLM client
    let llm: Arc<dyn LanguageModel> = Arc::new(LlmClient::new(config.anthropic_api_key.clone()));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let state = AppState::new(&config, llm, store, index, archive);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
