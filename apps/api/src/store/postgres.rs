use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::profile::CandidateProfile;
use crate::store::ResumeStore;

/// Stores each profile as a JSONB document keyed by its id.
/// Profiles are immutable, so a second save of the same id is ignored.
pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    /// Connects to `database_url` and ensures the `resumes` table exists.
    pub async fn connect(database_url: &str) -> Result<Self> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS resumes (
                id         UUID PRIMARY KEY,
                profile    JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("Failed to create resumes table")?;

        info!("Resume store ready (postgres)");
        Ok(Self { pool })
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn save(&self, profile: &CandidateProfile) -> Result<()> {
        sqlx::query(
            "INSERT INTO resumes (id, profile, created_at) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(profile.id)
        .bind(Json(profile))
        .bind(profile.parsed_at)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to save resume {}", profile.id))?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<CandidateProfile>> {
        let row: Option<(Json<CandidateProfile>,)> =
            sqlx::query_as("SELECT profile FROM resumes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("Failed to load resume {id}"))?;
        Ok(row.map(|(Json(profile),)| profile))
    }

    async fn list(&self) -> Result<Vec<CandidateProfile>> {
        let rows: Vec<(Json<CandidateProfile>,)> =
            sqlx::query_as("SELECT profile FROM resumes ORDER BY created_at")
                .fetch_all(&self.pool)
                .await
                .context("Failed to list resumes")?;
        Ok(rows.into_iter().map(|(Json(profile),)| profile).collect())
    }
}
