//! Profile persistence. Analysis stages never touch storage; only the HTTP
//! layer reads and writes profiles through `ResumeStore`.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::profile::CandidateProfile;

pub mod postgres;

#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn save(&self, profile: &CandidateProfile) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<CandidateProfile>>;
    /// All profiles, oldest first.
    async fn list(&self) -> Result<Vec<CandidateProfile>>;
}

/// Process-local store used when no database is configured.
#[derive(Default)]
pub struct InMemoryResumeStore {
    profiles: RwLock<HashMap<Uuid, CandidateProfile>>,
}

#[async_trait]
impl ResumeStore for InMemoryResumeStore {
    async fn save(&self, profile: &CandidateProfile) -> Result<()> {
        self.profiles
            .write()
            .await
            .insert(profile.id, profile.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<CandidateProfile>> {
        Ok(self.profiles.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<CandidateProfile>> {
        let mut profiles: Vec<_> = self.profiles.read().await.values().cloned().collect();
        profiles.sort_by_key(|p| p.parsed_at);
        Ok(profiles)
    }
}
