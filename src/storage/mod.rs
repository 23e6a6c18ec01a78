//! Row storage.
//!
//! Everything the service reads or writes goes through the [`Store`] trait.
//! Two backends implement it:
//! - [`JsonlStore`]: a local data lake of normalized JSONL files
//! - [`PostgrestStore`]: the hosted relational database over its REST API

pub mod jsonl;
pub mod postgrest;
pub mod query;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::{AppConfig, StoreBackend};
use crate::models::{
    Appearance, Episode, EpisodeId, EpisodeRows, EpisodeSummary, Player, PlayerCareerStats,
    PlayerId, Team,
};

pub use jsonl::JsonlStore;
pub use postgrest::PostgrestStore;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Store misconfigured: {0}")]
    Misconfigured(String),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Directory holding the normalized JSONL tables.
    pub fn normalized_dir(&self) -> PathBuf {
        self.data_dir.join("normalized")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// Row counts shown on the overview and admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntityCounts {
    pub players: usize,
    pub episodes: usize,
    pub appearances: usize,
}

/// Read and write access to players, episodes and results.
///
/// Filtered reads have default implementations over the full tables;
/// backends override them when they can filter server-side.
#[async_trait]
pub trait Store: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    async fn players(&self) -> Result<Vec<Player>, StorageError>;

    async fn episodes(&self) -> Result<Vec<Episode>, StorageError>;

    async fn appearances(&self) -> Result<Vec<Appearance>, StorageError>;

    async fn teams(&self) -> Result<Vec<Team>, StorageError>;

    /// Rows of the `player_career_stats` view.
    async fn career_stats(&self) -> Result<Vec<PlayerCareerStats>, StorageError>;

    /// Rows of the `episode_summary` view.
    async fn episode_summaries(&self) -> Result<Vec<EpisodeSummary>, StorageError>;

    async fn player(&self, id: &PlayerId) -> Result<Option<Player>, StorageError> {
        Ok(self.players().await?.into_iter().find(|p| &p.id == id))
    }

    async fn player_by_slug(&self, slug: &str) -> Result<Option<Player>, StorageError> {
        Ok(self.players().await?.into_iter().find(|p| p.slug == slug))
    }

    async fn episode(&self, id: &EpisodeId) -> Result<Option<Episode>, StorageError> {
        Ok(self.episodes().await?.into_iter().find(|e| &e.id == id))
    }

    async fn episode_appearances(&self, episode_id: &EpisodeId) -> Result<Vec<Appearance>, StorageError> {
        Ok(self
            .appearances()
            .await?
            .into_iter()
            .filter(|a| &a.episode_id == episode_id)
            .collect())
    }

    async fn player_appearances(&self, player_id: &PlayerId) -> Result<Vec<Appearance>, StorageError> {
        Ok(self
            .appearances()
            .await?
            .into_iter()
            .filter(|a| &a.player_id == player_id)
            .collect())
    }

    async fn episode_teams(&self, episode_id: &EpisodeId) -> Result<Vec<Team>, StorageError> {
        Ok(self
            .teams()
            .await?
            .into_iter()
            .filter(|t| &t.episode_id == episode_id)
            .collect())
    }

    async fn counts(&self) -> Result<EntityCounts, StorageError> {
        let (players, episodes, appearances) =
            tokio::try_join!(self.players(), self.episodes(), self.appearances())?;
        Ok(EntityCounts {
            players: players.len(),
            episodes: episodes.len(),
            appearances: appearances.len(),
        })
    }

    async fn insert_player(&self, player: &Player) -> Result<Player, StorageError>;

    async fn update_player(&self, player: &Player) -> Result<Player, StorageError>;

    /// Fails with [`StorageError::Conflict`] while the player has appearances.
    async fn delete_player(&self, id: &PlayerId) -> Result<(), StorageError>;

    async fn insert_episode(&self, episode: &Episode) -> Result<Episode, StorageError>;

    async fn update_episode(&self, episode: &Episode) -> Result<Episode, StorageError>;

    /// Deletes the episode together with its appearances and teams.
    async fn delete_episode(&self, id: &EpisodeId) -> Result<(), StorageError>;

    /// Replace every appearance and team of an episode and record its
    /// final-round winner.
    async fn replace_results(&self, episode_id: &EpisodeId, rows: &EpisodeRows) -> Result<(), StorageError>;
}

/// Open the configured backend.
pub fn open_store(config: &AppConfig) -> Result<Arc<dyn Store>, StorageError> {
    let store: Arc<dyn Store> = match config.store.backend {
        StoreBackend::Jsonl => {
            Arc::new(JsonlStore::new(StorageConfig::new(config.data_dir.clone())))
        }
        StoreBackend::Postgrest => {
            let url = config
                .store
                .url
                .as_deref()
                .ok_or_else(|| StorageError::Misconfigured("store.url is not set".to_string()))?;
            let key = config
                .store
                .api_key
                .as_deref()
                .ok_or_else(|| StorageError::Misconfigured("store.api_key is not set".to_string()))?;
            Arc::new(PostgrestStore::new(url, key, config.store.timeout_seconds)?)
        }
    };
    info!("Using {} store", store.name());
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/data"));
        assert_eq!(config.normalized_dir(), PathBuf::from("/data/normalized"));
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn test_open_store() {
        let config = AppConfig::default();
        assert_eq!(open_store(&config).unwrap().name(), "jsonl");

        let mut config = AppConfig::default();
        config.store.backend = StoreBackend::Postgrest;
        assert!(matches!(
            open_store(&config).err(),
            Some(StorageError::Misconfigured(_))
        ));

        config.store.url = Some("https://xyz.supabase.co".to_string());
        config.store.api_key = Some("anon".to_string());
        assert_eq!(open_store(&config).unwrap().name(), "postgrest");
    }

    #[test]
    fn test_error_messages() {
        let err = StorageError::Status {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Store returned 503: unavailable");
        assert_eq!(
            StorageError::Conflict("player has appearances".to_string()).to_string(),
            "Conflict: player has appearances"
        );
    }
}
