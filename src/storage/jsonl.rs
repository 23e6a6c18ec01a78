//! JSONL (JSON Lines) storage.
//!
//! The local data lake keeps one JSONL file per table under
//! `<data_dir>/normalized/`. Each line is a valid JSON object representing
//! one row. Aggregate views are computed on read.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{EntityCounts, StorageConfig, StorageError, Store};
use crate::calculate::{career, summary};
use crate::models::{
    Appearance, Episode, EpisodeId, EpisodeRows, EpisodeSummary, Player, PlayerCareerStats,
    PlayerId, Team,
};

/// Tables stored as JSONL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Player,
    Episode,
    Appearance,
    Team,
}

impl EntityType {
    /// Get the filename for this entity type.
    pub fn filename(&self) -> &'static str {
        match self {
            EntityType::Player => "players.jsonl",
            EntityType::Episode => "episodes.jsonl",
            EntityType::Appearance => "appearances.jsonl",
            EntityType::Team => "teams.jsonl",
        }
    }
}

/// Get the path for an entity file.
pub fn entity_path(config: &StorageConfig, entity: EntityType) -> PathBuf {
    config.normalized_dir().join(entity.filename())
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    /// Create a new JSONL writer for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a writer for a specific entity type.
    pub fn for_entity(config: &StorageConfig, entity: EntityType) -> Self {
        Self::new(entity_path(config, entity))
    }

    /// Ensure the parent directory exists.
    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append a single entity to the file.
    pub fn append(&self, entity: &T) -> Result<(), StorageError> {
        self.ensure_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = BufWriter::new(file);
        let json = serde_json::to_string(entity)?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;

        debug!("Appended entity to {:?}", self.path);
        Ok(())
    }

    /// Write entities, replacing the entire file.
    ///
    /// Rows go to a sibling temp file first so a failed write never leaves a
    /// half-written table behind.
    pub fn write_all(&self, entities: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let tmp = self.path.with_extension("jsonl.tmp");
        let file = File::create(&tmp)?;
        let mut writer = BufWriter::new(file);
        let mut count = 0;

        for entity in entities {
            let json = serde_json::to_string(entity)?;
            writeln!(writer, "{}", json)?;
            count += 1;
        }

        writer.flush()?;
        drop(writer);
        fs::rename(&tmp, &self.path)?;
        info!("Wrote {} entities to {:?}", count, self.path);

        Ok(count)
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a reader for a specific entity type.
    pub fn for_entity(config: &StorageConfig, entity: EntityType) -> Self {
        Self::new(entity_path(config, entity))
    }

    /// Check if the file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all entities from the file. Unparseable lines are logged and
    /// skipped; a missing file reads as empty.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    warn!(
                        "Failed to parse line {} in {:?}: {}",
                        index + 1,
                        self.path,
                        e
                    );
                }
            }
        }

        debug!("Read {} entities from {:?}", entities.len(), self.path);
        Ok(entities)
    }

    /// Read entities matching a predicate.
    pub fn read_where<F>(&self, predicate: F) -> Result<Vec<T>, StorageError>
    where
        F: Fn(&T) -> bool,
    {
        let all = self.read_all()?;
        Ok(all.into_iter().filter(predicate).collect())
    }

    /// Count the rows that parse, matching what [`Self::read_all`] returns.
    pub fn count(&self) -> Result<usize, StorageError> {
        Ok(self.read_all()?.len())
    }
}

/// [`Store`] over the local JSONL data lake.
///
/// Reads go straight to disk. Writes rewrite whole tables and are
/// serialized behind a mutex.
pub struct JsonlStore {
    config: StorageConfig,
    write_lock: Mutex<()>,
}

impl JsonlStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn reader<T: DeserializeOwned>(&self, entity: EntityType) -> JsonlReader<T> {
        JsonlReader::for_entity(&self.config, entity)
    }

    fn writer<T: Serialize>(&self, entity: EntityType) -> JsonlWriter<T> {
        JsonlWriter::for_entity(&self.config, entity)
    }

    fn read_players(&self) -> Result<Vec<Player>, StorageError> {
        self.reader(EntityType::Player).read_all()
    }

    fn read_episodes(&self) -> Result<Vec<Episode>, StorageError> {
        self.reader(EntityType::Episode).read_all()
    }

    fn read_appearances(&self) -> Result<Vec<Appearance>, StorageError> {
        self.reader(EntityType::Appearance).read_all()
    }

    fn read_teams(&self) -> Result<Vec<Team>, StorageError> {
        self.reader(EntityType::Team).read_all()
    }
}

#[async_trait]
impl Store for JsonlStore {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    async fn players(&self) -> Result<Vec<Player>, StorageError> {
        self.read_players()
    }

    async fn episodes(&self) -> Result<Vec<Episode>, StorageError> {
        self.read_episodes()
    }

    async fn appearances(&self) -> Result<Vec<Appearance>, StorageError> {
        self.read_appearances()
    }

    async fn teams(&self) -> Result<Vec<Team>, StorageError> {
        self.read_teams()
    }

    async fn career_stats(&self) -> Result<Vec<PlayerCareerStats>, StorageError> {
        let players = self.read_players()?;
        let appearances = self.read_appearances()?;
        let episodes = self.read_episodes()?;
        Ok(career::career_table(&players, &appearances, &episodes))
    }

    async fn episode_summaries(&self) -> Result<Vec<EpisodeSummary>, StorageError> {
        let episodes = self.read_episodes()?;
        let appearances = self.read_appearances()?;
        let teams = self.read_teams()?;
        let players = self.read_players()?;
        Ok(summary::summary_table(&episodes, &appearances, &teams, &players))
    }

    async fn episode_appearances(&self, episode_id: &EpisodeId) -> Result<Vec<Appearance>, StorageError> {
        self.reader::<Appearance>(EntityType::Appearance)
            .read_where(|a| &a.episode_id == episode_id)
    }

    async fn player_appearances(&self, player_id: &PlayerId) -> Result<Vec<Appearance>, StorageError> {
        self.reader::<Appearance>(EntityType::Appearance)
            .read_where(|a| &a.player_id == player_id)
    }

    async fn episode_teams(&self, episode_id: &EpisodeId) -> Result<Vec<Team>, StorageError> {
        self.reader::<Team>(EntityType::Team)
            .read_where(|t| &t.episode_id == episode_id)
    }

    async fn counts(&self) -> Result<EntityCounts, StorageError> {
        Ok(EntityCounts {
            players: self.reader::<Player>(EntityType::Player).count()?,
            episodes: self.reader::<Episode>(EntityType::Episode).count()?,
            appearances: self.reader::<Appearance>(EntityType::Appearance).count()?,
        })
    }

    async fn insert_player(&self, player: &Player) -> Result<Player, StorageError> {
        let _guard = self.write_lock.lock().await;
        let players = self.read_players()?;
        if players.iter().any(|p| p.id == player.id) {
            return Err(StorageError::Conflict(format!("player {} already exists", player.id)));
        }
        if players.iter().any(|p| p.slug == player.slug) {
            return Err(StorageError::Conflict(format!("slug {} is taken", player.slug)));
        }
        self.writer::<Player>(EntityType::Player).append(player)?;
        info!("Created player {} ({})", player.name, player.id);
        Ok(player.clone())
    }

    async fn update_player(&self, player: &Player) -> Result<Player, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut players = self.read_players()?;
        if players.iter().any(|p| p.slug == player.slug && p.id != player.id) {
            return Err(StorageError::Conflict(format!("slug {} is taken", player.slug)));
        }
        let slot = players
            .iter_mut()
            .find(|p| p.id == player.id)
            .ok_or_else(|| StorageError::NotFound(format!("player {}", player.id)))?;
        *slot = player.clone();
        self.writer::<Player>(EntityType::Player).write_all(&players)?;
        info!("Updated player {}", player.id);
        Ok(player.clone())
    }

    async fn delete_player(&self, id: &PlayerId) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let appearances = self.read_appearances()?;
        let played = appearances.iter().filter(|a| &a.player_id == id).count();
        if played > 0 {
            return Err(StorageError::Conflict(format!(
                "player {} has {} appearances",
                id, played
            )));
        }
        let mut players = self.read_players()?;
        let before = players.len();
        players.retain(|p| &p.id != id);
        if players.len() == before {
            return Err(StorageError::NotFound(format!("player {}", id)));
        }
        self.writer::<Player>(EntityType::Player).write_all(&players)?;
        info!("Deleted player {}", id);
        Ok(())
    }

    async fn insert_episode(&self, episode: &Episode) -> Result<Episode, StorageError> {
        let _guard = self.write_lock.lock().await;
        if self.read_episodes()?.iter().any(|e| e.id == episode.id) {
            return Err(StorageError::Conflict(format!("episode {} already exists", episode.id)));
        }
        self.writer::<Episode>(EntityType::Episode).append(episode)?;
        info!("Created episode {} ({})", episode.title, episode.id);
        Ok(episode.clone())
    }

    async fn update_episode(&self, episode: &Episode) -> Result<Episode, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut episodes = self.read_episodes()?;
        let slot = episodes
            .iter_mut()
            .find(|e| e.id == episode.id)
            .ok_or_else(|| StorageError::NotFound(format!("episode {}", episode.id)))?;
        *slot = episode.clone();
        self.writer::<Episode>(EntityType::Episode).write_all(&episodes)?;
        info!("Updated episode {}", episode.id);
        Ok(episode.clone())
    }

    async fn delete_episode(&self, id: &EpisodeId) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut episodes = self.read_episodes()?;
        let before = episodes.len();
        episodes.retain(|e| &e.id != id);
        if episodes.len() == before {
            return Err(StorageError::NotFound(format!("episode {}", id)));
        }

        let mut appearances = self.read_appearances()?;
        appearances.retain(|a| &a.episode_id != id);
        let mut teams = self.read_teams()?;
        teams.retain(|t| &t.episode_id != id);

        self.writer::<Appearance>(EntityType::Appearance).write_all(&appearances)?;
        self.writer::<Team>(EntityType::Team).write_all(&teams)?;
        self.writer::<Episode>(EntityType::Episode).write_all(&episodes)?;
        info!("Deleted episode {} and its results", id);
        Ok(())
    }

    async fn replace_results(&self, episode_id: &EpisodeId, rows: &EpisodeRows) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut episodes = self.read_episodes()?;
        let episode = episodes
            .iter_mut()
            .find(|e| &e.id == episode_id)
            .ok_or_else(|| StorageError::NotFound(format!("episode {}", episode_id)))?;
        episode.final_round_winner_id = rows.final_round_winner_id.clone();
        episode.updated_at = Some(Utc::now());

        let mut appearances = self.read_appearances()?;
        appearances.retain(|a| &a.episode_id != episode_id);
        appearances.extend(rows.appearances.iter().cloned());

        let mut teams = self.read_teams()?;
        teams.retain(|t| &t.episode_id != episode_id);
        teams.extend(rows.teams.iter().cloned());

        self.writer::<Team>(EntityType::Team).write_all(&teams)?;
        self.writer::<Appearance>(EntityType::Appearance).write_all(&appearances)?;
        self.writer::<Episode>(EntityType::Episode).write_all(&episodes)?;
        info!(
            "Replaced results for episode {}: {} appearances, {} teams",
            episode_id,
            rows.appearances.len(),
            rows.teams.len()
        );
        Ok(())
    }
}
