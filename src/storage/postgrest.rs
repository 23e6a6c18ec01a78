//! Hosted database over its PostgREST API.
//!
//! Tables and views are exposed at `<url>/rest/v1/<table>`. Every request
//! carries the project API key both as `apikey` and as a bearer token.
//! Filters use PostgREST syntax (`episode_id=eq.<id>`). Nothing is retried;
//! failures surface to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use tracing::{debug, info};

use super::{StorageError, Store};
use crate::models::{
    Appearance, Episode, EpisodeId, EpisodeRows, EpisodeSummary, Player, PlayerCareerStats,
    PlayerId, Team,
};

pub const PLAYERS: &str = "players";
pub const EPISODES: &str = "episodes";
pub const APPEARANCES: &str = "episode_appearances";
pub const TEAMS: &str = "episode_teams";
pub const CAREER_STATS_VIEW: &str = "player_career_stats";
pub const EPISODE_SUMMARY_VIEW: &str = "episode_summary";

/// `eq.<value>` filter operand.
pub fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

/// Map a non-success response to an error.
pub fn status_error(status: StatusCode, body: String) -> StorageError {
    match status {
        StatusCode::NOT_FOUND => StorageError::NotFound(body),
        StatusCode::CONFLICT => StorageError::Conflict(body),
        _ => StorageError::Status {
            status: status.as_u16(),
            message: body,
        },
    }
}

/// [`Store`] backed by a PostgREST endpoint.
pub struct PostgrestStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PostgrestStore {
    pub fn new(base_url: &str, api_key: &str, timeout_seconds: u64) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check(response: Response) -> Result<Response, StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, body))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, StorageError> {
        debug!("GET {} {:?}", table, filters);
        let response = self
            .request(Method::GET, table)
            .query(&[("select", "*")])
            .query(filters)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn insert<T: Serialize + Sync, R: DeserializeOwned>(
        &self,
        table: &str,
        rows: &[T],
    ) -> Result<Vec<R>, StorageError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(rows)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn patch<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        body: &B,
    ) -> Result<Vec<R>, StorageError> {
        let response = self
            .request(Method::PATCH, table)
            .header("Prefer", "return=representation")
            .query(filters)
            .json(body)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Delete matching rows, returning how many went.
    async fn delete(&self, table: &str, filters: &[(&str, String)]) -> Result<usize, StorageError> {
        let response = self
            .request(Method::DELETE, table)
            .header("Prefer", "return=representation")
            .query(filters)
            .send()
            .await?;
        let deleted: Vec<serde_json::Value> = Self::check(response).await?.json().await?;
        Ok(deleted.len())
    }

    fn single<T>(rows: Vec<T>, what: String) -> Result<T, StorageError> {
        rows.into_iter().next().ok_or(StorageError::NotFound(what))
    }
}

#[async_trait]
impl Store for PostgrestStore {
    fn name(&self) -> &'static str {
        "postgrest"
    }

    async fn players(&self) -> Result<Vec<Player>, StorageError> {
        self.select(PLAYERS, &[("order", "name.asc".to_string())]).await
    }

    async fn episodes(&self) -> Result<Vec<Episode>, StorageError> {
        self.select(EPISODES, &[("order", "air_date.desc".to_string())]).await
    }

    async fn appearances(&self) -> Result<Vec<Appearance>, StorageError> {
        self.select(APPEARANCES, &[]).await
    }

    async fn teams(&self) -> Result<Vec<Team>, StorageError> {
        self.select(TEAMS, &[]).await
    }

    async fn career_stats(&self) -> Result<Vec<PlayerCareerStats>, StorageError> {
        self.select(CAREER_STATS_VIEW, &[]).await
    }

    async fn episode_summaries(&self) -> Result<Vec<EpisodeSummary>, StorageError> {
        self.select(EPISODE_SUMMARY_VIEW, &[]).await
    }

    async fn player(&self, id: &PlayerId) -> Result<Option<Player>, StorageError> {
        let rows: Vec<Player> = self.select(PLAYERS, &[("id", eq(id))]).await?;
        Ok(rows.into_iter().next())
    }

    async fn player_by_slug(&self, slug: &str) -> Result<Option<Player>, StorageError> {
        let rows: Vec<Player> = self.select(PLAYERS, &[("slug", eq(slug))]).await?;
        Ok(rows.into_iter().next())
    }

    async fn episode(&self, id: &EpisodeId) -> Result<Option<Episode>, StorageError> {
        let rows: Vec<Episode> = self.select(EPISODES, &[("id", eq(id))]).await?;
        Ok(rows.into_iter().next())
    }

    async fn episode_appearances(&self, episode_id: &EpisodeId) -> Result<Vec<Appearance>, StorageError> {
        self.select(APPEARANCES, &[("episode_id", eq(episode_id))]).await
    }

    async fn player_appearances(&self, player_id: &PlayerId) -> Result<Vec<Appearance>, StorageError> {
        self.select(APPEARANCES, &[("player_id", eq(player_id))]).await
    }

    async fn episode_teams(&self, episode_id: &EpisodeId) -> Result<Vec<Team>, StorageError> {
        self.select(TEAMS, &[("episode_id", eq(episode_id))]).await
    }

    async fn insert_player(&self, player: &Player) -> Result<Player, StorageError> {
        let rows = self.insert(PLAYERS, std::slice::from_ref(player)).await?;
        info!("Created player {} ({})", player.name, player.id);
        Self::single(rows, format!("player {}", player.id))
    }

    async fn update_player(&self, player: &Player) -> Result<Player, StorageError> {
        let rows = self.patch(PLAYERS, &[("id", eq(&player.id))], player).await?;
        info!("Updated player {}", player.id);
        Self::single(rows, format!("player {}", player.id))
    }

    async fn delete_player(&self, id: &PlayerId) -> Result<(), StorageError> {
        let played: Vec<Appearance> = self.select(APPEARANCES, &[("player_id", eq(id))]).await?;
        if !played.is_empty() {
            return Err(StorageError::Conflict(format!(
                "player {} has {} appearances",
                id,
                played.len()
            )));
        }
        if self.delete(PLAYERS, &[("id", eq(id))]).await? == 0 {
            return Err(StorageError::NotFound(format!("player {}", id)));
        }
        info!("Deleted player {}", id);
        Ok(())
    }

    async fn insert_episode(&self, episode: &Episode) -> Result<Episode, StorageError> {
        let rows = self.insert(EPISODES, std::slice::from_ref(episode)).await?;
        info!("Created episode {} ({})", episode.title, episode.id);
        Self::single(rows, format!("episode {}", episode.id))
    }

    async fn update_episode(&self, episode: &Episode) -> Result<Episode, StorageError> {
        let rows = self.patch(EPISODES, &[("id", eq(&episode.id))], episode).await?;
        info!("Updated episode {}", episode.id);
        Self::single(rows, format!("episode {}", episode.id))
    }

    async fn delete_episode(&self, id: &EpisodeId) -> Result<(), StorageError> {
        self.delete(APPEARANCES, &[("episode_id", eq(id))]).await?;
        self.delete(TEAMS, &[("episode_id", eq(id))]).await?;
        if self.delete(EPISODES, &[("id", eq(id))]).await? == 0 {
            return Err(StorageError::NotFound(format!("episode {}", id)));
        }
        info!("Deleted episode {} and its results", id);
        Ok(())
    }

    async fn replace_results(&self, episode_id: &EpisodeId, rows: &EpisodeRows) -> Result<(), StorageError> {
        // Appearances reference teams, so they go first on delete and last on insert.
        self.delete(APPEARANCES, &[("episode_id", eq(episode_id))]).await?;
        self.delete(TEAMS, &[("episode_id", eq(episode_id))]).await?;
        let _: Vec<Team> = self.insert(TEAMS, &rows.teams).await?;
        let _: Vec<Appearance> = self.insert(APPEARANCES, &rows.appearances).await?;

        let updated: Vec<Episode> = self
            .patch(
                EPISODES,
                &[("id", eq(episode_id))],
                &json!({ "final_beopardy_winner_id": rows.final_round_winner_id }),
            )
            .await?;
        if updated.is_empty() {
            return Err(StorageError::NotFound(format!("episode {}", episode_id)));
        }
        info!(
            "Replaced results for episode {}: {} appearances, {} teams",
            episode_id,
            rows.appearances.len(),
            rows.teams.len()
        );
        Ok(())
    }
}
