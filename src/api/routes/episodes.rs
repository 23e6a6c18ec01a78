use std::collections::BTreeSet;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{ApiError, Pagination, PaginationMeta};
use crate::models::{EpisodeId, EpisodeSummary};
use crate::storage::query::{self, EpisodeDetail};

#[derive(Debug, Deserialize)]
pub struct EpisodeListParams {
    pub season: Option<u32>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct EpisodeListResponse {
    pub episodes: Vec<EpisodeSummary>,
    /// Every season on record, for the season filter
    pub seasons: Vec<u32>,
    pub pagination: PaginationMeta,
}

/// Episode summaries, newest first.
pub async fn list_episodes(
    State(state): State<AppState>,
    Query(params): Query<EpisodeListParams>,
) -> Result<Json<EpisodeListResponse>, ApiError> {
    let mut episodes = state.store.episode_summaries().await?;
    let seasons: BTreeSet<u32> = episodes.iter().filter_map(|e| e.season).collect();

    if let Some(season) = params.season {
        episodes.retain(|e| e.season == Some(season));
    }
    query::sort_summaries_newest_first(&mut episodes);

    let pagination = Pagination::new(params.page, params.page_size);
    let meta = PaginationMeta::new(&pagination, episodes.len() as u32);

    Ok(Json(EpisodeListResponse {
        episodes: pagination.apply(episodes),
        seasons: seasons.into_iter().collect(),
        pagination: meta,
    }))
}

pub async fn get_episode(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EpisodeDetail>, ApiError> {
    let id = EpisodeId::from(id);
    query::episode_detail(state.store.as_ref(), &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Episode {}", id)))
}
