use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{ApiError, Pagination, PaginationMeta};
use crate::models::PlayerCareerStats;
use crate::storage::query::{self, PlayerProfile};

#[derive(Debug, Deserialize)]
pub struct PlayerListParams {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PlayerListResponse {
    pub players: Vec<PlayerCareerStats>,
    pub pagination: PaginationMeta,
}

/// Career stats for every player in name order, optionally filtered by name.
pub async fn list_players(
    State(state): State<AppState>,
    Query(params): Query<PlayerListParams>,
) -> Result<Json<PlayerListResponse>, ApiError> {
    let mut players = state.store.career_stats().await?;

    if let Some(search) = params.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let needle = search.to_lowercase();
        players.retain(|p| p.name.to_lowercase().contains(&needle));
    }
    players.sort_by(|a, b| a.name.cmp(&b.name));

    let pagination = Pagination::new(params.page, params.page_size);
    let meta = PaginationMeta::new(&pagination, players.len() as u32);

    Ok(Json(PlayerListResponse {
        players: pagination.apply(players),
        pagination: meta,
    }))
}

pub async fn get_player(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PlayerProfile>, ApiError> {
    query::player_profile(state.store.as_ref(), &slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Player {}", slug)))
}
