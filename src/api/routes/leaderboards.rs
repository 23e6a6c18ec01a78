use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::leaderboard::{leaderboard, LeaderboardCategory, LeaderboardEntry};

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub category: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub category: LeaderboardCategory,
    pub label: &'static str,
    pub min_appearances: u32,
    pub entries: Vec<LeaderboardEntry>,
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let category = match params.category.as_deref() {
        Some(c) => c.parse::<LeaderboardCategory>().map_err(ApiError::BadRequest)?,
        None => LeaderboardCategory::default(),
    };
    let stats = state.store.career_stats().await?;

    Ok(Json(LeaderboardResponse {
        category,
        label: category.label(),
        min_appearances: category.min_appearances(),
        entries: leaderboard(&stats, category, params.limit),
    }))
}
