use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::compare::HeadToHead;
use crate::models::PlayerId;
use crate::storage::query;

#[derive(Debug, Deserialize)]
pub struct CompareParams {
    pub player1: Option<String>,
    pub player2: Option<String>,
}

fn required(value: Option<String>, name: &str) -> Result<PlayerId, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PlayerId::from)
        .ok_or_else(|| ApiError::BadRequest(format!("Missing {}", name)))
}

pub async fn compare_players(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> Result<Json<HeadToHead>, ApiError> {
    let player1 = required(params.player1, "player1")?;
    let player2 = required(params.player2, "player2")?;
    if player1 == player2 {
        return Err(ApiError::BadRequest("Pick two different players".to_string()));
    }

    query::compare_players(state.store.as_ref(), &player1, &player2)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Players {} and {}", player1, player2)))
}
