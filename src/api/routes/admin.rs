//! Token-guarded editing of players, episodes and results.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::api::state::AppState;
use crate::api::{require_admin, ApiError};
use crate::calculate::standings::{rank_results, RankedResults};
use crate::entry::forms::{EpisodeForm, PlayerForm};
use crate::entry::{load_form, plan_results, ResultsForm};
use crate::models::{Episode, EpisodeId, EpisodeResults, EpisodeSummary, Player, PlayerId};
use crate::storage::query::{self, sort_summaries_newest_first, RECENT_EPISODES_LIMIT};
use crate::storage::EntityCounts;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub counts: EntityCounts,
    pub recent_episodes: Vec<EpisodeSummary>,
}

pub async fn dashboard(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, ApiError> {
    require_admin(&state, &headers)?;

    let (counts, mut recent_episodes) =
        tokio::try_join!(state.store.counts(), state.store.episode_summaries())?;
    sort_summaries_newest_first(&mut recent_episodes);
    recent_episodes.truncate(RECENT_EPISODES_LIMIT);

    Ok(Json(DashboardResponse {
        counts,
        recent_episodes,
    }))
}

// ── Players ─────────────────────────────────────────────────────

pub async fn create_player(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(form): Json<PlayerForm>,
) -> Result<(StatusCode, Json<Player>), ApiError> {
    require_admin(&state, &headers)?;

    let existing = state.store.players().await?;
    let player = form.to_player(existing.iter().map(|p| p.slug.as_str()))?;
    let created = state.store.insert_player(&player).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_player(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<PlayerForm>,
) -> Result<Json<Player>, ApiError> {
    require_admin(&state, &headers)?;

    let id = PlayerId::from(id);
    let mut player = state
        .store
        .player(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Player {}", id)))?;
    form.apply_to(&mut player)?;
    Ok(Json(state.store.update_player(&player).await?))
}

pub async fn delete_player(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, &headers)?;
    state.store.delete_player(&PlayerId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Episodes ────────────────────────────────────────────────────

async fn find_episode(state: &AppState, id: &EpisodeId) -> Result<Episode, ApiError> {
    state
        .store
        .episode(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Episode {}", id)))
}

pub async fn create_episode(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(form): Json<EpisodeForm>,
) -> Result<(StatusCode, Json<Episode>), ApiError> {
    require_admin(&state, &headers)?;

    let episode = form.to_episode()?;
    let created = state.store.insert_episode(&episode).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Edit episode details. The format can only change while no results are
/// recorded, since stored rows are shaped by it.
pub async fn update_episode(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<EpisodeForm>,
) -> Result<Json<Episode>, ApiError> {
    require_admin(&state, &headers)?;

    let id = EpisodeId::from(id);
    let mut episode = find_episode(&state, &id).await?;
    if form.episode_type != episode.episode_type
        && !state.store.episode_appearances(&id).await?.is_empty()
    {
        return Err(ApiError::Conflict(format!(
            "Episode {} has {} results; clear them before changing the format",
            id, episode.episode_type
        )));
    }
    form.apply_to(&mut episode)?;
    Ok(Json(state.store.update_episode(&episode).await?))
}

pub async fn delete_episode(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, &headers)?;
    state.store.delete_episode(&EpisodeId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Results ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ResultsFormResponse {
    pub episode: Episode,
    pub form: ResultsForm,
}

/// Stored results as an editable form, or a blank one for a new episode.
pub async fn get_results(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResultsFormResponse>, ApiError> {
    require_admin(&state, &headers)?;

    let episode = find_episode(&state, &EpisodeId::from(id)).await?;
    let results = query::episode_results(state.store.as_ref(), &episode).await?;
    let form = if results.is_empty() {
        ResultsForm::blank(episode.episode_type)
    } else {
        load_form(&results)
    };
    Ok(Json(ResultsFormResponse { episode, form }))
}

fn form_players(form: &ResultsForm) -> Vec<&PlayerId> {
    match form {
        ResultsForm::Solo(rows) => rows.iter().filter_map(|r| r.player_id.as_ref()).collect(),
        ResultsForm::Team(teams) => teams
            .iter()
            .flat_map(|t| t.members.iter().filter_map(|m| m.player_id.as_ref()))
            .collect(),
    }
}

/// Validate and save an episode's results, replacing whatever was there.
pub async fn put_results(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<ResultsForm>,
) -> Result<Json<RankedResults>, ApiError> {
    require_admin(&state, &headers)?;

    let episode = find_episode(&state, &EpisodeId::from(id)).await?;
    let rows = plan_results(&episode, &form)?;

    let players = state.store.players().await?;
    if let Some(unknown) = form_players(&form)
        .into_iter()
        .find(|id| !players.iter().any(|p| &p.id == *id))
    {
        return Err(ApiError::BadRequest(format!("Unknown player {}", unknown)));
    }

    state.store.replace_results(&episode.id, &rows).await?;
    info!(
        "Saved {} results for episode {}",
        episode.episode_type, episode.id
    );

    let results = EpisodeResults::from_rows(episode.episode_type, rows.appearances, rows.teams);
    Ok(Json(rank_results(&results)))
}
