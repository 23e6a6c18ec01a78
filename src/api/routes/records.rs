use axum::extract::State;
use axum::Json;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::records::Records;
use crate::storage::query;

pub async fn get_records(State(state): State<AppState>) -> Result<Json<Records>, ApiError> {
    Ok(Json(query::load_records(state.store.as_ref()).await?))
}
