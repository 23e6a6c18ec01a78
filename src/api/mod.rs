//! REST API endpoints.
//!
//! Axum-based HTTP API serving player careers, episode results,
//! leaderboards and records, plus the token-guarded admin surface.

pub mod routes;
pub mod state;

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::entry::forms::FormErrors;
use crate::entry::ValidationErrors;
use crate::storage::StorageError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => ApiError::NotFound(what),
            StorageError::Conflict(what) => ApiError::Conflict(what),
            // The hosted store is unreachable or refused the call.
            StorageError::Http(_) | StorageError::Status { .. } => {
                ApiError::Unavailable(err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<FormErrors> for ApiError {
    fn from(err: FormErrors) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

/// Reject admin calls without the configured bearer token.
///
/// With no token configured the admin surface is switched off entirely.
pub fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Err(ApiError::Unavailable(
            "Admin is disabled: no admin token configured".to_string(),
        ));
    };

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    match presented {
        Some(token) if token == expected => Ok(()),
        Some(_) => {
            warn!("Rejected admin request with a wrong token");
            Err(ApiError::Unauthorized("Invalid admin token".to_string()))
        }
        None => Err(ApiError::Unauthorized("Missing bearer token".to_string())),
    }
}

/// Pagination parameters.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 50,
        }
    }
}

impl Pagination {
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(50).clamp(1, 100),
        }
    }

    /// Rows before this page. Saturates, so a huge page is just empty.
    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// The slice of `items` on this page.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.page_size as usize)
            .collect()
    }
}

/// Pagination metadata in responses.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(pagination: &Pagination, total_items: u32) -> Self {
        let total_pages = total_items.div_ceil(pagination.page_size);
        Self {
            page: pagination.page,
            page_size: pagination.page_size,
            total_items,
            total_pages,
            has_next: pagination.page < total_pages,
            has_prev: pagination.page > 1,
        }
    }
}

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = match origin.trim() {
        "*" | "" => AllowOrigin::from(Any),
        o => match HeaderValue::from_str(o) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!("Invalid CORS origin {:?}, allowing any", o);
                AllowOrigin::from(Any)
            }
        },
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Assemble the full API router.
pub fn build_router(state: AppState) -> Router {
    use routes::{admin, compare, episodes, leaderboards, overview, players, records, search};

    let cors = cors_layer(&state.cors_origin);

    Router::new()
        .route("/api/health", get(overview::health))
        .route("/api/overview", get(overview::overview))
        .route("/api/players", get(players::list_players))
        .route("/api/players/:slug", get(players::get_player))
        .route("/api/episodes", get(episodes::list_episodes))
        .route("/api/episodes/:id", get(episodes::get_episode))
        .route("/api/leaderboards", get(leaderboards::get_leaderboard))
        .route("/api/records", get(records::get_records))
        .route("/api/compare", get(compare::compare_players))
        .route("/api/search", get(search::search))
        .route("/api/admin/dashboard", get(admin::dashboard))
        .route("/api/admin/players", post(admin::create_player))
        .route(
            "/api/admin/players/:id",
            put(admin::update_player).delete(admin::delete_player),
        )
        .route("/api/admin/episodes", post(admin::create_episode))
        .route(
            "/api/admin/episodes/:id",
            put(admin::update_episode).delete(admin::delete_episode),
        )
        .route(
            "/api/admin/episodes/:id/results",
            get(admin::get_results).put(admin::put_results),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
