//! JSON HTTP surface over the card store, the AI assistant and live study
//! sessions.

pub mod ai;
pub mod sets;
pub mod study;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use thiserror::Error;
use tower_http::trace::TraceLayer;

use crate::ai::AiError;
use crate::db::DbLockError;
use crate::state::AppState;
use crate::study::StudyError;

/// Errors a handler can return. Each maps to one status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Study(#[from] StudyError),
    #[error(transparent)]
    Ai(#[from] AiError),
    #[error(transparent)]
    Lock(#[from] DbLockError),
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("Feedback pause failed: {0}")]
    Pause(#[from] tokio::task::JoinError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Study(_) => StatusCode::BAD_REQUEST,
            ApiError::Ai(AiError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Ai(AiError::MalformedInstruction(_)) => StatusCode::BAD_REQUEST,
            ApiError::Ai(_) => StatusCode::BAD_GATEWAY,
            ApiError::Lock(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Db(_) | ApiError::Pause(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Db(e) => {
                tracing::error!("Database error: {}", e);
                "Database error".to_string()
            }
            ApiError::Pause(e) => {
                tracing::error!("Feedback pause task failed: {}", e);
                "Internal error".to_string()
            }
            ApiError::Ai(e) if status == StatusCode::BAD_GATEWAY => {
                tracing::warn!("AI request failed: {}", e);
                e.to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/sets", get(sets::list_sets).post(sets::create_set))
        .route("/api/sets/generate", post(ai::generate_set))
        .route("/api/sets/{id}", get(sets::get_set).delete(sets::delete_set))
        .route("/api/sets/{id}/cards", put(sets::replace_cards))
        .route("/api/sets/{id}/improve", post(ai::improve_set))
        .route("/api/sets/{id}/study", post(study::start_session))
        .route("/api/study/{session_id}", get(study::get_view).delete(study::end_session))
        .route("/api/study/{session_id}/summary", get(study::get_summary))
        .route("/api/study/{session_id}/{action}", post(study::perform_action))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
