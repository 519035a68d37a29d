//! Study session endpoints.
//!
//! A session lives in memory for the length of one study visit. Answer and
//! skip open a feedback pause; the handler waits it out with the session
//! unlocked, then closes it, so concurrent requests observe the
//! `transitioning` state and are ignored rather than racing. The wait runs
//! on its own task and always finishes, even when the request is dropped.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResult};
use crate::db;
use crate::domain::Outcome;
use crate::state::AppState;
use crate::study::{ActionStatus, SessionSummary, StudyController, StudyView};

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub view: StudyView,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub status: ActionStatus,
    /// Outcome recorded by an answer or skip
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded: Option<Outcome>,
    pub view: StudyView,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub correct: bool,
}

const SESSION: &str = "Study session";

/// POST /api/sets/{id}/study
pub async fn start_session(
    State(state): State<AppState>,
    Path(set_id): Path<String>,
) -> ApiResult<(StatusCode, Json<StartSessionResponse>)> {
    let set = {
        let conn = db::try_lock(&state.db)?;
        db::get_set(&conn, &set_id)?.ok_or(ApiError::NotFound("Set"))?
    };
    let controller = StudyController::start(state.engine.clone(), &set)?;
    let view = controller.view();
    let session_id = state.sessions.insert(controller);
    Ok((StatusCode::CREATED, Json(StartSessionResponse { session_id, view })))
}

/// GET /api/study/{session_id}
pub async fn get_view(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<StudyView>> {
    state
        .sessions
        .with_session(&session_id, |c| c.view())
        .map(Json)
        .ok_or(ApiError::NotFound(SESSION))
}

/// GET /api/study/{session_id}/summary
pub async fn get_summary(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SessionSummary>> {
    state
        .sessions
        .with_session(&session_id, |c| c.summary())
        .map(Json)
        .ok_or(ApiError::NotFound(SESSION))
}

/// DELETE /api/study/{session_id}
pub async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.sessions.remove(&session_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(SESSION))
    }
}

/// POST /api/study/{session_id}/{action}
pub async fn perform_action(
    State(state): State<AppState>,
    Path((session_id, action)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<ActionResponse>> {
    let outcome = match action.as_str() {
        "answer" => {
            let request: AnswerRequest = serde_json::from_slice(&body).map_err(|e| {
                ApiError::BadRequest(format!("answer requires a JSON body with `correct`: {}", e))
            })?;
            Some(Outcome::from_answer(request.correct))
        }
        "skip" => Some(Outcome::Skip),
        _ => None,
    };

    if let Some(outcome) = outcome {
        return record_with_feedback(&state, &session_id, outcome).await;
    }

    let (status, view) = state
        .sessions
        .with_session(&session_id, |c| {
            let status = match action.as_str() {
                "show-answer" => Some(c.show_answer()),
                "previous" => Some(c.previous()),
                "shuffle" => Some(c.shuffle_remaining(&mut rand::rng())),
                "reset-order" => Some(c.reset_remaining_to_original()),
                "review-round" => Some(c.start_review_round()),
                "missed-round" => Some(c.start_missed_cards_round()),
                "restart" => Some(c.restart_session()),
                _ => None,
            };
            status.map(|status| (status, c.view()))
        })
        .ok_or(ApiError::NotFound(SESSION))?
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown study action '{}'", action)))?;

    Ok(Json(ActionResponse {
        status,
        recorded: None,
        view,
    }))
}

async fn record_with_feedback(
    state: &AppState,
    session_id: &str,
    outcome: Outcome,
) -> ApiResult<Json<ActionResponse>> {
    let status = state
        .sessions
        .with_session(session_id, |c| match outcome {
            Outcome::Skip => c.skip(),
            other => c.answer(other == Outcome::Correct),
        })
        .ok_or(ApiError::NotFound(SESSION))?;

    if status != ActionStatus::Pending {
        let view = state
            .sessions
            .with_session(session_id, |c| c.view())
            .ok_or(ApiError::NotFound(SESSION))?;
        return Ok(Json(ActionResponse {
            status,
            recorded: None,
            view,
        }));
    }

    // The pause runs detached so it still closes if the client goes away
    let sessions = state.sessions.clone();
    let delay = state.feedback_delay;
    let id = session_id.to_string();
    let pause = tokio::spawn(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        sessions.with_session(&id, |c| (c.finish_transition(), c.view()))
    });

    let (status, view) = pause.await?.ok_or(ApiError::NotFound(SESSION))?;
    tracing::debug!("Session {} recorded {}", session_id, outcome.as_str());

    Ok(Json(ActionResponse {
        status,
        recorded: Some(outcome),
        view,
    }))
}
