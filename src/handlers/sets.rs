//! Card set CRUD.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{ApiError, ApiResult};
use crate::db;
use crate::domain::{Card, FlashcardSet, SetSummary};
use crate::state::AppState;

/// Card as submitted by a client. A missing id means "new card".
#[derive(Debug, Deserialize)]
pub struct CardInput {
    #[serde(default)]
    pub id: Option<String>,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSetRequest {
    pub name: String,
    #[serde(default)]
    pub cards: Vec<CardInput>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceCardsRequest {
    pub cards: Vec<CardInput>,
}

pub(crate) fn validate_name(name: &str) -> ApiResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Set name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

fn validate_cards(inputs: Vec<CardInput>) -> ApiResult<Vec<Card>> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(i, input)| {
            let question = input.question.trim();
            let answer = input.answer.trim();
            if question.is_empty() || answer.is_empty() {
                return Err(ApiError::BadRequest(format!(
                    "Card {} needs both a question and an answer",
                    i + 1
                )));
            }
            Ok(Card::new(input.id.unwrap_or_default(), question, answer))
        })
        .collect()
}

/// GET /api/sets
pub async fn list_sets(State(state): State<AppState>) -> ApiResult<Json<Vec<SetSummary>>> {
    let conn = db::try_lock(&state.db)?;
    Ok(Json(db::list_sets(&conn)?))
}

/// POST /api/sets
pub async fn create_set(
    State(state): State<AppState>,
    Json(request): Json<CreateSetRequest>,
) -> ApiResult<(StatusCode, Json<FlashcardSet>)> {
    let name = validate_name(&request.name)?;
    let cards = validate_cards(request.cards)?;
    let conn = db::try_lock(&state.db)?;
    let set = db::create_set(&conn, &name, &cards)?;
    Ok((StatusCode::CREATED, Json(set)))
}

/// GET /api/sets/{id}
pub async fn get_set(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<FlashcardSet>> {
    let conn = db::try_lock(&state.db)?;
    db::get_set(&conn, &id)?
        .map(Json)
        .ok_or(ApiError::NotFound("Set"))
}

/// PUT /api/sets/{id}/cards
pub async fn replace_cards(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ReplaceCardsRequest>,
) -> ApiResult<Json<FlashcardSet>> {
    let cards = validate_cards(request.cards)?;
    let conn = db::try_lock(&state.db)?;
    db::replace_cards(&conn, &id, &cards)?
        .map(Json)
        .ok_or(ApiError::NotFound("Set"))
}

/// DELETE /api/sets/{id}
pub async fn delete_set(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let conn = db::try_lock(&state.db)?;
    if db::delete_set(&conn, &id)? {
        tracing::info!("Deleted set {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Set"))
    }
}
