//! AI-backed set generation and improvement.
//!
//! The database lock is never held across an assistant call: sets are read,
//! the lock released, the model awaited, and only then is the result written
//! back.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

use super::sets::validate_name;
use super::{ApiError, ApiResult};
use crate::ai::{cards_from_generated, merge_improvements, AiError, CardAssistant, Instruction};
use crate::config::{DEFAULT_GENERATE_COUNT, MAX_GENERATE_COUNT};
use crate::db;
use crate::domain::FlashcardSet;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub name: String,
    pub text: String,
    #[serde(default)]
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ImproveRequest {
    pub instruction: String,
    /// Restrict the rewrite to these cards; all cards when absent
    #[serde(default)]
    pub card_ids: Option<Vec<String>>,
}

fn assistant(state: &AppState) -> ApiResult<Arc<dyn CardAssistant>> {
    state.assistant.clone().ok_or(ApiError::Ai(AiError::NotConfigured))
}

/// POST /api/sets/generate
pub async fn generate_set(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<(StatusCode, Json<FlashcardSet>)> {
    let assistant = assistant(&state)?;
    let name = validate_name(&request.name)?;
    let text = request.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("Source text must not be empty".to_string()));
    }
    let count = request
        .count
        .unwrap_or(DEFAULT_GENERATE_COUNT)
        .clamp(1, MAX_GENERATE_COUNT);

    let generated = assistant.generate(text, count).await?;
    if generated.is_empty() {
        return Err(AiError::EmptyResult.into());
    }
    let cards = cards_from_generated(generated);

    let conn = db::try_lock(&state.db)?;
    let set = db::create_set(&conn, &name, &cards)?;
    tracing::debug!("Set {} generated from {} chars of text", set.id, text.len());
    Ok((StatusCode::CREATED, Json(set)))
}

/// POST /api/sets/{id}/improve
pub async fn improve_set(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ImproveRequest>,
) -> ApiResult<Json<FlashcardSet>> {
    let assistant = assistant(&state)?;
    let instruction = Instruction::parse(&request.instruction)?;

    let set = {
        let conn = db::try_lock(&state.db)?;
        db::get_set(&conn, &id)?.ok_or(ApiError::NotFound("Set"))?
    };

    let targets: Vec<_> = match &request.card_ids {
        Some(ids) => {
            let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
            set.cards
                .iter()
                .filter(|card| wanted.contains(card.id.as_str()))
                .cloned()
                .collect()
        }
        None => set.cards.clone(),
    };
    if targets.is_empty() && !instruction.adds_cards() {
        return Err(ApiError::BadRequest("No cards selected to improve".to_string()));
    }

    let results = assistant.improve(&targets, &instruction).await?;
    let target_ids: HashSet<&str> = targets.iter().map(|card| card.id.as_str()).collect();
    let results: Vec<_> = results
        .into_iter()
        .filter(|result| match result.id.as_deref() {
            Some(id) if !result.is_new => target_ids.contains(id),
            _ => true,
        })
        .collect();
    if results.is_empty() {
        tracing::warn!("Improvement of set {} produced no usable cards", id);
        return Err(AiError::EmptyResult.into());
    }

    let merged = merge_improvements(&set.cards, results);
    let conn = db::try_lock(&state.db)?;
    db::replace_cards(&conn, &id, &merged)?
        .map(Json)
        .ok_or(ApiError::NotFound("Set"))
}
