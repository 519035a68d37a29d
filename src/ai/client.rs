//! OpenAI-compatible chat-completions backend for [`CardAssistant`].

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{parse_card_list, AiError, CardAssistant, GeneratedCard, Instruction};
use crate::config::AiConfig;
use crate::domain::Card;

/// Longest error body echoed back from the service
const MAX_ERROR_BODY: usize = 300;

const SYSTEM_PROMPT: &str = "You write study flashcards. Reply with a JSON array only. \
Each element is an object with \"question\" and \"answer\" strings, plus \"id\" when revising an \
existing card and \"isNew\": true for cards you add.";

#[derive(Debug, Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
  message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
  #[serde(default)]
  content: Option<String>,
}

pub struct ChatCompletionsAssistant {
  http: reqwest::Client,
  base_url: String,
  model: String,
  api_key: String,
}

impl ChatCompletionsAssistant {
  pub fn new(config: &AiConfig) -> Result<Self, AiError> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self {
      http,
      base_url: config.base_url.trim_end_matches('/').to_string(),
      model: config.model.clone(),
      api_key: config.api_key.clone(),
    })
  }

  async fn complete(&self, user_prompt: String) -> Result<String, AiError> {
    let body = json!({
      "model": self.model,
      "temperature": 0.4,
      "messages": [
        { "role": "system", "content": SYSTEM_PROMPT },
        { "role": "user", "content": user_prompt },
      ],
    });

    let response = self
      .http
      .post(format!("{}/chat/completions", self.base_url))
      .bearer_auth(&self.api_key)
      .json(&body)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let text = truncate_body(response.text().await.unwrap_or_default());
      tracing::warn!("AI service returned {}: {}", status, text);
      return Err(AiError::Status(status.as_u16(), text));
    }

    let payload: ChatResponse = response.json().await?;
    Ok(
      payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default(),
    )
  }
}

fn truncate_body(mut text: String) -> String {
  let cut = (0..=MAX_ERROR_BODY.min(text.len()))
    .rev()
    .find(|i| text.is_char_boundary(*i))
    .unwrap_or(0);
  text.truncate(cut);
  text
}

pub(crate) fn generate_prompt(text: &str, count: usize) -> String {
  format!(
    "Write up to {} flashcards covering the key facts in the material below.\n\nMaterial:\n{}",
    count, text
  )
}

pub(crate) fn improve_prompt(cards: &[Card], instruction: &Instruction) -> String {
  let listed: Vec<_> = cards
    .iter()
    .map(|card| json!({ "id": card.id, "question": card.question, "answer": card.answer }))
    .collect();
  let scope = if instruction.adds_cards() {
    "Return only the new cards."
  } else {
    "Return every card you changed, keeping its id."
  };
  format!(
    "{}\n{}\n\nCards:\n{}",
    instruction.prompt(),
    scope,
    serde_json::Value::Array(listed)
  )
}

#[async_trait]
impl CardAssistant for ChatCompletionsAssistant {
  async fn generate(&self, text: &str, count: usize) -> Result<Vec<GeneratedCard>, AiError> {
    let raw = self.complete(generate_prompt(text, count)).await?;
    let mut cards = parse_card_list(&raw);
    cards.truncate(count);
    Ok(cards)
  }

  async fn improve(
    &self,
    cards: &[Card],
    instruction: &Instruction,
  ) -> Result<Vec<GeneratedCard>, AiError> {
    let raw = self.complete(improve_prompt(cards, instruction)).await?;
    Ok(parse_card_list(&raw))
  }
}
