//! AI-assisted card generation and improvement.
//!
//! The study engine never calls into this module. Set editing uses it to turn
//! text into cards and to rewrite existing cards from an instruction keyword.
//! Model output is untrusted: parsing degrades to an empty list instead of
//! failing, and an empty result never touches the stored set.

pub mod client;
pub mod instruction;
pub mod merge;
pub mod parse;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Card;

pub use client::ChatCompletionsAssistant;
pub use instruction::Instruction;
pub use merge::{cards_from_generated, merge_improvements};
pub use parse::parse_card_list;

/// A question/answer pair proposed by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCard {
  pub question: String,
  pub answer: String,
  /// Id of the existing card this revises, if any
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default, rename = "isNew")]
  pub is_new: bool,
}

#[derive(Debug, Error)]
pub enum AiError {
  #[error("AI assistant is not configured")]
  NotConfigured,
  #[error("Malformed instruction: {0}")]
  MalformedInstruction(String),
  #[error("AI request failed: {0}")]
  Request(#[from] reqwest::Error),
  #[error("AI service returned status {0}: {1}")]
  Status(u16, String),
  #[error("AI returned no usable cards")]
  EmptyResult,
}

#[async_trait]
pub trait CardAssistant: Send + Sync {
  /// Propose up to `count` new cards from free text
  async fn generate(&self, text: &str, count: usize) -> Result<Vec<GeneratedCard>, AiError>;

  /// Revise `cards` according to `instruction`
  async fn improve(
    &self,
    cards: &[Card],
    instruction: &Instruction,
  ) -> Result<Vec<GeneratedCard>, AiError>;
}
