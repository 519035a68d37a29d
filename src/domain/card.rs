use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of generated set and card identifiers
const ID_LEN: usize = 16;

/// A single question/answer pair. Immutable for the duration of a study session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
  pub id: String,
  pub question: String,
  pub answer: String,
}

impl Card {
  pub fn new(id: impl Into<String>, question: impl Into<String>, answer: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      question: question.into(),
      answer: answer.into(),
    }
  }

  /// Card with a freshly generated id
  pub fn fresh(question: impl Into<String>, answer: impl Into<String>) -> Self {
    Self::new(generate_id(), question, answer)
  }
}

/// An ordered set of cards as loaded from the card store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashcardSet {
  pub id: String,
  pub name: String,
  pub created_at: DateTime<Utc>,
  pub cards: Vec<Card>,
}

/// Listing entry for a set (no cards)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetSummary {
  pub id: String,
  pub name: String,
  pub created_at: DateTime<Utc>,
  pub card_count: i64,
}

/// Generate a random lowercase alphanumeric identifier for a set or card
pub fn generate_id() -> String {
  random_token(ID_LEN)
}

/// Random lowercase alphanumeric string of `len` characters
pub fn random_token(len: usize) -> String {
  let mut rng = rand::rng();
  (0..len)
    .map(|_| {
      let idx = rng.random_range(0..36u8);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_generate_id_shape() {
    let id = generate_id();
    assert_eq!(id.len(), ID_LEN);
    assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
  }

  #[test]
  fn test_generate_id_unique() {
    assert_ne!(generate_id(), generate_id());
  }

  #[test]
  fn test_card_fresh_has_id() {
    let card = Card::fresh("Capital of France?", "Paris");
    assert_eq!(card.id.len(), ID_LEN);
    assert_eq!(card.question, "Capital of France?");
    assert_eq!(card.answer, "Paris");
  }

  #[test]
  fn test_card_serde_shape() {
    let card = Card::new("a", "q", "r");
    let json = serde_json::to_value(&card).unwrap();
    assert_eq!(json, serde_json::json!({"id": "a", "question": "q", "answer": "r"}));
  }
}
