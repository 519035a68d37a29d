use serde::{Deserialize, Serialize};

/// Result recorded for a single card in a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
  Correct,
  Incorrect,
  Skip,
}

impl Outcome {
  pub fn from_answer(correct: bool) -> Self {
    if correct {
      Self::Correct
    } else {
      Self::Incorrect
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Correct => "correct",
      Self::Incorrect => "incorrect",
      Self::Skip => "skip",
    }
  }

  /// Incorrect and skipped cards both feed the missed-card lists
  pub fn is_miss(&self) -> bool {
    matches!(self, Self::Incorrect | Self::Skip)
  }

  /// Skips are not counted as studied
  pub fn counts_as_studied(&self) -> bool {
    matches!(self, Self::Correct | Self::Incorrect)
  }
}

/// Why a round exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundType {
  /// First pass over a freshly loaded set, or a full restart
  Initial,
  /// Cards missed in the immediately preceding round
  Review,
  /// Every card still missed anywhere in the session
  Missed,
}

impl RoundType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Initial => "initial",
      Self::Review => "review",
      Self::Missed => "missed",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_outcome_from_answer() {
    assert_eq!(Outcome::from_answer(true), Outcome::Correct);
    assert_eq!(Outcome::from_answer(false), Outcome::Incorrect);
  }

  #[test]
  fn test_outcome_is_miss() {
    assert!(!Outcome::Correct.is_miss());
    assert!(Outcome::Incorrect.is_miss());
    assert!(Outcome::Skip.is_miss());
  }

  #[test]
  fn test_skip_not_studied() {
    assert!(Outcome::Correct.counts_as_studied());
    assert!(Outcome::Incorrect.counts_as_studied());
    assert!(!Outcome::Skip.counts_as_studied());
  }

  #[test]
  fn test_outcome_serde() {
    let skip: Outcome = serde_json::from_str("\"skip\"").unwrap();
    assert_eq!(skip, Outcome::Skip);
    assert_eq!(serde_json::to_string(&Outcome::Incorrect).unwrap(), "\"incorrect\"");
  }

  #[test]
  fn test_round_type_as_str() {
    assert_eq!(RoundType::Initial.as_str(), "initial");
    assert_eq!(RoundType::Review.as_str(), "review");
    assert_eq!(RoundType::Missed.as_str(), "missed");
    assert_eq!(serde_json::to_string(&RoundType::Review).unwrap(), "\"review\"");
  }
}
