use super::AiError;

/// Default number of cards for "add more cards"
const DEFAULT_ADD_COUNT: usize = 5;
/// Upper bound on cards requested in one go
const MAX_ADD_COUNT: usize = 50;

/// What to do to a set of cards
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
  MakeHarder,
  MakeEasier,
  AddExamples,
  Simplify,
  AddMore(usize),
  Custom(String),
}

impl Instruction {
  /// Parse a keyword such as "make harder" or "add 3 more cards".
  /// Unrecognised text becomes a custom instruction; blank text is rejected.
  pub fn parse(keyword: &str) -> Result<Self, AiError> {
    let normalized = keyword
      .split_whitespace()
      .collect::<Vec<_>>()
      .join(" ")
      .to_lowercase();

    if normalized.is_empty() {
      return Err(AiError::MalformedInstruction("instruction is empty".to_string()));
    }

    let instruction = match normalized.as_str() {
      "make harder" | "harder" => Self::MakeHarder,
      "make easier" | "easier" => Self::MakeEasier,
      "add examples" | "examples" => Self::AddExamples,
      "simplify" | "make simpler" => Self::Simplify,
      s if s.starts_with("add ") && s.contains("more") => {
        let count = s
          .split(' ')
          .find_map(|token| token.parse::<usize>().ok())
          .unwrap_or(DEFAULT_ADD_COUNT)
          .clamp(1, MAX_ADD_COUNT);
        Self::AddMore(count)
      }
      _ => Self::Custom(keyword.trim().to_string()),
    };
    Ok(instruction)
  }

  /// Whether the model should append cards rather than revise existing ones
  pub fn adds_cards(&self) -> bool {
    matches!(self, Self::AddMore(_))
  }

  /// Instruction text for the model
  pub fn prompt(&self) -> String {
    match self {
      Self::MakeHarder => {
        "Rewrite each card so the question demands deeper understanding. Keep the same topic.".to_string()
      }
      Self::MakeEasier => {
        "Rewrite each card so the question is more approachable for a beginner.".to_string()
      }
      Self::AddExamples => {
        "Keep each question and extend its answer with a short concrete example.".to_string()
      }
      Self::Simplify => "Shorten each question and answer to its essential point.".to_string(),
      Self::AddMore(n) => format!(
        "Write {} additional cards on the same material that do not repeat existing ones. Mark them isNew.",
        n
      ),
      Self::Custom(text) => text.clone(),
    }
  }
}
