//! Lenient parsing of model output into cards.

use serde_json::Value;

use super::GeneratedCard;

/// Extract cards from raw model output.
///
/// Accepts a JSON array, an object with a `cards` array, either wrapped in a
/// markdown code fence or surrounded by prose. Entries without a non-empty
/// question and answer are dropped. Never fails; garbage yields an empty list.
pub fn parse_card_list(raw: &str) -> Vec<GeneratedCard> {
  let text = strip_code_fence(raw.trim());
  let Some(value) = parse_json(text) else {
    tracing::warn!("Model output contained no parseable JSON ({} bytes)", raw.len());
    return Vec::new();
  };

  let items = match value {
    Value::Array(items) => items,
    Value::Object(mut map) => match map.remove("cards") {
      Some(Value::Array(items)) => items,
      _ => Vec::new(),
    },
    _ => Vec::new(),
  };

  items.iter().filter_map(card_from_value).collect()
}

fn strip_code_fence(text: &str) -> &str {
  let Some(rest) = text.strip_prefix("```") else {
    return text;
  };
  // Drop the language tag line
  let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
  rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn parse_json(text: &str) -> Option<Value> {
  if let Ok(value) = serde_json::from_str::<Value>(text) {
    return Some(value);
  }
  for (open, close) in [('[', ']'), ('{', '}')] {
    if let (Some(start), Some(end)) = (text.find(open), text.rfind(close)) {
      if start < end {
        if let Ok(value) = serde_json::from_str::<Value>(&text[start..=end]) {
          return Some(value);
        }
      }
    }
  }
  None
}

fn field<'a>(value: &'a Value, names: &[&str]) -> Option<&'a Value> {
  names.iter().find_map(|name| value.get(*name))
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
  value
    .and_then(Value::as_str)
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_string)
}

fn card_from_value(value: &Value) -> Option<GeneratedCard> {
  let question = non_empty_str(field(value, &["question", "front"]))?;
  let answer = non_empty_str(field(value, &["answer", "back"]))?;
  let id = match field(value, &["id"]) {
    Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
    Some(Value::Number(n)) => Some(n.to_string()),
    _ => None,
  };
  let is_new = field(value, &["isNew", "is_new"])
    .and_then(Value::as_bool)
    .unwrap_or(false);

  Some(GeneratedCard {
    question,
    answer,
    id,
    is_new,
  })
}
