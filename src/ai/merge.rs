use super::GeneratedCard;
use crate::domain::Card;

/// Apply improvement results to an existing card list.
///
/// Results carrying the id of an existing card replace that card in place.
/// Results flagged `isNew`, or without an id, are appended with fresh ids.
/// Results naming an unknown id are ignored.
pub fn merge_improvements(existing: &[Card], results: Vec<GeneratedCard>) -> Vec<Card> {
  let mut merged = existing.to_vec();
  for result in results {
    match result.id.as_deref() {
      Some(id) if !result.is_new => {
        if let Some(card) = merged.iter_mut().find(|c| c.id == id) {
          card.question = result.question;
          card.answer = result.answer;
        } else {
          tracing::debug!("Ignoring improvement for unknown card {}", id);
        }
      }
      _ => merged.push(Card::fresh(result.question, result.answer)),
    }
  }
  merged
}

/// Turn generated results into new cards
pub fn cards_from_generated(results: Vec<GeneratedCard>) -> Vec<Card> {
  results
    .into_iter()
    .map(|result| Card::fresh(result.question, result.answer))
    .collect()
}
