//! Orderings for the unstudied part of a round.
//!
//! Both produce a permutation of the round's remaining cards, suitable for
//! [`super::SessionEngine::reorder_remaining`].

use rand::seq::SliceRandom;
use rand::Rng;

use super::round::Round;
use crate::domain::Card;

/// Remaining cards in a random order
pub fn shuffled_remaining<R: Rng + ?Sized>(round: &Round, rng: &mut R) -> Vec<Card> {
  let mut remaining = round.remaining().to_vec();
  remaining.shuffle(rng);
  remaining
}

/// Remaining cards in the order they appear in `original`.
///
/// Cards missing from `original` keep their current relative order at the end.
pub fn original_order_remaining(round: &Round, original: &[Card]) -> Vec<Card> {
  let remaining = round.remaining();
  let mut ordered: Vec<Card> = original
    .iter()
    .filter(|card| remaining.iter().any(|r| r.id == card.id))
    .cloned()
    .collect();
  for card in remaining {
    if !ordered.iter().any(|c| c.id == card.id) {
      ordered.push(card.clone());
    }
  }
  ordered
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Outcome, RoundType};
  use crate::study::round::tests::{cards, t0};
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn ids(cards: &[Card]) -> Vec<String> {
    cards.iter().map(|c| c.id.clone()).collect()
  }

  fn studied_two() -> Round {
    let round = Round::new(cards(&["a", "b", "c", "d", "e"]), 1, RoundType::Initial, t0());
    let round = round.record_outcome(Outcome::Correct, t0()).step_forward();
    round.record_outcome(Outcome::Incorrect, t0()).step_forward()
  }

  #[test]
  fn test_shuffle_keeps_remaining_ids() {
    let round = studied_two();
    let mut rng = StdRng::seed_from_u64(7);
    let mut shuffled = ids(&shuffled_remaining(&round, &mut rng));
    shuffled.sort();
    assert_eq!(shuffled, vec!["c", "d", "e"]);
  }

  #[test]
  fn test_shuffle_applies_to_suffix_only() {
    let round = studied_two();
    let mut rng = StdRng::seed_from_u64(99);
    let reordered = round.reorder_remaining(shuffled_remaining(&round, &mut rng));

    assert_eq!(ids(&reordered.cards[..2]), vec!["a", "b"]);
    let mut tail = ids(&reordered.cards[2..]);
    tail.sort();
    assert_eq!(tail, vec!["c", "d", "e"]);
    assert_eq!(reordered.current_index, 2);
    assert_eq!(reordered.studied_cards, round.studied_cards);
    assert_eq!(reordered.missed_cards, round.missed_cards);
  }

  #[test]
  fn test_shuffle_single_remaining_is_noop() {
    let round = Round::new(cards(&["a", "b"]), 1, RoundType::Initial, t0());
    let round = round.record_outcome(Outcome::Correct, t0()).step_forward();
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(round.reorder_remaining(shuffled_remaining(&round, &mut rng)), round);
  }

  #[test]
  fn test_shuffle_nothing_remaining() {
    let round = Round::new(vec![], 1, RoundType::Initial, t0());
    let mut rng = StdRng::seed_from_u64(1);
    assert!(shuffled_remaining(&round, &mut rng).is_empty());
  }

  #[test]
  fn test_original_order_restores_suffix() {
    let original = cards(&["a", "b", "c", "d", "e"]);
    let round = studied_two().reorder_remaining(cards(&["e", "c", "d"]));
    let restored = round.reorder_remaining(original_order_remaining(&round, &original));
    assert_eq!(ids(&restored.cards), vec!["a", "b", "c", "d", "e"]);
  }

  #[test]
  fn test_original_order_keeps_prefix_when_shuffled_earlier() {
    // Shuffled before studying: c was answered first
    let original = cards(&["a", "b", "c", "d"]);
    let round = Round::new(cards(&["c", "d", "a", "b"]), 1, RoundType::Initial, t0());
    let round = round.record_outcome(Outcome::Correct, t0()).step_forward();
    let restored = round.reorder_remaining(original_order_remaining(&round, &original));
    assert_eq!(ids(&restored.cards), vec!["c", "a", "b", "d"]);
  }

  #[test]
  fn test_original_order_unknown_cards_at_end() {
    let original = cards(&["b"]);
    let round = Round::new(cards(&["x", "b"]), 2, RoundType::Review, t0());
    assert_eq!(ids(&original_order_remaining(&round, &original)), vec!["b", "x"]);
  }
}
