//! Round engine: one pass through an ordered list of cards.
//!
//! A round only ever moves forward by recording an outcome for the card at
//! `current_index` and then stepping past it. The single way back is
//! [`Round::undo_last`], which erases the recorded outcome of the previous card.
//! Cards before `current_index` are fixed; only the unstudied suffix can be
//! reordered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::{Card, Outcome, RoundType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
  pub round_number: u32,
  pub round_type: RoundType,
  pub cards: Vec<Card>,
  /// Position of the card being presented; `cards.len()` once the round is complete
  pub current_index: usize,
  pub studied_cards: BTreeSet<String>,
  pub correct_answers: BTreeSet<String>,
  pub incorrect_answers: BTreeSet<String>,
  pub skipped_cards: BTreeSet<String>,
  /// Incorrect or skipped cards in this round, in the order they were missed
  pub missed_cards: Vec<Card>,
  pub start_time: DateTime<Utc>,
  pub end_time: Option<DateTime<Utc>>,
}

impl Round {
  /// Start a round over `cards`. An empty list gives a round that is already complete.
  pub fn new(cards: Vec<Card>, round_number: u32, round_type: RoundType, now: DateTime<Utc>) -> Self {
    Self {
      round_number,
      round_type,
      cards,
      current_index: 0,
      studied_cards: BTreeSet::new(),
      correct_answers: BTreeSet::new(),
      incorrect_answers: BTreeSet::new(),
      skipped_cards: BTreeSet::new(),
      missed_cards: Vec::new(),
      start_time: now,
      end_time: None,
    }
  }

  pub fn current_card(&self) -> Option<&Card> {
    self.cards.get(self.current_index)
  }

  pub fn is_complete(&self) -> bool {
    self.current_index >= self.cards.len()
  }

  /// Cards not yet stepped past
  pub fn remaining(&self) -> &[Card] {
    &self.cards[self.current_index.min(self.cards.len())..]
  }

  /// True while the current card has an outcome but the round has not stepped past it
  pub fn is_pending(&self) -> bool {
    self
      .current_card()
      .is_some_and(|card| self.studied_cards.contains(&card.id))
  }

  /// Outcome recorded for a card in this round, if any
  pub fn outcome_of(&self, card_id: &str) -> Option<Outcome> {
    if self.correct_answers.contains(card_id) {
      Some(Outcome::Correct)
    } else if self.incorrect_answers.contains(card_id) {
      Some(Outcome::Incorrect)
    } else if self.skipped_cards.contains(card_id) {
      Some(Outcome::Skip)
    } else {
      None
    }
  }

  /// Whether the current card can take an outcome
  pub fn can_record(&self) -> bool {
    self
      .current_card()
      .is_some_and(|card| !self.studied_cards.contains(&card.id))
  }

  /// Record an outcome for the current card without moving past it.
  ///
  /// Recording twice for the same position is a no-op, as is recording on a
  /// complete round.
  pub fn record_outcome(&self, outcome: Outcome, now: DateTime<Utc>) -> Round {
    let mut next = self.clone();
    let Some(card) = self.current_card().filter(|_| self.can_record()) else {
      return next;
    };

    next.studied_cards.insert(card.id.clone());
    match outcome {
      Outcome::Correct => {
        next.correct_answers.insert(card.id.clone());
        next.missed_cards.retain(|c| c.id != card.id);
      }
      Outcome::Incorrect | Outcome::Skip => {
        if outcome == Outcome::Incorrect {
          next.incorrect_answers.insert(card.id.clone());
        } else {
          next.skipped_cards.insert(card.id.clone());
        }
        if !next.missed_cards.iter().any(|c| c.id == card.id) {
          next.missed_cards.push(card.clone());
        }
      }
    }

    if next.studied_cards.len() == next.cards.len() {
      next.end_time = Some(now);
    }
    next
  }

  /// Move past the current card once it has an outcome
  pub fn step_forward(&self) -> Round {
    let mut next = self.clone();
    if self.is_pending() {
      next.current_index += 1;
    }
    next
  }

  /// Erase the outcome of the card just before `current_index` and move back onto it.
  ///
  /// Returns the erased outcome so the caller can reverse its own aggregates.
  /// `None` at the first card or while an outcome is waiting to be stepped past.
  pub fn undo_last(&self) -> Option<(Round, Outcome)> {
    if self.current_index == 0 || self.is_pending() {
      return None;
    }
    let card = self.cards.get(self.current_index - 1)?;
    let outcome = self.outcome_of(&card.id)?;

    let mut next = self.clone();
    next.studied_cards.remove(&card.id);
    next.correct_answers.remove(&card.id);
    next.incorrect_answers.remove(&card.id);
    next.skipped_cards.remove(&card.id);
    next.missed_cards.retain(|c| c.id != card.id);
    next.current_index -= 1;
    next.end_time = None;
    Some((next, outcome))
  }

  /// Replace the unstudied suffix with `new_suffix`.
  ///
  /// `new_suffix` must hold exactly the ids of the current suffix; anything
  /// else leaves the round untouched. Progress is never affected.
  pub fn reorder_remaining(&self, new_suffix: Vec<Card>) -> Round {
    let mut next = self.clone();
    if !same_ids(self.remaining(), &new_suffix) {
      tracing::warn!(
        "Rejected reorder for round {}: not a permutation of the remaining cards",
        self.round_number
      );
      return next;
    }
    next.cards.truncate(self.current_index);
    next.cards.extend(new_suffix);
    next
  }

  pub fn studied_count(&self) -> usize {
    self.studied_cards.len()
  }
}

fn same_ids(a: &[Card], b: &[Card]) -> bool {
  if a.len() != b.len() {
    return false;
  }
  let mut left: Vec<&str> = a.iter().map(|c| c.id.as_str()).collect();
  let mut right: Vec<&str> = b.iter().map(|c| c.id.as_str()).collect();
  left.sort_unstable();
  right.sort_unstable();
  left == right
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use chrono::{Duration, TimeZone};

  pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
  }

  pub(crate) fn cards(ids: &[&str]) -> Vec<Card> {
    ids
      .iter()
      .map(|id| Card::new(*id, format!("question {}", id), format!("answer {}", id)))
      .collect()
  }

  pub(crate) fn assert_round_invariants(round: &Round) {
    assert_eq!(
      round.studied_cards.len(),
      round.correct_answers.len() + round.incorrect_answers.len() + round.skipped_cards.len()
    );
    assert!(round.correct_answers.is_disjoint(&round.incorrect_answers));
    assert!(round.correct_answers.is_disjoint(&round.skipped_cards));
    assert!(round.incorrect_answers.is_disjoint(&round.skipped_cards));
    assert!(round.current_index <= round.cards.len());
  }

  fn answer(round: &Round, outcome: Outcome) -> Round {
    round.record_outcome(outcome, t0()).step_forward()
  }

  #[test]
  fn test_new_round_defaults() {
    let round = Round::new(cards(&["a", "b"]), 1, RoundType::Initial, t0());
    assert_eq!(round.current_index, 0);
    assert!(round.studied_cards.is_empty());
    assert!(round.missed_cards.is_empty());
    assert_eq!(round.start_time, t0());
    assert!(round.end_time.is_none());
    assert_eq!(round.current_card().map(|c| c.id.as_str()), Some("a"));
  }

  #[test]
  fn test_empty_round_is_complete() {
    let round = Round::new(vec![], 1, RoundType::Initial, t0());
    assert!(round.is_complete());
    assert!(round.current_card().is_none());
    assert_eq!(round.record_outcome(Outcome::Correct, t0()), round);
  }

  #[test]
  fn test_record_does_not_advance() {
    let round = Round::new(cards(&["a", "b"]), 1, RoundType::Initial, t0());
    let recorded = round.record_outcome(Outcome::Correct, t0());
    assert_eq!(recorded.current_index, 0);
    assert!(recorded.is_pending());
    assert!(recorded.correct_answers.contains("a"));
    assert_round_invariants(&recorded);
  }

  #[test]
  fn test_double_record_is_noop() {
    let round = Round::new(cards(&["a", "b"]), 1, RoundType::Initial, t0());
    let once = round.record_outcome(Outcome::Incorrect, t0());
    let twice = once.record_outcome(Outcome::Correct, t0());
    assert_eq!(once, twice);
  }

  #[test]
  fn test_step_forward_requires_outcome() {
    let round = Round::new(cards(&["a", "b"]), 1, RoundType::Initial, t0());
    assert_eq!(round.step_forward().current_index, 0);
  }

  #[test]
  fn test_missed_cards_in_order() {
    let round = Round::new(cards(&["a", "b", "c"]), 1, RoundType::Initial, t0());
    let round = answer(&round, Outcome::Skip);
    let round = answer(&round, Outcome::Correct);
    let round = answer(&round, Outcome::Incorrect);
    let missed: Vec<&str> = round.missed_cards.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(missed, vec!["a", "c"]);
    assert!(round.skipped_cards.contains("a"));
    assert_round_invariants(&round);
  }

  #[test]
  fn test_end_time_stamped_on_last_outcome() {
    let round = Round::new(cards(&["a"]), 1, RoundType::Initial, t0());
    let later = t0() + Duration::minutes(3);
    let recorded = round.record_outcome(Outcome::Correct, later);
    assert_eq!(recorded.end_time, Some(later));
    assert!(recorded.step_forward().is_complete());
  }

  #[test]
  fn test_undo_at_start_is_none() {
    let round = Round::new(cards(&["a"]), 1, RoundType::Initial, t0());
    assert!(round.undo_last().is_none());
  }

  #[test]
  fn test_undo_blocked_while_pending() {
    let round = Round::new(cards(&["a", "b"]), 1, RoundType::Initial, t0());
    let round = answer(&round, Outcome::Correct);
    let pending = round.record_outcome(Outcome::Incorrect, t0());
    assert!(pending.undo_last().is_none());
  }

  #[test]
  fn test_undo_reports_outcome_and_restores() {
    let round = Round::new(cards(&["a", "b"]), 1, RoundType::Initial, t0());
    let after = answer(&round, Outcome::Skip);
    let (undone, outcome) = after.undo_last().unwrap();
    assert_eq!(outcome, Outcome::Skip);
    assert_eq!(undone, round);
  }

  #[test]
  fn test_undo_clears_end_time() {
    let round = Round::new(cards(&["a"]), 1, RoundType::Initial, t0());
    let done = answer(&round, Outcome::Incorrect);
    assert!(done.end_time.is_some());
    let (undone, _) = done.undo_last().unwrap();
    assert!(undone.end_time.is_none());
    assert!(undone.missed_cards.is_empty());
  }

  #[test]
  fn test_reorder_keeps_prefix_and_progress() {
    let round = Round::new(cards(&["a", "b", "c", "d"]), 1, RoundType::Initial, t0());
    let round = answer(&round, Outcome::Correct);
    let reordered = round.reorder_remaining(cards(&["d", "b", "c"]));
    let ids: Vec<&str> = reordered.cards.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "d", "b", "c"]);
    assert_eq!(reordered.current_index, round.current_index);
    assert_eq!(reordered.studied_cards, round.studied_cards);
    assert_eq!(reordered.correct_answers, round.correct_answers);
  }

  #[test]
  fn test_reorder_rejects_foreign_cards() {
    let round = Round::new(cards(&["a", "b", "c"]), 1, RoundType::Initial, t0());
    let round = answer(&round, Outcome::Correct);
    assert_eq!(round.reorder_remaining(cards(&["a", "b"])), round);
    assert_eq!(round.reorder_remaining(cards(&["b"])), round);
    assert_eq!(round.reorder_remaining(cards(&["b", "x"])), round);
  }

  #[test]
  fn test_remaining_on_complete_round() {
    let round = Round::new(cards(&["a"]), 1, RoundType::Initial, t0());
    let round = answer(&round, Outcome::Correct);
    assert!(round.remaining().is_empty());
  }
}
