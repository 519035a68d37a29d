//! Session engine: the rounds of one study visit and their running totals.
//!
//! [`SessionEngine`] is the only place that mutates a [`Session`]; every call
//! takes the current value and returns the next one. Undo lives here too
//! because reversing an outcome has to touch both the round and the
//! session-wide totals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::clock::{Clock, SystemClock};
use super::round::Round;
use crate::domain::{Card, Outcome, RoundType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
  pub set_id: String,
  pub set_name: String,
  pub original_set_size: usize,
  /// Append-only; never empty
  pub rounds: Vec<Round>,
  pub current_round_index: usize,
  /// Correct + incorrect answers. Skips are not studying.
  pub total_cards_studied: u32,
  pub total_correct_answers: u32,
  pub total_incorrect_answers: u32,
  pub total_skipped_cards: u32,
  /// Cards whose latest outcome anywhere in the session is incorrect or skip
  pub all_missed_cards: Vec<Card>,
  pub start_time: DateTime<Utc>,
}

impl Session {
  pub fn current_round(&self) -> &Round {
    &self.rounds[self.current_round_index]
  }

  pub fn is_missed(&self, card_id: &str) -> bool {
    self.all_missed_cards.iter().any(|c| c.id == card_id)
  }

  /// Whether the card's most recent outcome in rounds before `before_round_index`
  /// was incorrect or skip.
  ///
  /// A card answered correctly in a later round than the one it was missed in
  /// no longer counts. The current round and anything after it are ignored.
  pub fn was_missed_before(&self, card_id: &str, before_round_index: usize) -> bool {
    self
      .rounds
      .iter()
      .take(before_round_index)
      .rev()
      .find_map(|round| round.outcome_of(card_id))
      .is_some_and(|outcome| outcome.is_miss())
  }

  /// Rebuild the session-wide missed list by replaying every recorded outcome in order
  pub fn replay_missed_cards(&self) -> Vec<Card> {
    let mut missed: Vec<Card> = Vec::new();
    for round in &self.rounds {
      for card in &round.cards {
        match round.outcome_of(&card.id) {
          Some(Outcome::Correct) => missed.retain(|c| c.id != card.id),
          Some(_) => {
            if !missed.iter().any(|c| c.id == card.id) {
              missed.push(card.clone());
            }
          }
          None => {}
        }
      }
    }
    missed
  }

  fn add_missed(&mut self, card: &Card) {
    if !self.is_missed(&card.id) {
      self.all_missed_cards.push(card.clone());
    }
  }

  fn remove_missed(&mut self, card_id: &str) {
    self.all_missed_cards.retain(|c| c.id != card_id);
  }

  /// Put a card back into the missed list where forward play would have left it
  fn reinstate_missed(&mut self, card: &Card) {
    if self.is_missed(&card.id) {
      return;
    }
    let at = self
      .replay_missed_cards()
      .iter()
      .position(|c| c.id == card.id)
      .unwrap_or(self.all_missed_cards.len())
      .min(self.all_missed_cards.len());
    self.all_missed_cards.insert(at, card.clone());
  }

  fn replace_current_round(&mut self, round: Round) {
    let index = self.current_round_index;
    self.rounds[index] = round;
  }
}

/// Pure state transitions over [`Session`], with an injected clock
#[derive(Clone)]
pub struct SessionEngine {
  clock: Arc<dyn Clock>,
}

impl Default for SessionEngine {
  fn default() -> Self {
    Self::new(Arc::new(SystemClock))
  }
}

impl SessionEngine {
  pub fn new(clock: Arc<dyn Clock>) -> Self {
    Self { clock }
  }

  pub fn now(&self) -> DateTime<Utc> {
    self.clock.now()
  }

  pub fn create_session(&self, set_id: &str, set_name: &str, cards: Vec<Card>) -> Session {
    let now = self.now();
    let original_set_size = cards.len();
    tracing::debug!("Creating study session for set {} ({} cards)", set_id, original_set_size);
    Session {
      set_id: set_id.to_string(),
      set_name: set_name.to_string(),
      original_set_size,
      rounds: vec![Round::new(cards, 1, RoundType::Initial, now)],
      current_round_index: 0,
      total_cards_studied: 0,
      total_correct_answers: 0,
      total_incorrect_answers: 0,
      total_skipped_cards: 0,
      all_missed_cards: Vec::new(),
      start_time: now,
    }
  }

  /// Record an outcome for the current card and update the session totals together,
  /// without stepping past the card.
  pub fn record(&self, session: &Session, outcome: Outcome) -> Session {
    let round = session.current_round();
    let Some(card) = round.current_card().filter(|_| round.can_record()).cloned() else {
      return session.clone();
    };

    let mut next = session.clone();
    next.replace_current_round(round.record_outcome(outcome, self.now()));

    if outcome.counts_as_studied() {
      next.total_cards_studied += 1;
    }
    match outcome {
      Outcome::Correct => {
        next.total_correct_answers += 1;
        next.remove_missed(&card.id);
      }
      Outcome::Incorrect => {
        next.total_incorrect_answers += 1;
        next.add_missed(&card);
      }
      Outcome::Skip => {
        next.total_skipped_cards += 1;
        next.add_missed(&card);
      }
    }
    tracing::debug!(
      "Recorded {} for card {} in round {}",
      outcome.as_str(),
      card.id,
      round.round_number
    );
    next
  }

  /// Move past a card whose outcome has been recorded
  pub fn step_forward(&self, session: &Session) -> Session {
    let mut next = session.clone();
    next.replace_current_round(session.current_round().step_forward());
    next
  }

  /// Answer or skip the current card and move on
  pub fn advance(&self, session: &Session, outcome: Outcome) -> Session {
    self.step_forward(&self.record(session, outcome))
  }

  /// Step back onto the previous card, erasing its outcome and reversing its
  /// contribution to the session totals and missed list.
  ///
  /// A no-op at the first card of a round.
  pub fn undo(&self, session: &Session) -> Session {
    let index = session.current_round_index;
    let round = session.current_round();
    let Some(card) = round
      .current_index
      .checked_sub(1)
      .and_then(|i| round.cards.get(i))
      .cloned()
    else {
      return session.clone();
    };
    let Some((undone, outcome)) = round.undo_last() else {
      return session.clone();
    };

    let mut next = session.clone();
    next.replace_current_round(undone);

    let missed_earlier = next.was_missed_before(&card.id, index);
    if outcome.counts_as_studied() {
      next.total_cards_studied = next.total_cards_studied.saturating_sub(1);
    }
    match outcome {
      Outcome::Correct => {
        next.total_correct_answers = next.total_correct_answers.saturating_sub(1);
        if missed_earlier {
          next.reinstate_missed(&card);
        }
      }
      Outcome::Incorrect | Outcome::Skip => {
        if outcome == Outcome::Incorrect {
          next.total_incorrect_answers = next.total_incorrect_answers.saturating_sub(1);
        } else {
          next.total_skipped_cards = next.total_skipped_cards.saturating_sub(1);
        }
        if !missed_earlier {
          next.remove_missed(&card.id);
        }
      }
    }
    tracing::debug!("Undid {} for card {}", outcome.as_str(), card.id);
    next
  }

  /// Append a new round over `cards` and make it current. Empty `cards` is a no-op.
  pub fn start_round(&self, session: &Session, cards: Vec<Card>, round_type: RoundType) -> Session {
    if cards.is_empty() {
      return session.clone();
    }
    let round_number = session
      .rounds
      .iter()
      .map(|r| r.round_number)
      .max()
      .unwrap_or(0)
      + 1;

    let mut next = session.clone();
    tracing::debug!(
      "Starting {} round {} with {} cards",
      round_type.as_str(),
      round_number,
      cards.len()
    );
    next.rounds.push(Round::new(cards, round_number, round_type, self.now()));
    next.current_round_index = next.rounds.len() - 1;
    next
  }

  /// Round over the cards missed in the current round
  pub fn start_review_round(&self, session: &Session) -> Session {
    let cards = session.current_round().missed_cards.clone();
    self.start_round(session, cards, RoundType::Review)
  }

  /// Round over every card still missed anywhere in the session
  pub fn start_missed_round(&self, session: &Session) -> Session {
    let cards = session.all_missed_cards.clone();
    self.start_round(session, cards, RoundType::Missed)
  }

  /// Throw the session away and start over from the full set
  pub fn restart(&self, session: &Session, original_cards: Vec<Card>) -> Session {
    self.create_session(&session.set_id, &session.set_name, original_cards)
  }

  /// Replace the unstudied suffix of the current round
  pub fn reorder_remaining(&self, session: &Session, new_suffix: Vec<Card>) -> Session {
    let mut next = session.clone();
    next.replace_current_round(session.current_round().reorder_remaining(new_suffix));
    next
  }
}
