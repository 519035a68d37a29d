//! The action surface a study screen drives.
//!
//! Wraps a [`Session`] together with the presentation state that sits around
//! it: whether the answer is revealed, and the feedback pause between
//! recording an outcome and moving to the next card. While that pause is open
//! the controller is `transitioning` and refuses anything that would race
//! with it.

use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use super::reorder::{original_order_remaining, shuffled_remaining};
use super::session::{Session, SessionEngine};
use super::view::{session_summary, session_totals, CardView, Controls, RoundStats, SessionSummary, StudyView};
use crate::domain::{Card, FlashcardSet, Outcome};

#[derive(Debug, Error, PartialEq)]
pub enum StudyError {
  #[error("Set '{0}' has no cards to study")]
  EmptySet(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
  /// A feedback pause is still open
  Transitioning,
  /// Nothing is waiting to be finished
  NothingPending,
  AtFirstCard,
  RoundComplete,
  RoundInProgress,
  NothingToReview,
  NothingToReorder,
}

/// Result of a controller action. Edge conditions are reported, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum ActionStatus {
  Applied,
  /// Outcome recorded; call `finish_transition` once feedback has been shown
  Pending,
  Ignored(IgnoreReason),
}

pub struct StudyController {
  engine: SessionEngine,
  original_cards: Vec<Card>,
  session: Session,
  answer_shown: bool,
  feedback: Option<Outcome>,
  transitioning: bool,
}

impl StudyController {
  /// Start studying a fully loaded set
  pub fn start(engine: SessionEngine, set: &FlashcardSet) -> Result<Self, StudyError> {
    if set.cards.is_empty() {
      return Err(StudyError::EmptySet(set.id.clone()));
    }
    let session = engine.create_session(&set.id, &set.name, set.cards.clone());
    Ok(Self {
      engine,
      original_cards: set.cards.clone(),
      session,
      answer_shown: false,
      feedback: None,
      transitioning: false,
    })
  }

  pub fn session(&self) -> &Session {
    &self.session
  }

  pub fn show_answer(&mut self) -> ActionStatus {
    if self.transitioning {
      return ActionStatus::Ignored(IgnoreReason::Transitioning);
    }
    if self.session.current_round().is_complete() {
      return ActionStatus::Ignored(IgnoreReason::RoundComplete);
    }
    self.answer_shown = true;
    ActionStatus::Applied
  }

  pub fn answer(&mut self, correct: bool) -> ActionStatus {
    self.begin(Outcome::from_answer(correct))
  }

  pub fn skip(&mut self) -> ActionStatus {
    self.begin(Outcome::Skip)
  }

  fn begin(&mut self, outcome: Outcome) -> ActionStatus {
    if self.transitioning {
      return ActionStatus::Ignored(IgnoreReason::Transitioning);
    }
    if !self.session.current_round().can_record() {
      return ActionStatus::Ignored(IgnoreReason::RoundComplete);
    }
    self.session = self.engine.record(&self.session, outcome);
    self.feedback = Some(outcome);
    self.transitioning = true;
    ActionStatus::Pending
  }

  /// Close the feedback pause and move to the next card
  pub fn finish_transition(&mut self) -> ActionStatus {
    if !self.transitioning {
      return ActionStatus::Ignored(IgnoreReason::NothingPending);
    }
    self.session = self.engine.step_forward(&self.session);
    self.transitioning = false;
    self.clear_card_state();
    ActionStatus::Applied
  }

  /// Step back to the previous card, erasing its outcome
  pub fn previous(&mut self) -> ActionStatus {
    if self.transitioning {
      return ActionStatus::Ignored(IgnoreReason::Transitioning);
    }
    if self.session.current_round().current_index == 0 {
      return ActionStatus::Ignored(IgnoreReason::AtFirstCard);
    }
    self.session = self.engine.undo(&self.session);
    self.clear_card_state();
    ActionStatus::Applied
  }

  pub fn shuffle_remaining<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ActionStatus {
    if let Some(reason) = self.reorder_blocked() {
      return ActionStatus::Ignored(reason);
    }
    let suffix = shuffled_remaining(self.session.current_round(), rng);
    self.session = self.engine.reorder_remaining(&self.session, suffix);
    ActionStatus::Applied
  }

  pub fn reset_remaining_to_original(&mut self) -> ActionStatus {
    if let Some(reason) = self.reorder_blocked() {
      return ActionStatus::Ignored(reason);
    }
    let suffix = original_order_remaining(self.session.current_round(), &self.original_cards);
    self.session = self.engine.reorder_remaining(&self.session, suffix);
    ActionStatus::Applied
  }

  fn reorder_blocked(&self) -> Option<IgnoreReason> {
    if self.transitioning {
      Some(IgnoreReason::Transitioning)
    } else if self.session.current_round().remaining().len() < 2 {
      Some(IgnoreReason::NothingToReorder)
    } else {
      None
    }
  }

  pub fn start_review_round(&mut self) -> ActionStatus {
    if let Some(reason) = self.new_round_blocked() {
      return ActionStatus::Ignored(reason);
    }
    if self.session.current_round().missed_cards.is_empty() {
      return ActionStatus::Ignored(IgnoreReason::NothingToReview);
    }
    self.session = self.engine.start_review_round(&self.session);
    self.clear_card_state();
    ActionStatus::Applied
  }

  pub fn start_missed_cards_round(&mut self) -> ActionStatus {
    if let Some(reason) = self.new_round_blocked() {
      return ActionStatus::Ignored(reason);
    }
    if self.session.all_missed_cards.is_empty() {
      return ActionStatus::Ignored(IgnoreReason::NothingToReview);
    }
    self.session = self.engine.start_missed_round(&self.session);
    self.clear_card_state();
    ActionStatus::Applied
  }

  fn new_round_blocked(&self) -> Option<IgnoreReason> {
    if self.transitioning {
      Some(IgnoreReason::Transitioning)
    } else if !self.session.current_round().is_complete() {
      Some(IgnoreReason::RoundInProgress)
    } else {
      None
    }
  }

  /// Discard all progress and start again from the full set
  pub fn restart_session(&mut self) -> ActionStatus {
    if self.transitioning {
      return ActionStatus::Ignored(IgnoreReason::Transitioning);
    }
    self.session = self.engine.restart(&self.session, self.original_cards.clone());
    self.clear_card_state();
    ActionStatus::Applied
  }

  fn clear_card_state(&mut self) {
    self.answer_shown = false;
    self.feedback = None;
  }

  pub fn summary(&self) -> SessionSummary {
    session_summary(&self.session)
  }

  pub fn view(&self) -> StudyView {
    let session = &self.session;
    let round = session.current_round();
    let revealed = self.answer_shown || self.feedback.is_some();
    let card = round.current_card().map(|card| CardView {
      id: card.id.clone(),
      question: card.question.clone(),
      answer: revealed.then(|| card.answer.clone()),
    });
    let round_complete = round.is_complete();
    let elapsed = round.end_time.unwrap_or_else(|| self.engine.now()) - round.start_time;

    StudyView {
      set_id: session.set_id.clone(),
      set_name: session.set_name.clone(),
      round_number: round.round_number,
      round_type: round.round_type,
      position: round.current_index,
      round_size: round.cards.len(),
      card,
      answer_shown: revealed,
      feedback: self.feedback,
      transitioning: self.transitioning,
      round_complete,
      round: RoundStats {
        correct: round.correct_answers.len(),
        incorrect: round.incorrect_answers.len(),
        skipped: round.skipped_cards.len(),
        missed: round.missed_cards.len(),
        elapsed_seconds: elapsed.num_seconds().max(0),
      },
      totals: session_totals(session),
      controls: Controls {
        can_go_back: !self.transitioning && round.current_index > 0,
        can_answer: !self.transitioning && !round_complete,
        can_reorder: !self.transitioning && round.remaining().len() > 1,
        can_start_review: !self.transitioning && round_complete && !round.missed_cards.is_empty(),
        can_start_missed: !self.transitioning
          && round_complete
          && !session.all_missed_cards.is_empty(),
      },
    }
  }
}
