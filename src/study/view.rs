//! Serializable snapshot of a study controller for rendering.

use serde::Serialize;

use super::session::Session;
use super::round::Round;
use crate::domain::{Card, Outcome, RoundType};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
  pub id: String,
  pub question: String,
  /// Present only once the answer has been revealed
  pub answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundStats {
  pub correct: usize,
  pub incorrect: usize,
  pub skipped: usize,
  pub missed: usize,
  pub elapsed_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionTotals {
  pub rounds: usize,
  pub studied: u32,
  pub correct: u32,
  pub incorrect: u32,
  pub skipped: u32,
  pub missed: usize,
  /// Share of studied cards answered correctly, rounded; `None` before any answer
  pub accuracy_percent: Option<u32>,
}

/// Which actions the UI should offer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Controls {
  pub can_go_back: bool,
  pub can_answer: bool,
  pub can_reorder: bool,
  pub can_start_review: bool,
  pub can_start_missed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyView {
  pub set_id: String,
  pub set_name: String,
  pub round_number: u32,
  pub round_type: RoundType,
  pub position: usize,
  pub round_size: usize,
  pub card: Option<CardView>,
  pub answer_shown: bool,
  pub feedback: Option<Outcome>,
  pub transitioning: bool,
  pub round_complete: bool,
  pub round: RoundStats,
  pub totals: SessionTotals,
  pub controls: Controls,
}

/// One finished or in-progress round, for the end-of-session summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundSummary {
  pub round_number: u32,
  pub round_type: RoundType,
  pub size: usize,
  pub studied: usize,
  pub correct: usize,
  pub incorrect: usize,
  pub skipped: usize,
  pub complete: bool,
  pub duration_seconds: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
  pub set_id: String,
  pub set_name: String,
  pub original_set_size: usize,
  pub totals: SessionTotals,
  pub rounds: Vec<RoundSummary>,
  pub missed_cards: Vec<Card>,
}

pub fn accuracy_percent(correct: u32, studied: u32) -> Option<u32> {
  if studied == 0 {
    return None;
  }
  Some(((correct as f64 / studied as f64) * 100.0).round() as u32)
}

pub(crate) fn session_totals(session: &Session) -> SessionTotals {
  SessionTotals {
    rounds: session.rounds.len(),
    studied: session.total_cards_studied,
    correct: session.total_correct_answers,
    incorrect: session.total_incorrect_answers,
    skipped: session.total_skipped_cards,
    missed: session.all_missed_cards.len(),
    accuracy_percent: accuracy_percent(session.total_correct_answers, session.total_cards_studied),
  }
}

fn round_summary(round: &Round) -> RoundSummary {
  RoundSummary {
    round_number: round.round_number,
    round_type: round.round_type,
    size: round.cards.len(),
    studied: round.studied_count(),
    correct: round.correct_answers.len(),
    incorrect: round.incorrect_answers.len(),
    skipped: round.skipped_cards.len(),
    complete: round.is_complete(),
    duration_seconds: round.end_time.map(|end| (end - round.start_time).num_seconds().max(0)),
  }
}

pub fn session_summary(session: &Session) -> SessionSummary {
  SessionSummary {
    set_id: session.set_id.clone(),
    set_name: session.set_name.clone(),
    original_set_size: session.original_set_size,
    totals: session_totals(session),
    rounds: session.rounds.iter().map(round_summary).collect(),
    missed_cards: session.all_missed_cards.clone(),
  }
}
