pub mod card;
pub mod outcome;

pub use card::{generate_id, random_token, Card, FlashcardSet, SetSummary};
pub use outcome::{Outcome, RoundType};
