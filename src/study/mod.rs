//! Study-session engine: rounds, session totals, undo and reordering.
//!
//! Everything here is synchronous and free of I/O. Loading the card set
//! happens before a session starts; rendering happens after, from a
//! [`StudyView`].

pub mod clock;
pub mod controller;
pub mod reorder;
pub mod round;
pub mod session;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{ActionStatus, IgnoreReason, StudyController, StudyError};
pub use reorder::{original_order_remaining, shuffled_remaining};
pub use round::Round;
pub use session::{Session, SessionEngine};
pub use view::{RoundSummary, SessionSummary, SessionTotals, StudyView};
