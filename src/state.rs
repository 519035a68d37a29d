//! Application state shared by all handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::ai::CardAssistant;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::sessions::StudySessions;
use crate::study::SessionEngine;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Card store connection
    pub db: DbPool,

    /// Live study sessions, keyed by session id
    pub sessions: Arc<StudySessions>,

    /// Engine handed to each new study controller
    pub engine: SessionEngine,

    /// Card generation backend; `None` when no API key is configured
    pub assistant: Option<Arc<dyn CardAssistant>>,

    /// Pause between recording an answer and showing the next card
    pub feedback_delay: Duration,
}

impl AppState {
    pub fn new(db: DbPool, config: &AppConfig, assistant: Option<Arc<dyn CardAssistant>>) -> Self {
        Self {
            db,
            sessions: Arc::new(StudySessions::new(config.session_expiry_hours)),
            engine: SessionEngine::default(),
            assistant,
            feedback_delay: Duration::from_millis(config.feedback_delay_ms),
        }
    }

    /// Use a specific engine (e.g. one driven by a manual clock)
    pub fn with_engine(mut self, engine: SessionEngine) -> Self {
        self.engine = engine;
        self
    }
}
