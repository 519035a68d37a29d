//! In-memory registry of live study sessions.
//!
//! Each entry is one study visit, keyed by a random session id handed to the
//! client. Entries auto-expire after a period of inactivity and are never
//! persisted.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::config;
use crate::domain::random_token;
use crate::study::StudyController;

/// Length of generated session ids
const SESSION_ID_LEN: usize = 32;

/// Session entry with last access time for expiration
struct SessionEntry {
  controller: StudyController,
  last_access: DateTime<Utc>,
}

pub struct StudySessions {
  entries: Mutex<HashMap<String, SessionEntry>>,
  expiry: Duration,
}

impl StudySessions {
  pub fn new(expiry_hours: i64) -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
      expiry: Duration::hours(expiry_hours),
    }
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
    self.entries.lock().unwrap_or_else(|poisoned| {
      tracing::error!("Study session store lock poisoned; continuing with inner state");
      poisoned.into_inner()
    })
  }

  /// Register a controller and return its new session id
  pub fn insert(&self, controller: StudyController) -> String {
    let mut entries = self.lock();

    // Clean up expired sessions occasionally (~10% chance)
    if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
      self.cleanup_expired(&mut entries);
    }

    let session_id = random_token(SESSION_ID_LEN);
    entries.insert(
      session_id.clone(),
      SessionEntry {
        controller,
        last_access: Utc::now(),
      },
    );
    tracing::info!("Opened study session {} ({} live)", session_id, entries.len());
    session_id
  }

  /// Run `f` against a live session, refreshing its last access time.
  /// `None` if the id is unknown or expired.
  pub fn with_session<R>(&self, session_id: &str, f: impl FnOnce(&mut StudyController) -> R) -> Option<R> {
    let mut entries = self.lock();
    let now = Utc::now();
    let entry = entries.get_mut(session_id)?;
    if now - entry.last_access > self.expiry {
      entries.remove(session_id);
      tracing::debug!("Study session {} expired", session_id);
      return None;
    }
    entry.last_access = now;
    Some(f(&mut entry.controller))
  }

  /// End a session. Returns false if it was not live.
  pub fn remove(&self, session_id: &str) -> bool {
    self.lock().remove(session_id).is_some()
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn cleanup_expired(&self, entries: &mut HashMap<String, SessionEntry>) {
    let cutoff = Utc::now() - self.expiry;
    entries.retain(|_, entry| entry.last_access > cutoff);
  }
}
