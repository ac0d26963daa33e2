//! Feature collections built on the persistent state store.
//!
//! Each section owns one storage key and the shape of the value under it;
//! the store handles the serialize/deserialize/fallback discipline.

mod notes;
mod prefs;
mod tasks;

pub use notes::{Note, Notes, NOTES_KEY};
pub use prefs::{
  greeting, MusicSetting, Preferences, Theme, DEFAULT_USER, MUSIC_KEY, THEME_KEY, USER_KEY,
};
pub use tasks::{Task, Tasks, DEFAULT_CATEGORY, TASKS_KEY};

use chrono::Utc;
use std::sync::Arc;

use crate::store::StateBackend;

/// One dashboard: every section sharing a single storage backend.
pub struct Dashboard {
  pub notes: Notes,
  pub tasks: Tasks,
  pub prefs: Preferences,
}

impl Dashboard {
  pub fn new(backend: Arc<dyn StateBackend>) -> Self {
    Self {
      notes: Notes::new(Arc::clone(&backend)),
      tasks: Tasks::new(Arc::clone(&backend)),
      prefs: Preferences::new(backend),
    }
  }
}

/// Millisecond-timestamp id, nudged forward past ids already taken so
/// same-millisecond adds stay distinct.
pub(crate) fn timestamp_id(taken: impl Fn(&str) -> bool) -> String {
  let mut candidate = Utc::now().timestamp_millis();
  loop {
    let id = candidate.to_string();
    if !taken(&id) {
      return id;
    }
    candidate += 1;
  }
}
