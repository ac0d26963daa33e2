//! Notes collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::store::{StateBackend, StoredValue};

use super::timestamp_id;

/// Storage key for the notes list.
pub const NOTES_KEY: &str = "notes";

/// A single note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
  pub id: String,
  pub title: String,
  pub content: String,
  pub created_at: DateTime<Utc>,
}

/// The notes list, newest first.
pub struct Notes {
  list: StoredValue<Vec<Note>>,
}

impl Notes {
  pub fn new(backend: Arc<dyn StateBackend>) -> Self {
    Self {
      list: StoredValue::initialize(backend, NOTES_KEY, Vec::new()),
    }
  }

  pub fn list(&self) -> &[Note] {
    self.list.get()
  }

  /// Add a note to the front of the list and return its id. A note whose
  /// title or content is blank after trimming is rejected.
  pub fn add(&mut self, title: &str, content: &str) -> Option<String> {
    if title.trim().is_empty() || content.trim().is_empty() {
      return None;
    }

    let id = timestamp_id(|candidate| self.list.get().iter().any(|note| note.id == candidate));
    let note = Note {
      id: id.clone(),
      title: title.to_string(),
      content: content.to_string(),
      created_at: Utc::now(),
    };

    let mut notes = self.list.get().clone();
    notes.insert(0, note);
    self.list.set(notes);
    Some(id)
  }

  /// Update an existing note's title and content, keeping its creation
  /// time. Returns whether the note was found.
  pub fn edit(&mut self, id: &str, title: &str, content: &str) -> bool {
    if title.trim().is_empty() || content.trim().is_empty() {
      return false;
    }

    let mut notes = self.list.get().clone();
    let mut found = false;
    for note in &mut notes {
      if note.id == id {
        note.title = title.to_string();
        note.content = content.to_string();
        found = true;
      }
    }

    if found {
      self.list.set(notes);
    }
    found
  }

  /// Remove a note by id. Returns whether anything was removed.
  pub fn delete(&mut self, id: &str) -> bool {
    let mut notes = self.list.get().clone();
    let before = notes.len();
    notes.retain(|note| note.id != id);
    let removed = notes.len() != before;

    if removed {
      self.list.set(notes);
    }
    removed
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::MemoryState;

  fn notes() -> Notes {
    Notes::new(Arc::new(MemoryState::new()))
  }

  #[test]
  fn test_add_prepends() {
    let mut notes = notes();
    notes.add("Groceries", "milk, bread").unwrap();
    notes.add("Ideas", "particle background").unwrap();

    assert_eq!(notes.list().len(), 2);
    assert_eq!(notes.list()[0].title, "Ideas");
    assert_eq!(notes.list()[1].title, "Groceries");
  }

  #[test]
  fn test_blank_notes_are_rejected() {
    let mut notes = notes();
    assert!(notes.add("   ", "content").is_none());
    assert!(notes.add("title", "\n\t").is_none());
    assert!(notes.list().is_empty());
  }

  #[test]
  fn test_edit_keeps_identity_and_creation_time() {
    let mut notes = notes();
    let id = notes.add("Draft", "first pass").unwrap();
    let created_at = notes.list()[0].created_at;

    assert!(notes.edit(&id, "Final", "second pass"));
    assert_eq!(notes.list()[0].id, id);
    assert_eq!(notes.list()[0].title, "Final");
    assert_eq!(notes.list()[0].content, "second pass");
    assert_eq!(notes.list()[0].created_at, created_at);
  }

  #[test]
  fn test_edit_of_unknown_id_reports_miss() {
    let mut notes = notes();
    assert!(!notes.edit("12345", "title", "content"));
  }

  #[test]
  fn test_delete_removes_by_id() {
    let mut notes = notes();
    let first = notes.add("One", "1").unwrap();
    let second = notes.add("Two", "2").unwrap();
    assert_ne!(first, second);

    assert!(notes.delete(&first));
    assert_eq!(notes.list().len(), 1);
    assert_eq!(notes.list()[0].id, second);
    assert!(!notes.delete(&first));
  }

  #[test]
  fn test_notes_survive_reload() {
    let backend = Arc::new(MemoryState::new());

    let mut notes = Notes::new(backend.clone());
    notes.add("Persistent", "still here").unwrap();

    let reloaded = Notes::new(backend);
    assert_eq!(reloaded.list(), notes.list());
  }
}
