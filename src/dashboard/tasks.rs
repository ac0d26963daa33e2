//! Tasks collection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::store::{StateBackend, StoredValue};

use super::timestamp_id;

/// Storage key for the tasks list.
pub const TASKS_KEY: &str = "tasks";

/// Category assigned when the user leaves the field empty.
pub const DEFAULT_CATEGORY: &str = "General";

/// A single task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
  pub id: String,
  pub text: String,
  pub category: String,
  pub completed: bool,
}

/// The tasks list, newest first.
pub struct Tasks {
  list: StoredValue<Vec<Task>>,
}

impl Tasks {
  pub fn new(backend: Arc<dyn StateBackend>) -> Self {
    Self {
      list: StoredValue::initialize(backend, TASKS_KEY, Vec::new()),
    }
  }

  pub fn list(&self) -> &[Task] {
    self.list.get()
  }

  /// Add a task to the front of the list and return its id. Blank text is
  /// rejected; a blank category falls back to [`DEFAULT_CATEGORY`].
  pub fn add(&mut self, text: &str, category: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
      return None;
    }

    let category = category.trim();
    let category = if category.is_empty() {
      DEFAULT_CATEGORY
    } else {
      category
    };

    let id = timestamp_id(|candidate| self.list.get().iter().any(|task| task.id == candidate));
    let task = Task {
      id: id.clone(),
      text: text.to_string(),
      category: category.to_string(),
      completed: false,
    };

    let mut tasks = self.list.get().clone();
    tasks.insert(0, task);
    self.list.set(tasks);
    Some(id)
  }

  /// Flip a task's completion state. Returns whether the task was found.
  pub fn toggle(&mut self, id: &str) -> bool {
    let mut tasks = self.list.get().clone();
    let mut found = false;
    for task in &mut tasks {
      if task.id == id {
        task.completed = !task.completed;
        found = true;
      }
    }

    if found {
      self.list.set(tasks);
    }
    found
  }

  /// Remove a task by id. Returns whether anything was removed.
  pub fn delete(&mut self, id: &str) -> bool {
    let mut tasks = self.list.get().clone();
    let before = tasks.len();
    tasks.retain(|task| task.id != id);
    let removed = tasks.len() != before;

    if removed {
      self.list.set(tasks);
    }
    removed
  }

  /// Tasks grouped by category, categories in sorted order, tasks in list
  /// order within each.
  pub fn by_category(&self) -> BTreeMap<&str, Vec<&Task>> {
    let mut grouped: BTreeMap<&str, Vec<&Task>> = BTreeMap::new();
    for task in self.list.get() {
      grouped.entry(task.category.as_str()).or_default().push(task);
    }
    grouped
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::MemoryState;

  fn tasks() -> Tasks {
    Tasks::new(Arc::new(MemoryState::new()))
  }

  #[test]
  fn test_add_trims_and_prepends() {
    let mut tasks = tasks();
    tasks.add("  water the plants  ", "Home").unwrap();
    tasks.add("file taxes", "Errands").unwrap();

    assert_eq!(tasks.list().len(), 2);
    assert_eq!(tasks.list()[0].text, "file taxes");
    assert_eq!(tasks.list()[1].text, "water the plants");
    assert!(!tasks.list()[0].completed);
  }

  #[test]
  fn test_blank_text_is_rejected() {
    let mut tasks = tasks();
    assert!(tasks.add("   ", "Home").is_none());
    assert!(tasks.list().is_empty());
  }

  #[test]
  fn test_blank_category_falls_back_to_general() {
    let mut tasks = tasks();
    tasks.add("buy stamps", "  ").unwrap();
    assert_eq!(tasks.list()[0].category, DEFAULT_CATEGORY);
  }

  #[test]
  fn test_toggle_flips_completion() {
    let mut tasks = tasks();
    let id = tasks.add("ship the release", "Work").unwrap();

    assert!(tasks.toggle(&id));
    assert!(tasks.list()[0].completed);
    assert!(tasks.toggle(&id));
    assert!(!tasks.list()[0].completed);
    assert!(!tasks.toggle("missing"));
  }

  #[test]
  fn test_delete_removes_by_id() {
    let mut tasks = tasks();
    let id = tasks.add("one-off", "Misc").unwrap();

    assert!(tasks.delete(&id));
    assert!(tasks.list().is_empty());
    assert!(!tasks.delete(&id));
  }

  #[test]
  fn test_by_category_sorts_categories() {
    let mut tasks = tasks();
    tasks.add("dentist", "Health").unwrap();
    tasks.add("inbox zero", "Work").unwrap();
    tasks.add("stretch", "Health").unwrap();

    let grouped = tasks.by_category();
    let categories: Vec<_> = grouped.keys().copied().collect();
    assert_eq!(categories, vec!["Health", "Work"]);
    assert_eq!(grouped["Health"].len(), 2);
    // List order within a category: newest first.
    assert_eq!(grouped["Health"][0].text, "stretch");
  }

  #[test]
  fn test_tasks_survive_reload() {
    let backend = Arc::new(MemoryState::new());

    let mut tasks = Tasks::new(backend.clone());
    let id = tasks.add("persist me", "Work").unwrap();
    tasks.toggle(&id);

    let reloaded = Tasks::new(backend);
    assert_eq!(reloaded.list(), tasks.list());
    assert!(reloaded.list()[0].completed);
  }
}
