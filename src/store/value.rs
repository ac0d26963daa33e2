//! Typed values synchronized with durable storage.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use super::backend::StateBackend;

/// A typed in-memory value kept in sync with a durable serialized
/// counterpart under a single string key.
///
/// Hydrated from storage exactly once, at initialization. Every mutation
/// attempts the durable write before the in-memory value changes, so the
/// view never renders state that was not at least offered to storage.
pub struct StoredValue<T> {
  key: String,
  value: T,
  backend: Arc<dyn StateBackend>,
}

impl<T: Serialize + DeserializeOwned> StoredValue<T> {
  /// Hydrate from storage, falling back to `default` when the entry is
  /// absent or does not deserialize. The fallback is not written back;
  /// initialization is read-only.
  pub fn initialize(backend: Arc<dyn StateBackend>, key: impl Into<String>, default: T) -> Self {
    let key = key.into();
    let value = match backend.read(&key) {
      Ok(Some(raw)) => match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
          warn!("Discarding corrupt value under key {}: {}", key, e);
          default
        }
      },
      Ok(None) => default,
      Err(e) => {
        warn!("Failed to read key {}: {}", key, e);
        default
      }
    };

    Self {
      key,
      value,
      backend,
    }
  }

  /// The current in-memory value.
  pub fn get(&self) -> &T {
    &self.value
  }

  /// Replace the value, writing through to durable storage.
  ///
  /// Persistence is best-effort: a serialization or storage failure is
  /// logged and the in-memory value still updates so the caller stays
  /// responsive. Durable state silently lags until the next successful
  /// write.
  pub fn set(&mut self, value: T) {
    match serde_json::to_string(&value) {
      Ok(raw) => {
        if let Err(e) = self.backend.write(&self.key, &raw) {
          warn!("Failed to persist key {}: {}", self.key, e);
        }
      }
      Err(e) => warn!("Failed to serialize value under key {}: {}", self.key, e),
    }
    self.value = value;
  }

  /// Compute the next value from the current one and store it.
  pub fn update(&mut self, f: impl FnOnce(&T) -> T) {
    let next = f(&self.value);
    self.set(next);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::backend::MemoryState;
  use color_eyre::{eyre::eyre, Result};

  /// Backend whose writes always fail.
  struct ReadOnlyState;

  impl StateBackend for ReadOnlyState {
    fn read(&self, _key: &str) -> Result<Option<String>> {
      Ok(None)
    }

    fn write(&self, _key: &str, _value: &str) -> Result<()> {
      Err(eyre!("quota exceeded"))
    }
  }

  #[test]
  fn test_round_trip_survives_reload() {
    let backend = Arc::new(MemoryState::new());

    let mut value: StoredValue<Vec<String>> =
      StoredValue::initialize(backend.clone(), "notes", Vec::new());
    value.set(vec!["first".to_string(), "second".to_string()]);

    // A fresh initialization simulates a reload.
    let reloaded: StoredValue<Vec<String>> =
      StoredValue::initialize(backend, "notes", Vec::new());
    assert_eq!(
      reloaded.get(),
      &vec!["first".to_string(), "second".to_string()]
    );
  }

  #[test]
  fn test_never_written_key_yields_default() {
    let backend = Arc::new(MemoryState::new());

    let value: StoredValue<u32> = StoredValue::initialize(backend, "counter", 42);
    assert_eq!(*value.get(), 42);
  }

  #[test]
  fn test_corrupt_value_yields_default() {
    let backend = Arc::new(MemoryState::new());
    backend.write("tasks", "not json at all").unwrap();

    let value: StoredValue<Vec<String>> =
      StoredValue::initialize(backend, "tasks", vec!["fallback".to_string()]);
    assert_eq!(value.get(), &vec!["fallback".to_string()]);
  }

  #[test]
  fn test_initialization_is_read_only() {
    let backend = Arc::new(MemoryState::new());

    let _value: StoredValue<u32> = StoredValue::initialize(backend.clone(), "counter", 7);
    assert!(backend.read("counter").unwrap().is_none());
  }

  #[test]
  fn test_write_failure_still_updates_memory() {
    let mut value: StoredValue<String> =
      StoredValue::initialize(Arc::new(ReadOnlyState), "nebulaUser", String::new());

    value.set("stardust".to_string());
    assert_eq!(value.get(), "stardust");
  }

  #[test]
  fn test_update_derives_from_current() {
    let backend = Arc::new(MemoryState::new());

    let mut value: StoredValue<Vec<u32>> =
      StoredValue::initialize(backend.clone(), "list", vec![1]);
    value.update(|current| {
      let mut next = current.clone();
      next.push(2);
      next
    });

    assert_eq!(value.get(), &vec![1, 2]);
    assert_eq!(backend.read("list").unwrap().as_deref(), Some("[1,2]"));
  }
}
