//! State storage backends: in-memory and SQLite.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Durable string-keyed storage for serialized view state.
///
/// Last write wins; writers are not coordinated across processes. Each
/// feature owns its keys and the shape of the values under them.
pub trait StateBackend: Send + Sync {
  /// Read the serialized value at `key`, if any.
  fn read(&self, key: &str) -> Result<Option<String>>;

  /// Write the serialized value at `key`, replacing any previous value.
  fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory backend for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryState {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryState {
  pub fn new() -> Self {
    Self::default()
  }
}

impl StateBackend for MemoryState {
  fn read(&self, key: &str) -> Result<Option<String>> {
    let entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(entries.get(key).cloned())
  }

  fn write(&self, key: &str, value: &str) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    entries.insert(key.to_string(), value.to_string());
    Ok(())
  }
}

/// SQLite-backed state storage.
pub struct SqliteState {
  conn: Mutex<Connection>,
}

impl SqliteState {
  /// Open the store at the default location.
  pub fn open() -> Result<Self> {
    Self::open_at(&Self::default_path()?)
  }

  /// Open the store at an explicit path.
  pub fn open_at(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create state directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open state store at {}: {}", path.display(), e))?;
    Self::from_connection(conn)
  }

  /// Open a store backed by an in-memory database (tests).
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory state store: {}", e))?;
    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;
    Ok(storage)
  }

  /// Get the default database path.
  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("nebula-canvas").join("state.db"))
  }

  /// Run database migrations for the state table.
  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(STATE_SCHEMA)
      .map_err(|e| eyre!("Failed to run state store migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for the state store.
const STATE_SCHEMA: &str = r#"
-- Serialized view state, one row per feature key
CREATE TABLE IF NOT EXISTS app_state (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl StateBackend for SqliteState {
  fn read(&self, key: &str) -> Result<Option<String>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare("SELECT value FROM app_state WHERE key = ?")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let value: Option<String> = stmt.query_row(params![key], |row| row.get(0)).ok();
    Ok(value)
  }

  fn write(&self, key: &str, value: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO app_state (key, value, updated_at)
         VALUES (?, ?, datetime('now'))",
        params![key, value],
      )
      .map_err(|e| eyre!("Failed to write state: {}", e))?;

    Ok(())
  }
}
