//! Bucket storage backends: no-op, in-memory and SQLite.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::traits::{AssetRequest, AssetResponse, BucketStore};

/// Storage that doesn't cache anything.
/// Used when the offline cache is disabled - all operations are no-ops.
pub struct NoopBuckets;

impl BucketStore for NoopBuckets {
  fn put(&self, _bucket: &str, _request: &AssetRequest, _response: &AssetResponse) -> Result<()> {
    Ok(()) // Discard
  }

  fn get(&self, _bucket: &str, _request: &AssetRequest) -> Result<Option<AssetResponse>> {
    Ok(None) // Always miss
  }

  fn bucket_names(&self) -> Result<Vec<String>> {
    Ok(Vec::new()) // Nothing to sweep
  }

  fn delete_bucket(&self, _bucket: &str) -> Result<()> {
    Ok(())
  }
}

/// In-memory bucket storage.
///
/// Entries live as long as the process; mainly useful in tests.
#[derive(Default)]
pub struct MemoryBuckets {
  buckets: Mutex<HashMap<String, HashMap<String, AssetResponse>>>,
}

impl MemoryBuckets {
  pub fn new() -> Self {
    Self::default()
  }
}

impl BucketStore for MemoryBuckets {
  fn put(&self, bucket: &str, request: &AssetRequest, response: &AssetResponse) -> Result<()> {
    let mut buckets = self
      .buckets
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    buckets
      .entry(bucket.to_string())
      .or_default()
      .insert(request.cache_key(), response.clone());
    Ok(())
  }

  fn get(&self, bucket: &str, request: &AssetRequest) -> Result<Option<AssetResponse>> {
    let buckets = self
      .buckets
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(
      buckets
        .get(bucket)
        .and_then(|entries| entries.get(&request.cache_key()))
        .cloned(),
    )
  }

  fn bucket_names(&self) -> Result<Vec<String>> {
    let buckets = self
      .buckets
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(buckets.keys().cloned().collect())
  }

  fn delete_bucket(&self, bucket: &str) -> Result<()> {
    let mut buckets = self
      .buckets
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    buckets.remove(bucket);
    Ok(())
  }
}

/// SQLite-backed bucket storage.
pub struct SqliteBuckets {
  conn: Mutex<Connection>,
}

impl SqliteBuckets {
  /// Open the store at the default location.
  pub fn open() -> Result<Self> {
    Self::open_at(&Self::default_path()?)
  }

  /// Open the store at an explicit path.
  pub fn open_at(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open asset cache at {}: {}", path.display(), e))?;
    Self::from_connection(conn)
  }

  /// Open a store backed by an in-memory database (tests).
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory asset cache: {}", e))?;
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

    Ok(data_dir.join("nebula-canvas").join("assets.db"))
  }

  /// Run database migrations for the asset cache table.
  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(ASSET_SCHEMA)
      .map_err(|e| eyre!("Failed to run asset cache migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for the asset cache.
const ASSET_SCHEMA: &str = r#"
-- Cached response snapshots, keyed by generation bucket and request key
CREATE TABLE IF NOT EXISTS asset_cache (
    bucket TEXT NOT NULL,
    request_key TEXT NOT NULL,
    method TEXT NOT NULL,
    url TEXT NOT NULL,
    status INTEGER NOT NULL,
    body BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (bucket, request_key)
);

CREATE INDEX IF NOT EXISTS idx_asset_cache_bucket ON asset_cache(bucket);
"#;

impl BucketStore for SqliteBuckets {
  fn put(&self, bucket: &str, request: &AssetRequest, response: &AssetResponse) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO asset_cache (bucket, request_key, method, url, status, body, cached_at)
         VALUES (?, ?, ?, ?, ?, ?, datetime('now'))",
        params![
          bucket,
          request.cache_key(),
          request.method.as_str(),
          request.url,
          response.status,
          response.body,
        ],
      )
      .map_err(|e| eyre!("Failed to store cache entry: {}", e))?;

    Ok(())
  }

  fn get(&self, bucket: &str, request: &AssetRequest) -> Result<Option<AssetResponse>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare(
        "SELECT status, body FROM asset_cache
         WHERE bucket = ? AND request_key = ?",
      )
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let result: Option<(u16, Vec<u8>)> = stmt
      .query_row(params![bucket, request.cache_key()], |row| {
        Ok((row.get(0)?, row.get(1)?))
      })
      .ok();

    Ok(result.map(|(status, body)| AssetResponse::new(status, body)))
  }

  fn bucket_names(&self) -> Result<Vec<String>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare("SELECT DISTINCT bucket FROM asset_cache")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let names: Vec<String> = stmt
      .query_map([], |row| row.get(0))
      .map_err(|e| eyre!("Failed to query bucket names: {}", e))?
      .filter_map(|r| r.ok())
      .collect();

    Ok(names)
  }

  fn delete_bucket(&self, bucket: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute("DELETE FROM asset_cache WHERE bucket = ?", params![bucket])
      .map_err(|e| eyre!("Failed to delete bucket: {}", e))?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn request(url: &str) -> AssetRequest {
    AssetRequest::get(url).unwrap()
  }

  #[test]
  fn test_memory_put_overwrites_wholesale() {
    let store = MemoryBuckets::new();
    let req = request("https://app.test/main.js");

    store.put("v1", &req, &AssetResponse::new(200, b"old".to_vec())).unwrap();
    store.put("v1", &req, &AssetResponse::new(200, b"new".to_vec())).unwrap();

    let cached = store.get("v1", &req).unwrap().unwrap();
    assert_eq!(cached.body, b"new");
  }

  #[test]
  fn test_memory_buckets_are_isolated() {
    let store = MemoryBuckets::new();
    let req = request("https://app.test/main.js");

    store.put("v1", &req, &AssetResponse::new(200, b"one".to_vec())).unwrap();
    assert!(store.get("v2", &req).unwrap().is_none());

    store.delete_bucket("v1").unwrap();
    assert!(store.get("v1", &req).unwrap().is_none());
  }

  #[test]
  fn test_sqlite_round_trip() {
    let store = SqliteBuckets::open_in_memory().unwrap();
    let req = request("https://app.test/styles.css");
    let response = AssetResponse::new(200, b"body { margin: 0 }".to_vec());

    store.put("nebula-canvas-v1", &req, &response).unwrap();
    let cached = store.get("nebula-canvas-v1", &req).unwrap().unwrap();
    assert_eq!(cached, response);
  }

  #[test]
  fn test_sqlite_bucket_names_and_delete() {
    let store = SqliteBuckets::open_in_memory().unwrap();
    let req = request("https://app.test/index.html");
    let response = AssetResponse::new(200, b"<html>".to_vec());

    store.put("nebula-canvas-v1", &req, &response).unwrap();
    store.put("nebula-canvas-v2", &req, &response).unwrap();

    let mut names = store.bucket_names().unwrap();
    names.sort();
    assert_eq!(names, vec!["nebula-canvas-v1", "nebula-canvas-v2"]);

    store.delete_bucket("nebula-canvas-v1").unwrap();
    assert_eq!(store.bucket_names().unwrap(), vec!["nebula-canvas-v2"]);
    assert!(store.get("nebula-canvas-v1", &req).unwrap().is_none());
  }

  #[test]
  fn test_noop_always_misses() {
    let store = NoopBuckets;
    let req = request("https://app.test/index.html");

    store.put("v1", &req, &AssetResponse::new(200, b"ok".to_vec())).unwrap();
    assert!(store.get("v1", &req).unwrap().is_none());
    assert!(store.bucket_names().unwrap().is_empty());
  }
}
