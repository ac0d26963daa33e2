//! Workspace assembly: configuration to storage, cache and dashboard
//! wiring.

use color_eyre::Result;
use std::sync::Arc;

use crate::cache::{
  BucketStore, CacheController, HttpFetcher, NoopBuckets, SqliteBuckets, ASSET_CACHE_GENERATION,
};
use crate::canvas::CanvasSession;
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::store::{SqliteState, StateBackend};

/// A fully wired workspace: dashboard sections, canvas sessions and the
/// offline cache, all sharing one configuration.
pub struct Workspace {
  backend: Arc<dyn StateBackend>,
  pub dashboard: Dashboard,
  pub cache: CacheController<Arc<dyn BucketStore>>,
}

impl Workspace {
  /// Open the workspace described by `config`.
  pub fn open(config: &Config) -> Result<Self> {
    let data_dir = config.data_dir()?;

    let backend: Arc<dyn StateBackend> =
      Arc::new(SqliteState::open_at(&data_dir.join("state.db"))?);

    let buckets: Arc<dyn BucketStore> = if config.disable_cache {
      Arc::new(NoopBuckets)
    } else {
      Arc::new(SqliteBuckets::open_at(&data_dir.join("assets.db"))?)
    };
    let cache = CacheController::new(buckets, Arc::new(HttpFetcher::new()), ASSET_CACHE_GENERATION);

    Ok(Self {
      dashboard: Dashboard::new(Arc::clone(&backend)),
      backend,
      cache,
    })
  }

  /// Start a canvas session against this workspace's storage.
  pub fn canvas(&self, width: u32, height: u32, device_pixel_ratio: f32) -> CanvasSession {
    CanvasSession::new(Arc::clone(&self.backend), width, height, device_pixel_ratio)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn scratch_config(label: &str) -> Config {
    let dir = std::env::temp_dir().join(format!(
      "nebula-workspace-{}-{}-{}",
      label,
      std::process::id(),
      Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));
    Config {
      data_dir: Some(dir),
      disable_cache: true,
      log_filter: None,
    }
  }

  #[test]
  fn test_workspace_state_survives_reopen() {
    let config = scratch_config("reopen");

    {
      let mut workspace = Workspace::open(&config).unwrap();
      workspace.dashboard.notes.add("persisted", "across opens").unwrap();
    }

    let workspace = Workspace::open(&config).unwrap();
    assert_eq!(workspace.dashboard.notes.list().len(), 1);
    assert_eq!(workspace.dashboard.notes.list()[0].title, "persisted");
  }

  #[test]
  fn test_canvas_shares_workspace_storage() {
    let config = scratch_config("canvas");

    let workspace = Workspace::open(&config).unwrap();
    let mut session = workspace.canvas(40, 30, 1.0);
    session.pointer_down(10.0, 10.0);
    session.pointer_up();
    assert!(session.save().unwrap());

    let reloaded = workspace.canvas(40, 30, 1.0);
    assert_eq!(reloaded.gallery().len(), 1);
  }
}
