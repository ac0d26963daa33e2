use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
///
/// Everything is optional: the app runs entirely on defaults when no
/// config file exists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  /// Override for the directory holding state.db, assets.db and logs.
  pub data_dir: Option<PathBuf>,
  /// Disable the offline asset cache (every request goes to the network).
  #[serde(default)]
  pub disable_cache: bool,
  /// Log filter directive, e.g. "nebula_canvas=debug".
  pub log_filter: Option<String>,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./nebula.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/nebula-canvas/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("nebula.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("nebula-canvas").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Directory for durable state, the asset cache, and logs.
  pub fn data_dir(&self) -> Result<PathBuf> {
    if let Some(dir) = &self.data_dir {
      return Ok(dir.clone());
    }

    dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .map(|p| p.join("nebula-canvas"))
      .ok_or_else(|| eyre!("Could not determine data directory"))
  }
}
