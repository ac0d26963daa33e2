//! Log initialization: env-filtered tracing to a rolling file.

use color_eyre::{eyre::eyre, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Log lines go to a daily-rolling file under `data_dir/logs`. The
/// returned guard must be held for the life of the process; dropping it
/// flushes and stops the background writer.
pub fn init(data_dir: &Path, filter: Option<&str>) -> Result<WorkerGuard> {
  let log_dir = data_dir.join("logs");
  std::fs::create_dir_all(&log_dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", log_dir.display(), e))?;

  let appender = tracing_appender::rolling::daily(&log_dir, "nebula.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = match filter {
    Some(directive) => {
      EnvFilter::try_new(directive).map_err(|e| eyre!("Invalid log filter: {}", e))?
    }
    None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| eyre!("Failed to install tracing subscriber: {}", e))?;

  Ok(guard)
}
