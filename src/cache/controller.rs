//! Intercept policy: stale-while-revalidate over generational buckets.

use color_eyre::Result;
use std::sync::Arc;
use tracing::{debug, warn};

use super::traits::{AssetRequest, BucketStore, Fetcher, ServeSource, Served};

/// Decides, per intercepted request, whether to serve from cache, network,
/// or both, and sweeps superseded cache generations.
///
/// Construction is the install step: nothing is pre-populated, the current
/// generation's bucket fills lazily as requests are served. [`activate`]
/// must run to completion before the new generation is treated as live.
///
/// [`activate`]: CacheController::activate
pub struct CacheController<S> {
  buckets: Arc<S>,
  fetcher: Arc<dyn Fetcher>,
  generation: String,
}

impl<S: BucketStore + 'static> CacheController<S> {
  /// Create a controller serving from the named cache generation.
  pub fn new(buckets: S, fetcher: Arc<dyn Fetcher>, generation: impl Into<String>) -> Self {
    Self {
      buckets: Arc::new(buckets),
      fetcher,
      generation: generation.into(),
    }
  }

  /// Name of the current cache generation.
  pub fn generation(&self) -> &str {
    &self.generation
  }

  /// Delete every bucket that is not the current generation.
  ///
  /// Callers must run this to completion before serving from the new
  /// generation, so no request can be answered from a bucket that is
  /// mid-deletion.
  pub fn activate(&self) -> Result<()> {
    for name in self.buckets.bucket_names()? {
      if name != self.generation {
        self.buckets.delete_bucket(&name)?;
        debug!("Deleted superseded cache generation {}", name);
      }
    }
    Ok(())
  }

  /// Intercept one request.
  ///
  /// Non-GET requests pass through untouched. A GET with a cached entry is
  /// answered immediately from the bucket while a background task
  /// refreshes the entry; a miss waits on the network and stores
  /// successful responses before returning them. A transport failure on
  /// the miss path is the only error surfaced to the caller.
  pub async fn handle(&self, request: AssetRequest) -> Result<Served> {
    if !request.method.is_cacheable() {
      let response = self.fetcher.fetch(&request).await?;
      return Ok(Served {
        response,
        source: ServeSource::Passthrough,
        revalidation: None,
      });
    }

    // Storage trouble must not fail the request; degrade to the network.
    let cached = match self.buckets.get(&self.generation, &request) {
      Ok(entry) => entry,
      Err(e) => {
        warn!("Cache lookup for {} failed: {}", request.url, e);
        None
      }
    };

    if let Some(response) = cached {
      let revalidation = self.spawn_revalidation(request);
      return Ok(Served {
        response,
        source: ServeSource::CacheHit,
        revalidation: Some(revalidation),
      });
    }

    let response = self.fetcher.fetch(&request).await?;
    if response.is_success() {
      if let Err(e) = self.buckets.put(&self.generation, &request, &response) {
        warn!("Failed to cache response for {}: {}", request.url, e);
      }
    }
    Ok(Served {
      response,
      source: ServeSource::Network,
      revalidation: None,
    })
  }

  /// Refresh a cached entry without blocking the response already served.
  ///
  /// Nothing here may fail the request that triggered it, so every
  /// failure is swallowed after logging.
  fn spawn_revalidation(&self, request: AssetRequest) -> tokio::task::JoinHandle<()> {
    let buckets = Arc::clone(&self.buckets);
    let fetcher = Arc::clone(&self.fetcher);
    let generation = self.generation.clone();

    tokio::spawn(async move {
      match fetcher.fetch(&request).await {
        Ok(response) if response.is_success() => {
          if let Err(e) = buckets.put(&generation, &request, &response) {
            warn!("Failed to refresh cache entry for {}: {}", request.url, e);
          }
        }
        Ok(response) => {
          debug!(
            "Skipped cache refresh for {} (status {})",
            request.url, response.status
          );
        }
        Err(e) => {
          debug!("Background refresh for {} failed: {}", request.url, e);
        }
      }
    })
  }
}

impl<S: BucketStore> Clone for CacheController<S> {
  fn clone(&self) -> Self {
    Self {
      buckets: Arc::clone(&self.buckets),
      fetcher: Arc::clone(&self.fetcher),
      generation: self.generation.clone(),
    }
  }
}
