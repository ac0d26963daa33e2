//! Core types and trait seams for the offline asset cache.

use color_eyre::{eyre::eyre, Result};
use futures::future::BoxFuture;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Request method of an intercepted fetch.
///
/// Only `Get` participates in caching; everything else passes through to
/// the network untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
  Get,
  Head,
  Post,
  Put,
  Patch,
  Delete,
}

impl Method {
  /// Whether responses to this method may be replayed from a stored
  /// snapshot. Caching non-idempotent requests risks serving stale
  /// side-effect results, so only GET qualifies.
  pub fn is_cacheable(self) -> bool {
    matches!(self, Method::Get)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Method::Get => "GET",
      Method::Head => "HEAD",
      Method::Post => "POST",
      Method::Put => "PUT",
      Method::Patch => "PATCH",
      Method::Delete => "DELETE",
    }
  }
}

/// Identity of an intercepted request: method plus normalized URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
  pub method: Method,
  pub url: String,
}

impl AssetRequest {
  /// Create a request, normalizing the URL so equivalent spellings share
  /// one cache entry.
  pub fn new(method: Method, url: &str) -> Result<Self> {
    let parsed = url::Url::parse(url).map_err(|e| eyre!("Invalid request URL {}: {}", url, e))?;
    Ok(Self {
      method,
      url: parsed.to_string(),
    })
  }

  /// Shorthand for the common GET case.
  pub fn get(url: &str) -> Result<Self> {
    Self::new(Method::Get, url)
  }

  /// Stable fixed-length key for this request.
  pub fn cache_key(&self) -> String {
    let input = format!("{} {}", self.method.as_str(), self.url);

    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
  }
}

/// Immutable snapshot of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
  pub status: u16,
  pub body: Vec<u8>,
}

impl AssetResponse {
  pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
    Self {
      status,
      body: body.into(),
    }
  }

  /// HTTP-level success, not just the absence of a transport error.
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeSource {
  /// Cached copy, returned without waiting on the network.
  CacheHit,
  /// Fetched from the network on a cache miss.
  Network,
  /// Non-cacheable request forwarded untouched.
  Passthrough,
}

/// Outcome of one intercepted request.
///
/// `revalidation` carries the background refresh task spawned on a cache
/// hit. The serving path never waits on it; tests can await it to observe
/// the cache settle.
#[derive(Debug)]
pub struct Served {
  pub response: AssetResponse,
  pub source: ServeSource,
  pub revalidation: Option<tokio::task::JoinHandle<()>>,
}

/// Storage for named cache buckets, one bucket per cache generation.
///
/// Buckets come into existence with their first `put`. Entries are
/// overwritten wholesale, never mutated in place.
pub trait BucketStore: Send + Sync {
  /// Store a response snapshot under the request's key.
  fn put(&self, bucket: &str, request: &AssetRequest, response: &AssetResponse) -> Result<()>;

  /// Look up a cached response for the request.
  fn get(&self, bucket: &str, request: &AssetRequest) -> Result<Option<AssetResponse>>;

  /// Names of every bucket currently present.
  fn bucket_names(&self) -> Result<Vec<String>>;

  /// Delete a bucket and everything in it.
  fn delete_bucket(&self, bucket: &str) -> Result<()>;
}

impl<S: BucketStore + ?Sized> BucketStore for Arc<S> {
  fn put(&self, bucket: &str, request: &AssetRequest, response: &AssetResponse) -> Result<()> {
    (**self).put(bucket, request, response)
  }

  fn get(&self, bucket: &str, request: &AssetRequest) -> Result<Option<AssetResponse>> {
    (**self).get(bucket, request)
  }

  fn bucket_names(&self) -> Result<Vec<String>> {
    (**self).bucket_names()
  }

  fn delete_bucket(&self, bucket: &str) -> Result<()> {
    (**self).delete_bucket(bucket)
  }
}

/// Network seam used by the cache controller.
pub trait Fetcher: Send + Sync {
  /// Perform the request over the network.
  fn fetch(&self, request: &AssetRequest) -> BoxFuture<'static, Result<AssetResponse>>;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_only_get_is_cacheable() {
    assert!(Method::Get.is_cacheable());
    for method in [
      Method::Head,
      Method::Post,
      Method::Put,
      Method::Patch,
      Method::Delete,
    ] {
      assert!(!method.is_cacheable());
    }
  }

  #[test]
  fn test_cache_key_ignores_url_spelling() {
    let a = AssetRequest::get("https://app.test/index.html").unwrap();
    let b = AssetRequest::get("HTTPS://APP.test/index.html").unwrap();
    assert_eq!(a.cache_key(), b.cache_key());
  }

  #[test]
  fn test_cache_key_distinguishes_methods() {
    let get = AssetRequest::new(Method::Get, "https://app.test/api").unwrap();
    let post = AssetRequest::new(Method::Post, "https://app.test/api").unwrap();
    assert_ne!(get.cache_key(), post.cache_key());
  }

  #[test]
  fn test_success_is_http_level() {
    assert!(AssetResponse::new(200, b"ok".to_vec()).is_success());
    assert!(AssetResponse::new(204, Vec::new()).is_success());
    assert!(!AssetResponse::new(304, Vec::new()).is_success());
    assert!(!AssetResponse::new(404, b"missing".to_vec()).is_success());
    assert!(!AssetResponse::new(500, Vec::new()).is_success());
  }
}
