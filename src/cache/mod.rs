//! Offline asset cache: generational buckets behind a stale-while-revalidate
//! serve policy.
//!
//! The controller sits at the network boundary and decides per request
//! whether to serve from cache, network, or both:
//! - only GET requests are ever cached
//! - a cache hit is answered immediately and refreshed in the background
//! - a cache miss waits on the network and stores successful responses
//! - activation sweeps every bucket except the current generation

mod controller;
mod http;
mod storage;
mod traits;

pub use controller::CacheController;
pub use http::HttpFetcher;
pub use storage::{MemoryBuckets, NoopBuckets, SqliteBuckets};
pub use traits::{AssetRequest, AssetResponse, BucketStore, Fetcher, Method, ServeSource, Served};

/// Versioned name of the current cache generation; bumped on deploy so the
/// activation sweep invalidates everything cached by earlier versions.
pub const ASSET_CACHE_GENERATION: &str = "nebula-canvas-v1";
