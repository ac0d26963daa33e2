//! Persistent state store: typed values over string-keyed durable storage.
//!
//! Every feature keeps its view state in a [`StoredValue`] so the
//! serialize/deserialize/fallback discipline lives in one place instead of
//! being re-implemented per section.

mod backend;
mod value;

pub use backend::{MemoryState, SqliteState, StateBackend};
pub use value::StoredValue;
