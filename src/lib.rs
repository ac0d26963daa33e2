//! Core of an offline-first, single-user productivity workspace: notes,
//! tasks and a freehand canvas over durable local storage, plus the asset
//! cache that keeps the app usable without a network.
//!
//! Rendering, routing and widgets are external collaborators; this crate
//! owns the pieces with invariants worth testing:
//!
//! - [`cache`] - generational asset cache with a stale-while-revalidate
//!   serve policy
//! - [`store`] - typed values synchronized with durable storage
//! - [`canvas`] - drawing sessions with per-stroke undo and a bounded
//!   gallery
//! - [`dashboard`] - the feature collections built on the store
//!
//! [`Workspace::open`](workspace::Workspace::open) wires everything from a
//! [`Config`].

pub mod cache;
pub mod canvas;
pub mod config;
pub mod dashboard;
pub mod logging;
pub mod store;
pub mod workspace;

pub use config::Config;
pub use workspace::Workspace;
