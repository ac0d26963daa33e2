//! Freehand canvas: a drawing surface with per-stroke undo and a durable
//! gallery of committed drawings.
//!
//! Work in progress is session-scoped; only saved drawings survive a
//! reload, as immutable [`DrawingRecord`] entries in the gallery.

mod history;
mod session;
mod surface;

pub use history::{History, DEFAULT_UNDO_DEPTH};
pub use session::{
  CanvasSession, DrawingRecord, EXPORT_JPEG_QUALITY, GALLERY_KEY, GALLERY_LIMIT,
  MAX_EXPORT_DIMENSION,
};
pub use surface::{Brush, Surface};
