//! One drawing session: stroke lifecycle, undo, and the save pipeline.

use base64::Engine;
use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use image::codecs::jpeg::JpegEncoder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::store::{StateBackend, StoredValue};

use super::history::History;
use super::surface::{Brush, Surface};

/// Storage key for the saved-drawings gallery.
pub const GALLERY_KEY: &str = "drawings";

/// Most recent records kept in the gallery; older ones are evicted.
pub const GALLERY_LIMIT: usize = 10;

/// Longest edge allowed in an exported image. Larger surfaces are
/// downscaled before encoding to bound storage growth.
pub const MAX_EXPORT_DIMENSION: u32 = 1024;

/// JPEG quality for exported drawings.
pub const EXPORT_JPEG_QUALITY: u8 = 80;

/// An immutable saved drawing: encoded bitmap plus creation time. Edits
/// produce a new record, never an in-place update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingRecord {
  /// JPEG bitmap as a data URI, embedded directly in the record.
  pub image: String,
  pub created_at: DateTime<Utc>,
}

/// A freehand drawing session over one surface, with per-stroke undo and
/// a durable gallery of committed drawings.
pub struct CanvasSession {
  surface: Surface,
  history: History,
  brush: Brush,
  stroke_active: bool,
  last_point: Option<(f32, f32)>,
  gallery: StoredValue<Vec<DrawingRecord>>,
  open_record: Option<usize>,
}

impl CanvasSession {
  /// Start a session for a container of the given logical size.
  pub fn new(
    backend: Arc<dyn StateBackend>,
    width: u32,
    height: u32,
    device_pixel_ratio: f32,
  ) -> Self {
    Self {
      surface: Surface::new(width, height, device_pixel_ratio),
      history: History::default(),
      brush: Brush::default(),
      stroke_active: false,
      last_point: None,
      gallery: StoredValue::initialize(backend, GALLERY_KEY, Vec::new()),
      open_record: None,
    }
  }

  pub fn surface(&self) -> &Surface {
    &self.surface
  }

  pub fn brush(&self) -> Brush {
    self.brush
  }

  pub fn set_brush(&mut self, brush: Brush) {
    self.brush = brush;
  }

  /// Committed drawings, newest first.
  pub fn gallery(&self) -> &[DrawingRecord] {
    self.gallery.get()
  }

  /// Index of the record open in the viewer overlay, if any.
  pub fn open_record(&self) -> Option<usize> {
    self.open_record
  }

  /// Begin a stroke: snapshot the bitmap for undo, then start the path.
  /// The snapshot is taken before the stroke's first pixel changes.
  pub fn pointer_down(&mut self, x: f32, y: f32) {
    self.history.push(self.surface.snapshot());
    self.surface.draw_segment((x, y), (x, y), &self.brush);
    self.stroke_active = true;
    self.last_point = Some((x, y));
  }

  /// Extend the active stroke; ignored when no button is held.
  pub fn pointer_move(&mut self, x: f32, y: f32) {
    if !self.stroke_active {
      return;
    }
    if let Some(last) = self.last_point {
      self.surface.draw_segment(last, (x, y), &self.brush);
    }
    self.last_point = Some((x, y));
  }

  /// Close the path on release or when the pointer leaves the surface.
  pub fn pointer_up(&mut self) {
    self.stroke_active = false;
    self.last_point = None;
  }

  /// Undo the most recent stroke. No-op when the history is empty.
  pub fn undo(&mut self) {
    if let Some(snapshot) = self.history.pop() {
      self.surface.restore(snapshot);
    }
  }

  /// Wipe the surface and the undo history.
  pub fn clear(&mut self) {
    self.surface.clear();
    self.history.clear();
    self.stroke_active = false;
    self.last_point = None;
  }

  /// Reallocate the surface for a new container size, keeping content.
  pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) {
    self.surface.resize(width, height, device_pixel_ratio);
  }

  /// Commit the surface to the gallery.
  ///
  /// A blank surface is not persisted: the save is skipped and `false`
  /// returned. On success the new record is prepended, the gallery is
  /// truncated to the newest [`GALLERY_LIMIT`] records, and the surface
  /// and history are cleared.
  pub fn save(&mut self) -> Result<bool> {
    if self.surface.is_blank() {
      debug!("Skipping save of a blank surface");
      return Ok(false);
    }

    let image = encode_data_uri(&self.surface)?;
    let record = DrawingRecord {
      image,
      created_at: Utc::now(),
    };

    let mut records = self.gallery.get().clone();
    records.insert(0, record);
    records.truncate(GALLERY_LIMIT);
    self.gallery.set(records);

    self.clear();
    Ok(true)
  }

  /// Open a record in the viewer overlay.
  pub fn open(&mut self, index: usize) {
    if index < self.gallery.get().len() {
      self.open_record = Some(index);
    }
  }

  /// Close the viewer overlay.
  pub fn close_viewer(&mut self) {
    self.open_record = None;
  }

  /// Remove a record by position. Closes the viewer if that record was
  /// open; records behind it shift down.
  pub fn delete(&mut self, index: usize) {
    let mut records = self.gallery.get().clone();
    if index >= records.len() {
      return;
    }
    records.remove(index);
    self.gallery.set(records);

    match self.open_record {
      Some(open) if open == index => self.open_record = None,
      Some(open) if open > index => self.open_record = Some(open - 1),
      _ => {}
    }
  }

  /// Decode a saved record back onto the live surface for further
  /// editing, replacing current content and resetting the history.
  /// Loading is not itself undoable.
  pub fn load_for_edit(&mut self, index: usize) -> Result<()> {
    let record = self
      .gallery
      .get()
      .get(index)
      .ok_or_else(|| eyre!("No drawing at index {}", index))?;

    let decoded = decode_data_uri(&record.image)?;
    self.surface.paint_image(&decoded);
    self.history.clear();
    self.stroke_active = false;
    self.last_point = None;
    self.open_record = None;
    Ok(())
  }
}

/// Downscale if oversized, flatten, and encode the surface as a JPEG data
/// URI.
fn encode_data_uri(surface: &Surface) -> Result<String> {
  let mut flattened = surface.flatten();

  let (w, h) = flattened.dimensions();
  let longest = w.max(h);
  if longest > MAX_EXPORT_DIMENSION {
    let scale = MAX_EXPORT_DIMENSION as f32 / longest as f32;
    let new_w = ((w as f32 * scale).round() as u32).max(1);
    let new_h = ((h as f32 * scale).round() as u32).max(1);
    flattened = image::imageops::resize(
      &flattened,
      new_w,
      new_h,
      image::imageops::FilterType::Triangle,
    );
  }

  let mut jpeg = Vec::new();
  let encoder = JpegEncoder::new_with_quality(&mut jpeg, EXPORT_JPEG_QUALITY);
  flattened
    .write_with_encoder(encoder)
    .map_err(|e| eyre!("Failed to encode drawing: {}", e))?;

  let payload = base64::engine::general_purpose::STANDARD.encode(&jpeg);
  Ok(format!("data:image/jpeg;base64,{}", payload))
}

/// Decode a data-URI image produced by [`encode_data_uri`].
fn decode_data_uri(uri: &str) -> Result<image::DynamicImage> {
  let payload = uri
    .split_once("base64,")
    .map(|(_, payload)| payload)
    .ok_or_else(|| eyre!("Not a base64 data URI"))?;

  let bytes = base64::engine::general_purpose::STANDARD
    .decode(payload)
    .map_err(|e| eyre!("Failed to decode drawing payload: {}", e))?;

  image::load_from_memory(&bytes).map_err(|e| eyre!("Failed to decode drawing image: {}", e))
}
