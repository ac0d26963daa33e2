//! Session-scoped undo history.

use image::RgbaImage;

/// Snapshots retained before the oldest is evicted.
pub const DEFAULT_UNDO_DEPTH: usize = 64;

/// Ordered stack of full-surface snapshots, one per stroke.
///
/// Bounded so memory use is proportional to the depth rather than the
/// session length. Never persisted: a reload keeps only the committed
/// gallery, not work in progress.
pub struct History {
  snapshots: Vec<RgbaImage>,
  depth: usize,
}

impl History {
  pub fn new(depth: usize) -> Self {
    Self {
      snapshots: Vec::new(),
      depth: depth.max(1),
    }
  }

  /// Push a pre-stroke snapshot, evicting the oldest at capacity.
  pub fn push(&mut self, snapshot: RgbaImage) {
    if self.snapshots.len() == self.depth {
      self.snapshots.remove(0);
    }
    self.snapshots.push(snapshot);
  }

  /// Pop the most recent snapshot.
  pub fn pop(&mut self) -> Option<RgbaImage> {
    self.snapshots.pop()
  }

  pub fn clear(&mut self) {
    self.snapshots.clear();
  }

  pub fn len(&self) -> usize {
    self.snapshots.len()
  }

  pub fn is_empty(&self) -> bool {
    self.snapshots.is_empty()
  }
}

impl Default for History {
  fn default() -> Self {
    Self::new(DEFAULT_UNDO_DEPTH)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn snapshot(width: u32) -> RgbaImage {
    RgbaImage::new(width, 1)
  }

  #[test]
  fn test_pop_returns_most_recent() {
    let mut history = History::new(4);
    history.push(snapshot(1));
    history.push(snapshot(2));

    assert_eq!(history.pop().unwrap().width(), 2);
    assert_eq!(history.pop().unwrap().width(), 1);
    assert!(history.pop().is_none());
  }

  #[test]
  fn test_capacity_evicts_oldest() {
    let mut history = History::new(2);
    history.push(snapshot(1));
    history.push(snapshot(2));
    history.push(snapshot(3));

    assert_eq!(history.len(), 2);
    assert_eq!(history.pop().unwrap().width(), 3);
    assert_eq!(history.pop().unwrap().width(), 2);
  }

  #[test]
  fn test_clear_empties_the_stack() {
    let mut history = History::default();
    history.push(snapshot(1));
    history.clear();
    assert!(history.is_empty());
  }
}
