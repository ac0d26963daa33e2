//! Freehand drawing surface.

use image::{imageops, Rgb, RgbImage, Rgba, RgbaImage};

/// Backdrop the UI paints behind the transparent surface; unpainted pixels
/// flatten onto it at export time.
const BACKDROP: [u8; 3] = [30, 41, 59];

/// Brush settings for stroke rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
  /// RGBA stroke color.
  pub color: [u8; 4],
  /// Stroke diameter in logical pixels.
  pub size: f32,
}

impl Default for Brush {
  fn default() -> Self {
    Self {
      color: [255, 255, 255, 255],
      size: 5.0,
    }
  }
}

/// The live drawing bitmap, allocated at device-pixel-ratio-scaled
/// dimensions so strokes stay crisp on high-density displays.
///
/// Coordinates passed to drawing methods are logical (container) pixels;
/// the surface applies the scale factor itself.
pub struct Surface {
  image: RgbaImage,
  device_pixel_ratio: f32,
}

impl Surface {
  /// Allocate a blank surface for a container of the given logical size.
  pub fn new(width: u32, height: u32, device_pixel_ratio: f32) -> Self {
    let dpr = device_pixel_ratio.max(1.0);
    Self {
      image: RgbaImage::new(scaled(width, dpr), scaled(height, dpr)),
      device_pixel_ratio: dpr,
    }
  }

  /// Bitmap width in physical pixels.
  pub fn width(&self) -> u32 {
    self.image.width()
  }

  /// Bitmap height in physical pixels.
  pub fn height(&self) -> u32 {
    self.image.height()
  }

  pub fn device_pixel_ratio(&self) -> f32 {
    self.device_pixel_ratio
  }

  /// True while no stroke has painted any pixel.
  pub fn is_blank(&self) -> bool {
    self.image.pixels().all(|pixel| pixel.0[3] == 0)
  }

  /// Erase everything back to transparency.
  pub fn clear(&mut self) {
    for pixel in self.image.pixels_mut() {
      *pixel = Rgba([0, 0, 0, 0]);
    }
  }

  /// Reallocate for a new container size, rescaling prior content so a
  /// mid-session resize does not discard work in progress.
  pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) {
    let dpr = device_pixel_ratio.max(1.0);
    let (w, h) = (scaled(width, dpr), scaled(height, dpr));
    if (w, h) != self.image.dimensions() {
      self.image = imageops::resize(&self.image, w, h, imageops::FilterType::Triangle);
    }
    self.device_pixel_ratio = dpr;
  }

  /// Stamp a round brush cap centered on a logical point.
  fn stamp(&mut self, x: f32, y: f32, brush: &Brush) {
    let (w, h) = self.image.dimensions();
    if w == 0 || h == 0 {
      return;
    }

    let dpr = self.device_pixel_ratio;
    let cx = x * dpr;
    let cy = y * dpr;
    let radius = (brush.size * dpr / 2.0).max(0.5);

    let min_x = (cx - radius).floor().max(0.0) as u32;
    let min_y = (cy - radius).floor().max(0.0) as u32;
    let max_x = (cx + radius).ceil().clamp(0.0, w as f32 - 1.0) as u32;
    let max_y = (cy + radius).ceil().clamp(0.0, h as f32 - 1.0) as u32;

    for py in min_y..=max_y {
      for px in min_x..=max_x {
        let dx = px as f32 + 0.5 - cx;
        let dy = py as f32 + 0.5 - cy;
        if dx * dx + dy * dy <= radius * radius {
          self.image.put_pixel(px, py, Rgba(brush.color));
        }
      }
    }
  }

  /// Render a stroke segment between two logical points, with round caps
  /// at both ends.
  pub fn draw_segment(&mut self, from: (f32, f32), to: (f32, f32), brush: &Brush) {
    let length = ((to.0 - from.0) * self.device_pixel_ratio)
      .hypot((to.1 - from.1) * self.device_pixel_ratio);
    let steps = length.ceil().max(1.0) as u32;

    for i in 0..=steps {
      let t = i as f32 / steps as f32;
      self.stamp(
        from.0 + (to.0 - from.0) * t,
        from.1 + (to.1 - from.1) * t,
        brush,
      );
    }
  }

  /// Full-bitmap copy for the undo history.
  pub fn snapshot(&self) -> RgbaImage {
    self.image.clone()
  }

  /// Repaint from a snapshot. A snapshot taken at other dimensions (the
  /// surface was resized since) is rescaled to fit.
  pub fn restore(&mut self, snapshot: RgbaImage) {
    if snapshot.dimensions() == self.image.dimensions() {
      self.image = snapshot;
    } else {
      let (w, h) = self.image.dimensions();
      self.image = imageops::resize(&snapshot, w, h, imageops::FilterType::Triangle);
    }
  }

  /// Replace the content with an arbitrary image scaled to the surface.
  pub fn paint_image(&mut self, source: &image::DynamicImage) {
    let (w, h) = self.image.dimensions();
    self.image = imageops::resize(&source.to_rgba8(), w, h, imageops::FilterType::Triangle);
  }

  /// Flatten to opaque RGB for lossy export; unpainted pixels take the
  /// backdrop color.
  pub fn flatten(&self) -> RgbImage {
    let (w, h) = self.image.dimensions();
    let mut out = RgbImage::new(w, h);

    for (x, y, pixel) in self.image.enumerate_pixels() {
      let [r, g, b, a] = pixel.0;
      let alpha = a as u32;
      let blend =
        |fg: u8, bg: u8| ((fg as u32 * alpha + bg as u32 * (255 - alpha)) / 255) as u8;
      out.put_pixel(
        x,
        y,
        Rgb([
          blend(r, BACKDROP[0]),
          blend(g, BACKDROP[1]),
          blend(b, BACKDROP[2]),
        ]),
      );
    }

    out
  }
}

fn scaled(dimension: u32, dpr: f32) -> u32 {
  ((dimension as f32) * dpr).round().max(1.0) as u32
}
