//! RGBA pixel grid for one texture face

use std::io::Cursor;

use base64::Engine;
use image::{imageops::FilterType, ImageFormat, RgbaImage};

use crate::error::{AssetError, AssetResult};

/// RGBA color
pub type Rgba = [u8; 4];

pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// Fallback color for textures that cannot be decoded
pub const MAGENTA: Rgba = [255, 0, 255, 255];

/// One pixel of a [`super::RasterDelta::Pixels`] edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWrite {
    pub x: usize,
    pub y: usize,
    pub color: Rgba,
}

/// Row-major RGBA pixel buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl RasterBuffer {
    /// Transparent buffer
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    pub fn filled(width: usize, height: usize, color: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    /// Decode any supported image and resize it (nearest neighbour) to `size`×`size`
    pub fn from_image_bytes(bytes: &[u8], size: usize) -> AssetResult<Self> {
        let img = image::load_from_memory(bytes).map_err(|e| AssetError::decode("texture", e))?;
        let side = size as u32;
        let rgba = if img.width() == side && img.height() == side {
            img.to_rgba8()
        } else {
            image::imageops::resize(&img.to_rgba8(), side, side, FilterType::Nearest)
        };
        Ok(Self::from_rgba_image(&rgba))
    }

    pub fn from_rgba_image(img: &RgbaImage) -> Self {
        Self {
            width: img.width() as usize,
            height: img.height() as usize,
            pixels: img.pixels().map(|p| p.0).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Out-of-bounds writes are ignored
    pub fn set(&mut self, x: usize, y: usize, color: Rgba) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    pub fn apply(&mut self, writes: &[PixelWrite]) {
        for w in writes {
            self.set(w.x, w.y, w.color);
        }
    }

    pub fn same_size(&self, other: &RasterBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Pixels of the segment from `from` to `to` that lie on this buffer
    ///
    /// The segment is clipped to the buffer before rasterizing, so endpoints
    /// far outside cost nothing.
    pub fn line(&self, from: (i32, i32), to: (i32, i32)) -> Vec<(usize, usize)> {
        let Some((a, b)) = clip_segment(from, to, self.width, self.height) else {
            return Vec::new();
        };
        line_points(a.0, a.1, b.0, b.1)
            .into_iter()
            .filter(|&(x, y)| self.in_bounds(x, y))
            .map(|(x, y)| (x as usize, y as usize))
            .collect()
    }

    /// Pixels of the 4-connected region around (x, y) sharing its color
    pub fn fill_region(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let Some(target) = self.get(x, y) else {
            return Vec::new();
        };

        let mut visited = vec![false; self.pixels.len()];
        let mut region = Vec::new();
        let mut stack = vec![(x, y)];
        while let Some((cx, cy)) = stack.pop() {
            let idx = cy * self.width + cx;
            if visited[idx] || self.pixels[idx] != target {
                continue;
            }
            visited[idx] = true;
            region.push((cx, cy));

            if cx > 0 {
                stack.push((cx - 1, cy));
            }
            if cx + 1 < self.width {
                stack.push((cx + 1, cy));
            }
            if cy > 0 {
                stack.push((cx, cy - 1));
            }
            if cy + 1 < self.height {
                stack.push((cx, cy + 1));
            }
        }
        region
    }

    pub fn to_rgba_image(&self) -> AssetResult<RgbaImage> {
        let raw: Vec<u8> = self.pixels.iter().flat_map(|p| p.iter().copied()).collect();
        RgbaImage::from_raw(self.width as u32, self.height as u32, raw)
            .ok_or_else(|| AssetError::Session(format!("invalid {}x{} buffer", self.width, self.height)))
    }

    pub fn to_png(&self) -> AssetResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.to_rgba_image()?
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| AssetError::Session(format!("PNG encoding failed: {}", e)))?;
        Ok(bytes)
    }

    /// `data:image/png;base64,...`
    pub fn to_data_uri(&self) -> AssetResult<String> {
        let png = self.to_png()?;
        Ok(format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(png)
        ))
    }
}

/// Integer points from (x0, y0) to (x1, y1) inclusive, Bresenham
///
/// Produces one point per step; clip long segments first (see
/// [`RasterBuffer::line`]).
pub fn line_points(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(i32, i32)> {
    let (x0, y0, x1, y1) = (i64::from(x0), i64::from(y0), i64::from(x1), i64::from(y1));
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;
    let mut points = Vec::new();

    loop {
        // x and y stay between the i32 endpoints
        points.push((x as i32, y as i32));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    points
}

/// Liang-Barsky clip of a segment to `[0, width) x [0, height)`
fn clip_segment(
    from: (i32, i32),
    to: (i32, i32),
    width: usize,
    height: usize,
) -> Option<((i32, i32), (i32, i32))> {
    if width == 0 || height == 0 {
        return None;
    }
    let (x0, y0) = (f64::from(from.0), f64::from(from.1));
    let dx = f64::from(to.0) - x0;
    let dy = f64::from(to.1) - y0;
    let x_max = (width - 1) as f64;
    let y_max = (height - 1) as f64;

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [(-dx, x0), (dx, x_max - x0), (-dy, y0), (dy, y_max - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| {
        (
            (x0 + t * dx).round().clamp(0.0, x_max) as i32,
            (y0 + t * dy).round().clamp(0.0, y_max) as i32,
        )
    };
    Some((at(t0), at(t1)))
}
