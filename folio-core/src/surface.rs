//! Raster surface capability and the CPU implementation.
//!
//! The overlay never touches a concrete drawing API. Hosts hand it two
//! objects implementing [`RasterSurface`] (one for the canvas, one for the
//! minimap); [`SoftwareSurface`] is the in-memory backend used natively and
//! in tests.

use crate::points::Point;
use crate::raster::CHANNELS;
use crate::transforms::Mat3;
use crate::{OverlayError, Raster};
use serde::{Deserialize, Serialize};

/// Destination rectangle for a draw, in the coordinate space of the draw transform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DrawRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Minimal drawing capability the overlay needs from a rendering backend.
pub trait RasterSurface {
    /// Current (width, height) in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Resize the surface. Contents become transparent black.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), OverlayError>;

    /// Reset every pixel to transparent black.
    fn clear(&mut self) -> Result<(), OverlayError>;

    /// Draw `source` stretched to `dest`, with `transform` mapping `dest`'s
    /// coordinate space onto the surface. Composites source-over.
    fn draw_image(
        &mut self,
        source: &Raster,
        dest: DrawRect,
        transform: &Mat3,
    ) -> Result<(), OverlayError>;

    /// Copy of the surface contents.
    fn get_pixels(&self) -> Result<Raster, OverlayError>;

    /// Replace the surface contents. The raster must match the surface size.
    fn put_pixels(&mut self, raster: &Raster) -> Result<(), OverlayError>;
}

/// In-memory surface with a bilinear software rasterizer.
#[derive(Clone, Debug, Default)]
pub struct SoftwareSurface {
    pixels: Raster,
}

impl SoftwareSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: Raster::blank(width, height),
        }
    }

    /// Current contents without copying.
    pub fn raster(&self) -> &Raster {
        &self.pixels
    }
}

impl RasterSurface for SoftwareSurface {
    fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), OverlayError> {
        self.pixels = Raster::blank(width, height);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), OverlayError> {
        self.pixels.data_mut().fill(0);
        Ok(())
    }

    fn draw_image(
        &mut self,
        source: &Raster,
        dest: DrawRect,
        transform: &Mat3,
    ) -> Result<(), OverlayError> {
        if source.is_empty() || dest.width <= 0.0 || dest.height <= 0.0 {
            return Ok(());
        }
        let Some(inverse) = transform.inverse() else {
            // Collapsed transform draws nothing, same as a canvas
            return Ok(());
        };

        let (width, height) = self.pixels.dimensions();
        let Some((x0, y0, x1, y1)) = covered_pixels(&dest, transform, width, height) else {
            return Ok(());
        };

        let scale_x = source.width() as f64 / dest.width;
        let scale_y = source.height() as f64 / dest.height;

        for py in y0..y1 {
            for px in x0..x1 {
                let local = inverse.apply(Point::new(px as f64 + 0.5, py as f64 + 0.5));
                let u = (local.x - dest.x) * scale_x;
                let v = (local.y - dest.y) * scale_y;
                if u < 0.0 || v < 0.0 || u >= source.width() as f64 || v >= source.height() as f64
                {
                    continue;
                }

                let sample = sample_bilinear(source, u, v);
                let idx = (py as usize * width as usize + px as usize) * CHANNELS;
                let target = &mut self.pixels.data_mut()[idx..idx + CHANNELS];
                composite_over(target, sample);
            }
        }

        Ok(())
    }

    fn get_pixels(&self) -> Result<Raster, OverlayError> {
        Ok(self.pixels.clone())
    }

    fn put_pixels(&mut self, raster: &Raster) -> Result<(), OverlayError> {
        if raster.dimensions() != self.pixels.dimensions() {
            let (w, h) = self.pixels.dimensions();
            return Err(OverlayError::Surface(format!(
                "cannot put {}x{} pixels on a {}x{} surface",
                raster.width(),
                raster.height(),
                w,
                h
            )));
        }
        self.pixels.data_mut().copy_from_slice(raster.data());
        Ok(())
    }
}

/// Pixel bounds (x0, y0, x1, y1), end-exclusive, touched by the transformed rectangle.
fn covered_pixels(
    dest: &DrawRect,
    transform: &Mat3,
    width: u32,
    height: u32,
) -> Option<(u32, u32, u32, u32)> {
    let corners = [
        (dest.x, dest.y),
        (dest.x + dest.width, dest.y),
        (dest.x, dest.y + dest.height),
        (dest.x + dest.width, dest.y + dest.height),
    ]
    .map(|(x, y)| transform.apply(Point::new(x, y)));

    let min_x = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let max_x = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let min_y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_y = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

    let x0 = min_x.floor().max(0.0) as u32;
    let y0 = min_y.floor().max(0.0) as u32;
    let x1 = (max_x.ceil().max(0.0) as u32).min(width);
    let y1 = (max_y.ceil().max(0.0) as u32).min(height);

    (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
}

/// Bilinear sample at continuous source coordinates; pixel centers sit at `i + 0.5`.
fn sample_bilinear(source: &Raster, u: f64, v: f64) -> [f64; 4] {
    let max_x = source.width() as f64 - 1.0;
    let max_y = source.height() as f64 - 1.0;
    let sx = (u - 0.5).clamp(0.0, max_x);
    let sy = (v - 0.5).clamp(0.0, max_y);

    let x0 = sx.floor() as usize;
    let y0 = sy.floor() as usize;
    let x1 = (x0 + 1).min(source.width() as usize - 1);
    let y1 = (y0 + 1).min(source.height() as usize - 1);
    let fx = sx - x0 as f64;
    let fy = sy - y0 as f64;

    let stride = source.width() as usize;
    let data = source.data();
    let at = |x: usize, y: usize, c: usize| data[(y * stride + x) * CHANNELS + c] as f64;

    let w00 = (1.0 - fx) * (1.0 - fy);
    let w10 = fx * (1.0 - fy);
    let w01 = (1.0 - fx) * fy;
    let w11 = fx * fy;

    let mut out = [0.0; 4];
    for (c, value) in out.iter_mut().enumerate() {
        *value = at(x0, y0, c) * w00
            + at(x1, y0, c) * w10
            + at(x0, y1, c) * w01
            + at(x1, y1, c) * w11;
    }
    out
}

/// Source-over compositing in straight alpha.
fn composite_over(target: &mut [u8], sample: [f64; 4]) {
    let src_a = sample[3] / 255.0;
    if src_a >= 1.0 {
        for (dst, src) in target.iter_mut().zip(sample) {
            *dst = src.round().clamp(0.0, 255.0) as u8;
        }
        return;
    }
    if src_a <= 0.0 {
        return;
    }

    let dst_a = target[3] as f64 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    for (dst, src) in target[..3].iter_mut().zip(sample) {
        let blended = (src * src_a + *dst as f64 * dst_a * (1.0 - src_a)) / out_a;
        *dst = blended.round().clamp(0.0, 255.0) as u8;
    }
    target[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}
