//! Surface geometry for the main canvas and the minimap.

use crate::points::Point;
use crate::surface::DrawRect;
use crate::transforms::{compose_affine_transformations, Mat3, Transform};
use crate::OverlayError;
use serde::{Deserialize, Serialize};

/// Placement of an image inside a square surface large enough for any rotation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGeometry {
    /// Side of the square surface in pixels
    pub size: u32,
    /// Image width as drawn on this surface (unrotated)
    pub width: f64,
    /// Image height as drawn on this surface (unrotated)
    pub height: f64,
    /// Left edge of the unrotated image within the square
    pub corner_x: f64,
    /// Top edge of the unrotated image within the square
    pub corner_y: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl SurfaceGeometry {
    /// Geometry of the full-resolution canvas for an image.
    ///
    /// The square's side is the image diagonal, rounded up, so the image fits
    /// at every angle.
    pub fn for_image(width: u32, height: u32) -> Result<Self, OverlayError> {
        if width == 0 || height == 0 {
            return Err(OverlayError::DegenerateSurface { width, height });
        }
        let (w, h) = (width as f64, height as f64);
        let size = (w * w + h * h).sqrt().ceil() as u32;
        Ok(Self::centered(size, w, h))
    }

    /// Same layout shrunk onto a square minimap of `map_size` pixels.
    pub fn minimap(&self, map_size: u32) -> Self {
        let scale = self.scale_factor_to(map_size);
        Self {
            size: map_size,
            width: self.width * scale,
            height: self.height * scale,
            corner_x: self.corner_x * scale,
            corner_y: self.corner_y * scale,
            center_x: map_size as f64 / 2.0,
            center_y: map_size as f64 / 2.0,
        }
    }

    /// Ratio between a minimap of `map_size` pixels and this surface.
    pub fn scale_factor_to(&self, map_size: u32) -> f64 {
        map_size as f64 / self.size as f64
    }

    pub fn center(&self) -> Point {
        Point::new(self.center_x, self.center_y)
    }

    /// Matrix that rotates by `degrees` around the surface center.
    ///
    /// Used together with [`SurfaceGeometry::draw_rect`]: the origin sits on the
    /// surface center and the image is drawn centered on it.
    pub fn draw_transform(&self, degrees: f64) -> Mat3 {
        compose_affine_transformations([
            Transform::Rotate { degrees },
            Transform::Translate {
                dx: self.center_x,
                dy: self.center_y,
            },
        ])
    }

    /// Destination rectangle of the image relative to the rotated origin.
    pub fn draw_rect(&self) -> DrawRect {
        DrawRect {
            x: -self.width / 2.0,
            y: -self.height / 2.0,
            width: self.width,
            height: self.height,
        }
    }

    fn centered(size: u32, width: f64, height: f64) -> Self {
        let side = size as f64;
        Self {
            size,
            width,
            height,
            corner_x: (side - width) / 2.0,
            corner_y: (side - height) / 2.0,
            center_x: side / 2.0,
            center_y: side / 2.0,
        }
    }
}
