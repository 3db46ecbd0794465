//! Rotation of the canvas and minimap surfaces.
//!
//! Every rotation is redrawn from the original, unrotated source so repeated
//! turns never accumulate interpolation error.

use crate::geometry::SurfaceGeometry;
use crate::points::Point;
use crate::surface::RasterSurface;
use crate::{OverlayError, Raster};

/// Where a point ends up when the canvas turns from `old_degrees` to `new_degrees`.
///
/// Works in math convention (y up) around `center`, so the screen y axis is
/// flipped in and out. The delta is taken as old - new because screen
/// rotation is clockwise.
pub fn rotate_focal_point(point: Point, center: Point, old_degrees: f64, new_degrees: f64) -> Point {
    let x = point.x - center.x;
    let y = -(point.y - center.y);
    let (sin, cos) = (old_degrees - new_degrees).to_radians().sin_cos();

    let rotated_x = cos * x - sin * y;
    let rotated_y = sin * x + cos * y;

    Point::new(rotated_x + center.x, -rotated_y + center.y)
}

/// Everything an [`OverlaySurface`] had committed, moved out before a relayout.
#[derive(Debug, Default)]
pub struct SurfaceSnapshot {
    geometry: Option<SurfaceGeometry>,
    base: Option<Raster>,
    displayed: Option<Raster>,
    angle: Option<f64>,
}

/// One drawing target (canvas or minimap) with the rasters shown on it.
#[derive(Debug)]
pub struct OverlaySurface<S> {
    backend: S,
    geometry: Option<SurfaceGeometry>,
    /// Rotated, unadjusted pixels
    base: Option<Raster>,
    /// What the backend currently shows
    displayed: Option<Raster>,
    /// Angle the base raster was drawn at
    angle: Option<f64>,
}

impl<S: RasterSurface> OverlaySurface<S> {
    pub fn new(backend: S) -> Self {
        Self {
            backend,
            geometry: None,
            base: None,
            displayed: None,
            angle: None,
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    pub fn geometry(&self) -> Option<&SurfaceGeometry> {
        self.geometry.as_ref()
    }

    pub fn base(&self) -> Option<&Raster> {
        self.base.as_ref()
    }

    pub fn displayed(&self) -> Option<&Raster> {
        self.displayed.as_ref()
    }

    pub fn angle(&self) -> Option<f64> {
        self.angle
    }

    /// Size the backend for a new image. Forgets any previous rasters.
    pub fn layout(&mut self, geometry: SurfaceGeometry) -> Result<(), OverlayError> {
        self.backend.resize(geometry.size, geometry.size)?;
        self.geometry = Some(geometry);
        self.base = None;
        self.displayed = None;
        self.angle = None;
        Ok(())
    }

    /// Draw `source` rotated by `degrees` and capture the result.
    ///
    /// Returns the recorded base raster untouched when it was already drawn
    /// at this angle. The result is not kept until [`OverlaySurface::commit`].
    pub fn rotate(&mut self, source: &Raster, degrees: f64) -> Result<Raster, OverlayError> {
        if let (Some(angle), Some(base)) = (self.angle, &self.base) {
            if angle == degrees {
                return Ok(base.clone());
            }
        }
        let geometry = self.geometry.ok_or(OverlayError::NotOpen)?;

        self.backend.clear()?;
        self.backend.draw_image(
            source,
            geometry.draw_rect(),
            &geometry.draw_transform(degrees),
        )?;
        self.backend.get_pixels()
    }

    /// Put adjusted pixels on the backend.
    pub fn show(&mut self, raster: &Raster) -> Result<(), OverlayError> {
        self.backend.put_pixels(raster)
    }

    /// Record a finished pass.
    pub fn commit(&mut self, base: Raster, displayed: Raster, degrees: f64) {
        self.base = Some(base);
        self.displayed = Some(displayed);
        self.angle = Some(degrees);
    }

    /// Put the last committed pixels back after a failed pass.
    pub fn restore(&mut self) {
        let result = match &self.displayed {
            Some(raster) => self.backend.put_pixels(raster),
            None => self.backend.clear(),
        };
        if let Err(e) = result {
            log::warn!("Failed to restore surface after error: {}", e);
        }
    }

    /// Move the committed state out, leaving the surface unlaid.
    pub fn take_snapshot(&mut self) -> SurfaceSnapshot {
        SurfaceSnapshot {
            geometry: self.geometry.take(),
            base: self.base.take(),
            displayed: self.displayed.take(),
            angle: self.angle.take(),
        }
    }

    /// Bring back a snapshot after a failed relayout and show its pixels again.
    pub fn reinstate(&mut self, snapshot: SurfaceSnapshot) {
        let size = snapshot.geometry.map_or(0, |g| g.size);
        self.geometry = snapshot.geometry;
        self.base = snapshot.base;
        self.displayed = snapshot.displayed;
        self.angle = snapshot.angle;
        if let Err(e) = self.backend.resize(size, size) {
            log::warn!("Failed to resize surface back to {}px: {}", size, e);
        }
        self.restore();
    }

    /// Clear the backend and drop every raster.
    pub fn release(&mut self) -> Result<(), OverlayError> {
        self.geometry = None;
        self.base = None;
        self.displayed = None;
        self.angle = None;
        self.backend.clear()?;
        self.backend.resize(0, 0)
    }
}
