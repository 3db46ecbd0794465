use crate::OverlayError;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point in pixel space (canvas, minimap or page coordinates).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// Size of the visible window, independent of rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Offset from the viewport's top-left corner to its center.
    pub fn half(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Both sides must be finite and non-negative.
    pub fn validate(&self) -> Result<(), OverlayError> {
        let usable = |v: f64| v.is_finite() && v >= 0.0;
        if usable(self.width) && usable(self.height) {
            Ok(())
        } else {
            Err(OverlayError::InvalidViewport {
                width: self.width,
                height: self.height,
            })
        }
    }
}
