use crate::points::Point;

/// One drawing-context operation on a surface whose y axis points down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Shift by (dx, dy) surface pixels
    Translate { dx: f64, dy: f64 },
    /// Turn around the current origin; positive is clockwise on screen
    Rotate { degrees: f64 },
}

/// Affine matrix in homogeneous form, as used by 2D canvas contexts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3 {
    /// Rows of the matrix; the last row is always [0, 0, 1]
    pub data: [[f64; 3]; 3],
}

impl Mat3 {
    pub fn identity() -> Self {
        Self {
            data: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            data: [[1.0, 0.0, dx], [0.0, 1.0, dy], [0.0, 0.0, 1.0]],
        }
    }

    /// Creates a rotation matrix around the origin.
    ///
    /// Same matrix as the 2D canvas `rotate()`: with y pointing down a positive
    /// angle turns clockwise on screen.
    pub fn rotation_degrees(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            data: [[cos, -sin, 0.0], [sin, cos, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// `self * other`: the result applies `other` first.
    pub fn multiply(&self, other: &Mat3) -> Self {
        let mut data = [[0.0; 3]; 3];
        for (row, lhs) in data.iter_mut().zip(&self.data) {
            for (col, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| lhs[k] * other.data[k][col]).sum();
            }
        }
        Self { data }
    }

    /// Transform a point.
    pub fn apply(&self, point: Point) -> Point {
        let m = &self.data;
        Point::new(
            m[0][0] * point.x + m[0][1] * point.y + m[0][2],
            m[1][0] * point.x + m[1][1] * point.y + m[1][2],
        )
    }

    /// Inverse of an affine matrix, or None if it collapses the plane.
    pub fn inverse(&self) -> Option<Self> {
        let [[a, b, tx], [c, d, ty], _] = self.data;
        let det = a * d - b * c;
        if det.abs() < f64::EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let ia = d * inv_det;
        let ib = -b * inv_det;
        let ic = -c * inv_det;
        let id = a * inv_det;
        Some(Self {
            data: [
                [ia, ib, -(ia * tx + ib * ty)],
                [ic, id, -(ic * tx + id * ty)],
                [0.0, 0.0, 1.0],
            ],
        })
    }

    /// The six coefficients in canvas `setTransform(a, b, c, d, e, f)` order.
    pub fn to_canvas_coefficients(&self) -> [f64; 6] {
        let m = &self.data;
        [m[0][0], m[1][0], m[0][1], m[1][1], m[0][2], m[1][2]]
    }
}

/// Fold a list of operations into one matrix.
///
/// The first operation in the list is the first one applied to a point:
/// `[Rotate 90, Translate (50, 50)]` maps (10, 0) to (0, 10) and then to (50, 60).
pub fn compose_affine_transformations(transforms: impl IntoIterator<Item = Transform>) -> Mat3 {
    transforms
        .into_iter()
        .fold(Mat3::identity(), |acc, transform| {
            let step = match transform {
                Transform::Translate { dx, dy } => Mat3::translation(dx, dy),
                Transform::Rotate { degrees } => Mat3::rotation_degrees(degrees),
            };
            step.multiply(&acc)
        })
}
