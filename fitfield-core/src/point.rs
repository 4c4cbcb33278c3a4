//! Point types and related functionality

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// A 2D point with floating point coordinates
pub type Point2f = Point2<f32>;

/// A 2D vector with floating point components
pub type Vector2f = Vector2<f32>;

/// Normal angle given to points created without an orientation (pointing up)
pub const DEFAULT_POINT_ANGLE: f32 = PI / 2.0;

/// A 2D point whose normal is stored as an angle in radians.
///
/// The normal vector is always derived as `(cos θ, sin θ)`, so it is unit
/// length by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedPoint2f {
    pub position: Point2f,
    pub angle: f32,
}

impl OrientedPoint2f {
    pub fn new(x: f32, y: f32, angle: f32) -> Self {
        Self {
            position: Point2f::new(x, y),
            angle,
        }
    }

    /// Create a point with the default (upward) normal
    pub fn with_default_normal(x: f32, y: f32) -> Self {
        Self::new(x, y, DEFAULT_POINT_ANGLE)
    }

    /// Create a point from an arbitrary (not necessarily unit) normal vector
    pub fn from_normal(x: f32, y: f32, nx: f32, ny: f32) -> Self {
        Self::new(x, y, ny.atan2(nx))
    }

    /// Unit normal vector
    pub fn normal(&self) -> Vector2f {
        Vector2f::new(self.angle.cos(), self.angle.sin())
    }

    /// Reverse the normal direction, keeping the angle in `[0, 2π)`
    pub fn flip_normal(&mut self) {
        self.angle = (self.angle + PI).rem_euclid(2.0 * PI);
    }
}

impl Default for OrientedPoint2f {
    fn default() -> Self {
        Self::with_default_normal(0.0, 0.0)
    }
}

impl From<OrientedPoint2f> for Point2f {
    fn from(point: OrientedPoint2f) -> Self {
        point.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normal_is_unit() {
        for angle in [0.0f32, 0.3, 1.7, -2.5, 10.0] {
            let p = OrientedPoint2f::new(1.0, 2.0, angle);
            assert_relative_eq!(p.normal().norm(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_from_normal() {
        let p = OrientedPoint2f::from_normal(0.0, 0.0, 0.0, 2.0);
        assert_relative_eq!(p.angle, PI / 2.0, epsilon = 1e-6);
        assert_relative_eq!(p.normal().y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_flip_normal() {
        let mut p = OrientedPoint2f::new(0.0, 0.0, 0.25);
        let before = p.normal();
        p.flip_normal();
        assert_relative_eq!(p.normal(), -before, epsilon = 1e-6);
        assert!(p.angle >= 0.0 && p.angle < 2.0 * PI);
    }
}
