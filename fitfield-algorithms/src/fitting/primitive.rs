//! Fitted geometric primitives
//!
//! Both primitives are expressed in coordinates local to the center of the
//! neighbor filter that produced them.

use crate::weight::Scalar;
use fitfield_core::{Point2f, Vector2, Vector2f};

/// Ratio `|uq| / |ul|` under which an algebraic sphere is treated as a line
const PLANE_EPSILON: Scalar = 1e-9;

/// Oriented line `n · x + d = 0` (the 2D hyperplane)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub basis_center: Point2f,
    pub normal: Vector2<Scalar>,
    pub offset: Scalar,
}

impl Line {
    pub fn new(basis_center: Point2f, normal: Vector2<Scalar>, offset: Scalar) -> Self {
        Self {
            basis_center,
            normal,
            offset,
        }
    }

    fn local(&self, q: &Point2f) -> Vector2<Scalar> {
        (q - self.basis_center).cast::<Scalar>()
    }

    /// Signed distance to the line
    pub fn potential(&self, q: &Point2f) -> f32 {
        (self.normal.dot(&self.local(q)) + self.offset) as f32
    }

    pub fn gradient(&self) -> Vector2f {
        self.normal.cast::<f32>()
    }

    /// Orthogonal projection onto the line
    pub fn project(&self, q: &Point2f) -> Point2f {
        let lq = self.local(q);
        let proj = lq - self.normal * (self.normal.dot(&lq) + self.offset);
        self.basis_center + proj.cast::<f32>()
    }
}

/// Algebraic sphere `uc + ul · x + uq |x|² = 0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlgebraicSphere {
    pub basis_center: Point2f,
    pub uc: Scalar,
    pub ul: Vector2<Scalar>,
    pub uq: Scalar,
    normalized: bool,
}

impl AlgebraicSphere {
    pub fn new(basis_center: Point2f, uc: Scalar, ul: Vector2<Scalar>, uq: Scalar) -> Self {
        Self {
            basis_center,
            uc,
            ul,
            uq,
            normalized: false,
        }
    }

    fn local(&self, q: &Point2f) -> Vector2<Scalar> {
        (q - self.basis_center).cast::<Scalar>()
    }

    fn eval_local(&self, lq: &Vector2<Scalar>) -> Scalar {
        self.uc + self.ul.dot(lq) + self.uq * lq.norm_squared()
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Degenerates to a line when the quadratic term vanishes
    pub fn is_plane(&self) -> bool {
        self.uq.abs() <= PLANE_EPSILON * self.ul.norm()
    }

    /// Value of `|ul|² - 4 uc uq`, positive for real spheres
    pub fn pratt_norm_squared(&self) -> Scalar {
        self.ul.norm_squared() - 4.0 * self.uc * self.uq
    }

    /// Rescale coefficients so the potential approximates Euclidean distance.
    ///
    /// Returns `false`, leaving the coefficients untouched, for imaginary or
    /// degenerate spheres.
    pub fn apply_pratt_norm(&mut self) -> bool {
        if self.normalized {
            return true;
        }
        let norm_squared = self.pratt_norm_squared();
        if !(norm_squared > Scalar::EPSILON) || !norm_squared.is_finite() {
            return false;
        }
        let norm = norm_squared.sqrt();
        self.uc /= norm;
        self.ul /= norm;
        self.uq /= norm;
        self.normalized = true;
        true
    }

    /// Flip coefficient signs so that `uq >= 0` (negative inside)
    pub fn orient_inside_negative(&mut self) {
        if self.uq < 0.0 {
            self.uc = -self.uc;
            self.ul = -self.ul;
            self.uq = -self.uq;
        }
    }

    pub fn potential(&self, q: &Point2f) -> f32 {
        self.eval_local(&self.local(q)) as f32
    }

    pub fn gradient(&self, q: &Point2f) -> Vector2f {
        (self.ul + self.local(q) * (2.0 * self.uq)).cast::<f32>()
    }

    /// Center in point space, `None` for lines
    pub fn center(&self) -> Option<Point2f> {
        if self.is_plane() {
            return None;
        }
        let c = -self.ul / (2.0 * self.uq);
        Some(self.basis_center + c.cast::<f32>())
    }

    /// Radius, `None` for lines and imaginary spheres
    pub fn radius(&self) -> Option<f32> {
        if self.is_plane() {
            return None;
        }
        let c = -self.ul / (2.0 * self.uq);
        let r2 = c.norm_squared() - self.uc / self.uq;
        (r2 > 0.0).then(|| r2.sqrt() as f32)
    }

    /// Closest point of the zero set
    pub fn project(&self, q: &Point2f) -> Point2f {
        let lq = self.local(q);

        if self.is_plane() {
            let norm_squared = self.ul.norm_squared();
            if norm_squared <= Scalar::EPSILON {
                return *q;
            }
            let proj = lq - self.ul * (self.eval_local(&lq) / norm_squared);
            return self.basis_center + proj.cast::<f32>();
        }

        let c = -self.ul / (2.0 * self.uq);
        let r2 = c.norm_squared() - self.uc / self.uq;
        if !(r2 > 0.0) {
            return *q;
        }

        let dir = lq - c;
        let len = dir.norm();
        let dir = if len > Scalar::EPSILON {
            dir / len
        } else {
            Vector2::new(1.0, 0.0)
        };
        let proj = c + dir * r2.sqrt();
        self.basis_center + proj.cast::<f32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_line_projection() {
        let line = Line::new(Point2f::new(0.0, 0.0), Vector2::new(0.0, 1.0), -2.0);
        let q = Point2f::new(3.0, 7.0);
        assert_relative_eq!(line.potential(&q), 5.0);
        let p = line.project(&q);
        assert_relative_eq!(p.x, 3.0);
        assert_relative_eq!(p.y, 2.0);
        assert_relative_eq!(line.potential(&p), 0.0);
    }

    #[test]
    fn test_sphere_pratt_norm() {
        // 2 * (|x|² - 25): circle of radius 5, unnormalized
        let mut sphere =
            AlgebraicSphere::new(Point2f::new(0.0, 0.0), -50.0, Vector2::zeros(), 2.0);
        assert!(sphere.apply_pratt_norm());
        assert!(sphere.is_normalized());
        assert_relative_eq!(sphere.radius().unwrap(), 5.0, epsilon = 1e-5);
        // near the surface the potential approximates the signed distance
        assert_relative_eq!(sphere.potential(&Point2f::new(5.1, 0.0)), 0.1, epsilon = 2e-3);
        assert!(sphere.potential(&Point2f::new(0.0, 0.0)) < 0.0);
    }

    #[test]
    fn test_sphere_projection() {
        let sphere = AlgebraicSphere::new(Point2f::new(1.0, 1.0), -4.0, Vector2::zeros(), 1.0);
        let p = sphere.project(&Point2f::new(10.0, 1.0));
        assert_relative_eq!(p.x, 3.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(sphere.center().unwrap(), Point2f::new(1.0, 1.0));
    }

    #[test]
    fn test_imaginary_sphere_is_not_normalized() {
        let mut sphere = AlgebraicSphere::new(Point2f::new(0.0, 0.0), 1.0, Vector2::zeros(), 1.0);
        assert!(!sphere.apply_pratt_norm());
        assert!(!sphere.is_normalized());
    }
}
