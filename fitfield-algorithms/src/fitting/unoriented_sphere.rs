//! Unoriented algebraic sphere fit (gradient energy constrained)

use super::{Accumulator, AlgebraicSphere, Fit, FitState};
use crate::weight::{NeighborFilter, Scalar};
use fitfield_core::{OrientedPoint2f, Point2f, Vector2f};
use nalgebra::{Matrix3, Matrix4, Vector2, Vector3, Vector4};

/// Sphere fit over positions whose constraint is the weighted mean squared
/// gradient norm instead of the Pratt norm.
///
/// The constant coefficient is eliminated first, leaving a 3x3 generalized
/// eigenproblem in `[ulx, uly, uq]`. Like [`super::SphereFit`] the result is
/// unsigned.
#[derive(Debug, Clone, Default)]
pub struct UnorientedSphereFit {
    acc: Accumulator,
    moments: Matrix4<Scalar>,
    sum_p: Vector2<Scalar>,
    sum_dot_pp: Scalar,
    sphere: Option<AlgebraicSphere>,
    state: FitState,
}

impl UnorientedSphereFit {
    pub fn sphere(&self) -> Option<&AlgebraicSphere> {
        self.sphere.as_ref()
    }

    fn solve(&self) -> Option<(Scalar, Vector3<Scalar>)> {
        let inv_sum_w = 1.0 / self.acc.sum_w;
        let a = self.moments * inv_sum_w;
        let a00 = a[(0, 0)];
        let a_col: Vector3<Scalar> = a.fixed_view::<3, 1>(1, 0).into_owned();
        let a11: Matrix3<Scalar> = a.fixed_view::<3, 3>(1, 1).into_owned();

        // residual energy once uc = -(a_col · u') / a00 is substituted
        let reduced = a11 - a_col * a_col.transpose() / a00;

        let p = self.sum_p * inv_sum_w;
        let mean_dot_pp = self.sum_dot_pp * inv_sum_w;
        if !(mean_dot_pp - p.norm_squared() > 1e-12 * mean_dot_pp) {
            return None;
        }
        let constraint = Matrix3::new(
            1.0, 0.0, 2.0 * p.x, //
            0.0, 1.0, 2.0 * p.y, //
            2.0 * p.x, 2.0 * p.y, 4.0 * mean_dot_pp,
        );

        // Q = L Lᵀ, then L⁻¹ A' L⁻ᵀ y = λ y with the smallest λ
        let l_inv = constraint.cholesky()?.l().try_inverse()?;
        let c = l_inv * reduced * l_inv.transpose();
        let eigen = c.symmetric_eigen();
        let y: Vector3<Scalar> = eigen.eigenvectors.column(eigen.eigenvalues.imin()).into_owned();
        let u = l_inv.transpose() * y;

        let uc = -a_col.dot(&u) / a00;
        Some((uc, u))
    }
}

impl Fit for UnorientedSphereFit {
    fn init(&mut self, filter: NeighborFilter) {
        *self = Self {
            acc: Accumulator::new(filter),
            ..Self::default()
        };
    }

    fn add_neighbor(&mut self, point: &OrientedPoint2f) -> bool {
        let Some(w) = self.acc.accept(point) else {
            return false;
        };
        let q = self.acc.filter.to_local(&point.position);
        let v = Vector4::new(1.0, q.x, q.y, q.norm_squared());
        self.moments += v * v.transpose() * w;
        self.sum_p += q * w;
        self.sum_dot_pp += w * q.norm_squared();
        true
    }

    fn finalize(&mut self) -> FitState {
        self.sphere = None;
        if !self.acc.has_enough(3) {
            self.state = FitState::Unstable;
            return self.state;
        }

        let solution = self
            .solve()
            .filter(|(uc, u)| uc.is_finite() && u.iter().all(|c| c.is_finite()));
        let Some((uc, u)) = solution else {
            self.state = FitState::Unstable;
            return self.state;
        };

        let mut sphere =
            AlgebraicSphere::new(self.acc.filter.center(), uc, Vector2::new(u.x, u.y), u.z);
        sphere.orient_inside_negative();
        self.sphere = Some(sphere);
        self.state = FitState::Stable;
        self.state
    }

    fn state(&self) -> FitState {
        self.state
    }

    fn is_signed(&self) -> bool {
        false
    }

    fn potential(&self, q: &Point2f) -> f32 {
        self.sphere.map_or(f32::NAN, |s| s.potential(q))
    }

    fn gradient(&self, q: &Point2f) -> Vector2f {
        self.sphere.map_or_else(Vector2f::zeros, |s| s.gradient(q))
    }

    fn project(&self, q: &Point2f) -> Point2f {
        self.sphere.map_or(*q, |s| s.project(q))
    }

    fn apply_pratt_norm(&mut self) -> bool {
        let normalized = self.sphere.as_mut().is_some_and(|s| s.apply_pratt_norm());
        if !normalized {
            self.sphere = None;
            self.state = FitState::Unstable;
        }
        normalized
    }
}
