//! Unoriented algebraic sphere fit with the Pratt constraint

use super::{Accumulator, AlgebraicSphere, Fit, FitState};
use crate::weight::{NeighborFilter, Scalar};
use fitfield_core::{OrientedPoint2f, Point2f, Vector2f};
use nalgebra::{Matrix4, Vector2, Vector4};

/// Relative eigenvalue under which the data is considered exactly on a circle
const EXACT_FIT_EPSILON: Scalar = 1e-10;

/// Constraint matrix of `|ul|² - 4 uc uq` for `u = [uc, ulx, uly, uq]`
fn pratt_constraint() -> Matrix4<Scalar> {
    Matrix4::new(
        0.0, 0.0, 0.0, -2.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        -2.0, 0.0, 0.0, 0.0,
    )
}

/// Fits `uc + ul · x + uq |x|²` to positions only.
///
/// Minimizes `uᵀ A u` under `uᵀ Q u = 1`, with `A` the weighted moment matrix
/// of `[1, x, y, |x|²]` and `Q` the Pratt constraint. Normals are ignored, so
/// the potential is unsigned.
#[derive(Debug, Clone, Default)]
pub struct SphereFit {
    acc: Accumulator,
    moments: Matrix4<Scalar>,
    sphere: Option<AlgebraicSphere>,
    state: FitState,
}

impl SphereFit {
    pub fn sphere(&self) -> Option<&AlgebraicSphere> {
        self.sphere.as_ref()
    }

    fn solve(&self) -> Option<Vector4<Scalar>> {
        let a = self.moments / self.acc.sum_w;

        let eigen = a.symmetric_eigen();
        let largest = eigen.eigenvalues.max();
        if !(largest > 0.0) {
            return None;
        }
        let smallest = eigen.eigenvalues.imin();
        if eigen.eigenvalues[smallest] <= EXACT_FIT_EPSILON * largest {
            return Some(eigen.eigenvectors.column(smallest).into_owned());
        }

        // A = L Lᵀ turns the generalized problem into L⁻¹ Q L⁻ᵀ y = μ y,
        // the best fit being the largest positive μ with u = L⁻ᵀ y
        let l = a.cholesky()?.l();
        let l_inv = l.try_inverse()?;
        let s = l_inv * pratt_constraint() * l_inv.transpose();
        let s_eigen = s.symmetric_eigen();
        let best = s_eigen.eigenvalues.imax();
        if !(s_eigen.eigenvalues[best] > 0.0) {
            return None;
        }
        let y: Vector4<Scalar> = s_eigen.eigenvectors.column(best).into_owned();
        Some(l_inv.transpose() * y)
    }
}

impl Fit for SphereFit {
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
        true
    }

    fn finalize(&mut self) -> FitState {
        self.sphere = None;
        if !self.acc.has_enough(3) {
            self.state = FitState::Unstable;
            return self.state;
        }

        let Some(u) = self.solve().filter(|u| u.iter().all(|c| c.is_finite())) else {
            self.state = FitState::Unstable;
            return self.state;
        };

        let mut sphere = AlgebraicSphere::new(
            self.acc.filter.center(),
            u[0],
            Vector2::new(u[1], u[2]),
            u[3],
        );
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
