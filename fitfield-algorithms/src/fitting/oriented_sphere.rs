//! Oriented algebraic sphere fit (gradient constrained)

use super::{Accumulator, AlgebraicSphere, Fit, FitState};
use crate::weight::{NeighborFilter, Scalar};
use fitfield_core::{OrientedPoint2f, Point2f, Vector2f};
use nalgebra::Vector2;

/// Closed-form fit of an algebraic sphere whose gradient matches the
/// neighbor normals. The potential is signed: negative on the side the
/// normals point away from.
#[derive(Debug, Clone, Default)]
pub struct OrientedSphereFit {
    acc: Accumulator,
    sum_p: Vector2<Scalar>,
    sum_n: Vector2<Scalar>,
    sum_dot_pn: Scalar,
    sum_dot_pp: Scalar,
    sphere: Option<AlgebraicSphere>,
    state: FitState,
}

impl OrientedSphereFit {
    pub fn sphere(&self) -> Option<&AlgebraicSphere> {
        self.sphere.as_ref()
    }
}

impl Fit for OrientedSphereFit {
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
        let n = point.normal().cast::<Scalar>();
        self.sum_p += q * w;
        self.sum_n += n * w;
        self.sum_dot_pn += w * n.dot(&q);
        self.sum_dot_pp += w * q.norm_squared();
        true
    }

    fn finalize(&mut self) -> FitState {
        self.sphere = None;
        if !self.acc.has_enough(3) {
            self.state = FitState::Unstable;
            return self.state;
        }

        let sum_w = self.acc.sum_w;
        let inv_sum_w = 1.0 / sum_w;

        let numerator = self.sum_dot_pn - inv_sum_w * self.sum_p.dot(&self.sum_n);
        let spread = inv_sum_w * self.sum_p.norm_squared();
        let denominator = self.sum_dot_pp - spread;

        // vanishing spread of the neighbors: fall back to a line
        let uq = if denominator.abs() > 1e-12 * self.sum_dot_pp.max(spread) {
            0.5 * numerator / denominator
        } else {
            0.0
        };
        let ul = (self.sum_n - self.sum_p * (2.0 * uq)) * inv_sum_w;
        let uc = -inv_sum_w * (ul.dot(&self.sum_p) + self.sum_dot_pp * uq);

        if !(uc.is_finite() && uq.is_finite() && ul.iter().all(|c| c.is_finite())) {
            self.state = FitState::Unstable;
            return self.state;
        }

        self.sphere = Some(AlgebraicSphere::new(self.acc.filter.center(), uc, ul, uq));
        self.state = FitState::Stable;
        self.state
    }

    fn state(&self) -> FitState {
        self.state
    }

    fn is_signed(&self) -> bool {
        true
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
