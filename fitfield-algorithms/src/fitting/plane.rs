//! Covariance plane (line) fit

use super::{Accumulator, Fit, FitState, Line};
use crate::weight::{NeighborFilter, Scalar};
use fitfield_core::{OrientedPoint2f, Point2f, Vector2f};
use nalgebra::{Matrix2, Vector2};

/// Weighted covariance analysis of the neighbors.
///
/// The line goes through the weighted mean, its normal is the eigenvector of
/// the smallest covariance eigenvalue, oriented along the mean neighbor
/// normal so that the potential is signed.
#[derive(Debug, Clone, Default)]
pub struct PlaneFit {
    acc: Accumulator,
    sum_p: Vector2<Scalar>,
    sum_pp: Matrix2<Scalar>,
    sum_n: Vector2<Scalar>,
    line: Option<Line>,
    state: FitState,
}

impl PlaneFit {
    /// Fitted line, available once the fit is stable
    pub fn line(&self) -> Option<&Line> {
        self.line.as_ref()
    }
}

impl Fit for PlaneFit {
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
        self.sum_p += q * w;
        self.sum_pp += q * q.transpose() * w;
        self.sum_n += point.normal().cast::<Scalar>() * w;
        true
    }

    fn finalize(&mut self) -> FitState {
        self.line = None;
        if !self.acc.has_enough(2) {
            self.state = FitState::Unstable;
            return self.state;
        }

        let inv_sum_w = 1.0 / self.acc.sum_w;
        let mean = self.sum_p * inv_sum_w;
        let covariance = self.sum_pp * inv_sum_w - mean * mean.transpose();

        let eigen = covariance.symmetric_eigen();
        let max_eigenvalue = eigen.eigenvalues.max();
        if !(max_eigenvalue > Scalar::EPSILON) {
            // every neighbor at the same location
            self.state = FitState::Unstable;
            return self.state;
        }

        let mut normal: Vector2<Scalar> = eigen
            .eigenvectors
            .column(eigen.eigenvalues.imin())
            .into_owned();
        normal.normalize_mut();
        if normal.dot(&self.sum_n) < 0.0 {
            normal = -normal;
        }

        self.line = Some(Line::new(self.acc.filter.center(), normal, -normal.dot(&mean)));
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
        self.line.map_or(f32::NAN, |line| line.potential(q))
    }

    fn gradient(&self, _q: &Point2f) -> Vector2f {
        self.line.map_or_else(Vector2f::zeros, |line| line.gradient())
    }

    fn project(&self, q: &Point2f) -> Point2f {
        self.line.map_or(*q, |line| line.project(q))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_horizontal_line() {
        let points: Vec<OrientedPoint2f> = (0..10)
            .map(|i| OrientedPoint2f::with_default_normal(i as f32, 3.0))
            .collect();

        let mut fit = PlaneFit::default();
        fit.init(NeighborFilter::smooth(Point2f::new(4.5, 0.0), 20.0));
        assert_eq!(fit.compute(&points), FitState::Stable);

        let g = fit.gradient(&Point2f::origin());
        assert_relative_eq!(g.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(fit.potential(&Point2f::new(2.0, 5.0)), 2.0, epsilon = 1e-5);
        assert_relative_eq!(fit.potential(&Point2f::new(2.0, 1.0)), -2.0, epsilon = 1e-5);

        let p = fit.project(&Point2f::new(-3.0, 10.0));
        assert_relative_eq!(p.x, -3.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_orientation_follows_normals() {
        let points: Vec<OrientedPoint2f> = (0..5)
            .map(|i| OrientedPoint2f::new(0.0, i as f32, std::f32::consts::PI))
            .collect();

        let mut fit = PlaneFit::default();
        fit.init(NeighborFilter::constant(Point2f::new(0.0, 2.0), 10.0));
        fit.compute(&points);

        assert!(fit.is_stable());
        assert!(fit.potential(&Point2f::new(-1.0, 2.0)) > 0.0);
    }

    #[test]
    fn test_coincident_points_are_unstable() {
        let points = vec![OrientedPoint2f::with_default_normal(1.0, 1.0); 4];
        let mut fit = PlaneFit::default();
        fit.init(NeighborFilter::constant(Point2f::new(1.0, 1.0), 1.0));
        assert_eq!(fit.compute(&points), FitState::Unstable);
        assert!(fit.line().is_none());
    }
}
