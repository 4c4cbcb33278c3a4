//! Weighted algebraic least-squares fits
//!
//! Every fit follows the same protocol: [`Fit::init`] with a neighbor filter,
//! feed neighbors through [`Fit::add_neighbor`] (or
//! [`Fit::compute_with_ids`]), then [`Fit::finalize`]. Only stable fits carry
//! a primitive: the others evaluate to NaN and project points onto themselves.
//! Sphere fits additionally need [`Fit::apply_pratt_norm`] before
//! their potential approximates a distance.

mod primitive;
mod plane;
mod sphere;
mod oriented_sphere;
mod unoriented_sphere;

pub use primitive::*;
pub use plane::PlaneFit;
pub use sphere::SphereFit;
pub use oriented_sphere::OrientedSphereFit;
pub use unoriented_sphere::UnorientedSphereFit;

use crate::weight::NeighborFilter;
use fitfield_core::{OrientedPoint2f, Point2f, Vector2f};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitState {
    /// Fit computed and usable
    Stable,
    /// Not enough neighbors or ill-conditioned system
    Unstable,
    /// Not computed yet
    #[default]
    Undefined,
}

/// Shared neighbor accumulation state
#[derive(Debug, Clone, Copy)]
pub(crate) struct Accumulator {
    pub filter: NeighborFilter,
    pub sum_w: f64,
    pub count: usize,
}

impl Accumulator {
    pub fn new(filter: NeighborFilter) -> Self {
        Self {
            filter,
            sum_w: 0.0,
            count: 0,
        }
    }

    /// Weight of the neighbor, registering it if non-zero
    pub fn accept(&mut self, p: &OrientedPoint2f) -> Option<f64> {
        let w = self.filter.weight(&p.position);
        if w > 0.0 {
            self.sum_w += w;
            self.count += 1;
            Some(w)
        } else {
            None
        }
    }

    pub fn has_enough(&self, min_neighbors: usize) -> bool {
        self.count >= min_neighbors && self.sum_w > f64::EPSILON
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new(NeighborFilter::unbounded(Point2f::origin()))
    }
}

/// Capabilities shared by every fit primitive
pub trait Fit {
    /// Reset the fit and set its neighbor filter
    fn init(&mut self, filter: NeighborFilter);

    /// Accumulate one neighbor; returns `false` when its weight is zero
    fn add_neighbor(&mut self, point: &OrientedPoint2f) -> bool;

    /// Solve the fit from the accumulated neighbors
    fn finalize(&mut self) -> FitState;

    fn state(&self) -> FitState;

    fn is_stable(&self) -> bool {
        self.state() == FitState::Stable
    }

    /// Whether the sign of the potential carries orientation
    fn is_signed(&self) -> bool;

    /// Scalar potential at `q`, approximating the (signed) distance
    fn potential(&self, q: &Point2f) -> f32;

    fn gradient(&self, q: &Point2f) -> Vector2f;

    /// Closest point of the fitted primitive
    fn project(&self, q: &Point2f) -> Point2f;

    /// Distance normalization; no-op for primitives that are already metric.
    ///
    /// A stable fit that cannot be normalized becomes unstable.
    fn apply_pratt_norm(&mut self) -> bool {
        true
    }

    /// Fit the points designated by `ids`
    fn compute_with_ids<I>(&mut self, ids: I, points: &[OrientedPoint2f]) -> FitState
    where
        I: IntoIterator<Item = usize>,
        Self: Sized,
    {
        for id in ids {
            self.add_neighbor(&points[id]);
        }
        self.finalize()
    }

    /// Fit every point of the slice
    fn compute(&mut self, points: &[OrientedPoint2f]) -> FitState
    where
        Self: Sized,
    {
        for p in points {
            self.add_neighbor(p);
        }
        self.finalize()
    }
}

/// Kind of primitive to fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FitKind {
    Plane,
    Sphere,
    OrientedSphere,
    UnorientedSphere,
}

impl FitKind {
    pub const ALL: [FitKind; 4] = [
        FitKind::Plane,
        FitKind::Sphere,
        FitKind::OrientedSphere,
        FitKind::UnorientedSphere,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FitKind::Plane => "Plane",
            FitKind::Sphere => "Sphere",
            FitKind::OrientedSphere => "Oriented Sphere",
            FitKind::UnorientedSphere => "Unoriented Sphere",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for FitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime-selected fit, one variant per primitive kind
#[derive(Debug, Clone)]
pub enum AnyFit {
    Plane(PlaneFit),
    Sphere(SphereFit),
    OrientedSphere(OrientedSphereFit),
    UnorientedSphere(UnorientedSphereFit),
}

macro_rules! dispatch {
    ($self:expr, $fit:ident => $body:expr) => {
        match $self {
            AnyFit::Plane($fit) => $body,
            AnyFit::Sphere($fit) => $body,
            AnyFit::OrientedSphere($fit) => $body,
            AnyFit::UnorientedSphere($fit) => $body,
        }
    };
}

impl AnyFit {
    pub fn new(kind: FitKind) -> Self {
        match kind {
            FitKind::Plane => AnyFit::Plane(PlaneFit::default()),
            FitKind::Sphere => AnyFit::Sphere(SphereFit::default()),
            FitKind::OrientedSphere => AnyFit::OrientedSphere(OrientedSphereFit::default()),
            FitKind::UnorientedSphere => AnyFit::UnorientedSphere(UnorientedSphereFit::default()),
        }
    }

    pub fn kind(&self) -> FitKind {
        match self {
            AnyFit::Plane(_) => FitKind::Plane,
            AnyFit::Sphere(_) => FitKind::Sphere,
            AnyFit::OrientedSphere(_) => FitKind::OrientedSphere,
            AnyFit::UnorientedSphere(_) => FitKind::UnorientedSphere,
        }
    }

    /// Fit `kind` over the neighbors `ids` and normalize it when stable.
    ///
    /// This is the unit step of the MLS iteration.
    pub fn fit_neighbors<I>(
        kind: FitKind,
        filter: NeighborFilter,
        ids: I,
        points: &[OrientedPoint2f],
    ) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut fit = Self::new(kind);
        fit.init(filter);
        if fit.compute_with_ids(ids, points) == FitState::Stable {
            fit.apply_pratt_norm();
        }
        fit
    }

    /// Potential as displayed: signed when the fit is oriented, absolute otherwise
    pub fn display_potential(&self, q: &Point2f) -> f32 {
        let value = self.potential(q);
        if self.is_signed() {
            value
        } else {
            value.abs()
        }
    }
}

impl Fit for AnyFit {
    fn init(&mut self, filter: NeighborFilter) {
        dispatch!(self, fit => fit.init(filter))
    }

    fn add_neighbor(&mut self, point: &OrientedPoint2f) -> bool {
        dispatch!(self, fit => fit.add_neighbor(point))
    }

    fn finalize(&mut self) -> FitState {
        dispatch!(self, fit => fit.finalize())
    }

    fn state(&self) -> FitState {
        dispatch!(self, fit => fit.state())
    }

    fn is_signed(&self) -> bool {
        dispatch!(self, fit => fit.is_signed())
    }

    fn potential(&self, q: &Point2f) -> f32 {
        dispatch!(self, fit => fit.potential(q))
    }

    fn gradient(&self, q: &Point2f) -> Vector2f {
        dispatch!(self, fit => fit.gradient(q))
    }

    fn project(&self, q: &Point2f) -> Point2f {
        dispatch!(self, fit => fit.project(q))
    }

    fn apply_pratt_norm(&mut self) -> bool {
        dispatch!(self, fit => fit.apply_pratt_norm())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::f32::consts::PI;

    /// Points on a circle with outward normals
    fn circle(center: Point2f, radius: f32, n: usize) -> Vec<OrientedPoint2f> {
        (0..n)
            .map(|i| {
                let a = 2.0 * PI * i as f32 / n as f32;
                OrientedPoint2f::new(center.x + radius * a.cos(), center.y + radius * a.sin(), a)
            })
            .collect()
    }

    fn fit_all(kind: FitKind, points: &[OrientedPoint2f], center: Point2f, scale: f32) -> AnyFit {
        AnyFit::fit_neighbors(
            kind,
            NeighborFilter::smooth(center, scale),
            0..points.len(),
            points,
        )
    }

    #[test]
    fn test_kind_names() {
        for kind in FitKind::ALL {
            assert_eq!(FitKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(FitKind::from_name("Ellipse"), None);
        assert_eq!(FitKind::OrientedSphere.to_string(), "Oriented Sphere");
    }

    #[test]
    fn test_projection_lies_on_primitive() {
        let mut rng = StdRng::seed_from_u64(42);
        let points: Vec<OrientedPoint2f> = circle(Point2f::new(50.0, 50.0), 20.0, 48)
            .into_iter()
            .map(|mut p| {
                p.position.x += rng.gen_range(-0.5..0.5);
                p.position.y += rng.gen_range(-0.5..0.5);
                p
            })
            .collect();

        for kind in FitKind::ALL {
            let fit = fit_all(kind, &points, Point2f::new(70.0, 50.0), 30.0);
            assert!(fit.is_stable(), "{kind} fit should be stable");
            for _ in 0..50 {
                let q = Point2f::new(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0));
                let p = fit.project(&q);
                assert!(
                    fit.potential(&p).abs() < 1e-3,
                    "{kind}: potential at projection is {}",
                    fit.potential(&p)
                );
            }
        }
    }

    #[test]
    fn test_sphere_family_on_exact_circle() {
        let center = Point2f::new(10.0, -5.0);
        let points = circle(center, 8.0, 32);

        for kind in [FitKind::Sphere, FitKind::OrientedSphere, FitKind::UnorientedSphere] {
            let fit = fit_all(kind, &points, center, 100.0);
            assert!(fit.is_stable(), "{kind} fit should be stable");
            for p in &points {
                assert!(fit.potential(&p.position).abs() < 1e-3);
            }
            // normalized potential approximates the distance near the circle
            let outside = Point2f::new(center.x + 8.5, center.y);
            assert_relative_eq!(fit.display_potential(&outside).abs(), 0.5, epsilon = 0.05);
        }
    }

    #[test]
    fn test_oriented_sphere_sign() {
        let center = Point2f::new(0.0, 0.0);
        let points = circle(center, 5.0, 24);
        let fit = fit_all(FitKind::OrientedSphere, &points, center, 50.0);

        assert!(fit.is_signed());
        assert!(fit.potential(&center) < 0.0);
        assert!(fit.potential(&Point2f::new(9.0, 0.0)) > 0.0);

        // flipping every normal flips the sign
        let flipped: Vec<OrientedPoint2f> = points
            .iter()
            .map(|p| {
                let mut p = *p;
                p.flip_normal();
                p
            })
            .collect();
        let fit = fit_all(FitKind::OrientedSphere, &flipped, center, 50.0);
        assert!(fit.potential(&center) > 0.0);
    }

    #[test]
    fn test_signedness() {
        let points = circle(Point2f::new(0.0, 0.0), 5.0, 16);
        let signed: Vec<bool> = FitKind::ALL
            .iter()
            .map(|kind| fit_all(*kind, &points, Point2f::new(5.0, 0.0), 20.0).is_signed())
            .collect();
        assert_eq!(signed, vec![true, false, true, false]);
    }

    #[test]
    fn test_too_few_neighbors_is_unstable() {
        let points = vec![OrientedPoint2f::with_default_normal(0.0, 0.0)];
        for kind in FitKind::ALL {
            let fit = fit_all(kind, &points, Point2f::new(0.0, 0.0), 10.0);
            assert_eq!(fit.state(), FitState::Unstable);
        }

        let fit = fit_all(FitKind::Plane, &points, Point2f::new(100.0, 0.0), 10.0);
        assert!(!fit.is_stable());
    }

    #[test]
    fn test_undefined_before_finalize() {
        let mut fit = AnyFit::new(FitKind::Sphere);
        fit.init(NeighborFilter::smooth(Point2f::new(0.0, 0.0), 1.0));
        assert_eq!(fit.state(), FitState::Undefined);
        assert_eq!(fit.kind(), FitKind::Sphere);
    }
}
