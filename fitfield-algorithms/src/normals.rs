//! Normal estimation for point sets loaded without orientation

use crate::fitting::{Fit, PlaneFit};
use crate::spatial_index::SpatialIndex;
use crate::weight::NeighborFilter;
use fitfield_core::OrientedPoint2f;

/// Neighborhood size used when normals are missing from the input
pub const DEFAULT_NORMAL_NEIGHBORS: usize = 3;

/// Estimate the normal of every point from a constant-kernel line fit over
/// its `k` nearest neighbors (the point itself included).
///
/// Sets with fewer than two points are left untouched. Points whose fit is
/// unstable keep their previous angle. Returns the number of updated points.
pub fn estimate_normals(points: &mut [OrientedPoint2f], k: usize) -> usize {
    if points.len() < 2 {
        tracing::warn!(points = points.len(), "too few points to estimate normals");
        return 0;
    }

    let index = SpatialIndex::build(points);
    let k = k.max(2);
    let mut updated = 0;
    let mut fit = PlaneFit::default();

    for (i, point) in points.iter_mut().enumerate() {
        fit.init(NeighborFilter::unbounded(point.position));
        fit.compute_with_ids(index.k_nearest_neighbors(&point.position, k), index.points());

        if !fit.is_stable() {
            tracing::warn!(point = i, "normal estimation failed, keeping previous angle");
            continue;
        }
        let g = fit.gradient(&point.position);
        point.angle = g.y.atan2(g.x);
        updated += 1;
    }

    tracing::debug!(updated, total = points.len(), k, "normals estimated");
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_two_points() {
        let mut points = vec![
            OrientedPoint2f::with_default_normal(0.0, 0.0),
            OrientedPoint2f::with_default_normal(10.0, 0.0),
        ];
        assert_eq!(estimate_normals(&mut points, DEFAULT_NORMAL_NEIGHBORS), 2);
        for p in &points {
            assert!(p.angle.is_finite());
            assert_relative_eq!(p.angle.abs(), FRAC_PI_2, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_line_normals_are_orthogonal() {
        let mut points: Vec<OrientedPoint2f> = (0..10)
            .map(|i| OrientedPoint2f::new(i as f32, i as f32, 0.0))
            .collect();
        estimate_normals(&mut points, 4);
        for p in &points {
            let n = p.normal();
            assert_relative_eq!(n.x + n.y, 0.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_single_point_untouched() {
        let mut points = vec![OrientedPoint2f::new(1.0, 2.0, 0.25)];
        assert_eq!(estimate_normals(&mut points, 3), 0);
        assert_eq!(points[0].angle, 0.25);
    }

    #[test]
    fn test_duplicate_points_keep_angle() {
        let mut points = vec![OrientedPoint2f::new(1.0, 1.0, 0.5); 3];
        assert_eq!(estimate_normals(&mut points, 3), 0);
        assert!(points.iter().all(|p| p.angle == 0.5));
    }
}
