//! Editable point set

use crate::aabb::Aabb2;
use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Insertion-ordered collection of oriented points.
///
/// The set is the mutable side of the data model: spatial indices are
/// immutable snapshots built from it, and must be rebuilt after every edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    pub points: Vec<OrientedPoint2f>,
}

impl PointSet {
    /// Create a new empty point set
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a point set from a vector of points
    pub fn from_points(points: Vec<OrientedPoint2f>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OrientedPoint2f> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[OrientedPoint2f] {
        &self.points
    }

    pub fn push(&mut self, point: OrientedPoint2f) {
        self.points.push(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Append a point with the default normal, returning its index
    pub fn add_point(&mut self, x: f32, y: f32) -> usize {
        self.points.push(OrientedPoint2f::with_default_normal(x, y));
        self.points.len() - 1
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut OrientedPoint2f> {
        let len = self.points.len();
        self.points
            .get_mut(index)
            .ok_or(Error::PointOutOfRange { index, len })
    }

    pub fn move_point(&mut self, index: usize, x: f32, y: f32) -> Result<()> {
        self.get_mut(index)?.position = Point2f::new(x, y);
        Ok(())
    }

    pub fn flip_normal(&mut self, index: usize) -> Result<()> {
        self.get_mut(index)?.flip_normal();
        Ok(())
    }

    /// Rotate the normal of a point by `delta` radians
    pub fn rotate_normal(&mut self, index: usize, delta: f32) -> Result<()> {
        self.get_mut(index)?.angle += delta;
        Ok(())
    }

    /// Index of the first point within `threshold` of `query`
    pub fn find_point(&self, query: &Point2f, threshold: f32) -> Option<usize> {
        self.points
            .iter()
            .position(|p| (p.position - query).norm() <= threshold)
    }

    pub fn bounding_box(&self) -> Option<Aabb2> {
        Aabb2::from_points(self.points.iter().map(|p| &p.position))
    }

    /// Uniformly rescale positions so the bounding box fits in `[start, end]`.
    ///
    /// The scale factor is the smallest per-axis ratio, so the aspect ratio is
    /// preserved. The box minimum is moved onto `start`.
    pub fn fit_to_range(&mut self, end: (f32, f32), start: (f32, f32)) {
        let Some(aabb) = self.bounding_box() else {
            return;
        };
        let diagonal = aabb.diagonal();
        let requested = Vector2f::new(end.0 - start.0, end.1 - start.1);

        let ratio = |req: f32, size: f32| if size > f32::EPSILON { req / size } else { f32::INFINITY };
        let scale = ratio(requested.x, diagonal.x).min(ratio(requested.y, diagonal.y));
        let scale = if scale.is_finite() { scale } else { 1.0 };

        for p in &mut self.points {
            p.position.x = start.0 + (p.position.x - aabb.min.x) * scale;
            p.position.y = start.1 + (p.position.y - aabb.min.y) * scale;
        }
    }
}

impl Index<usize> for PointSet {
    type Output = OrientedPoint2f;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a OrientedPoint2f;
    type IntoIter = std::slice::Iter<'a, OrientedPoint2f>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl Extend<OrientedPoint2f> for PointSet {
    fn extend<I: IntoIterator<Item = OrientedPoint2f>>(&mut self, iter: I) {
        self.points.extend(iter);
    }
}

impl FromIterator<OrientedPoint2f> for PointSet {
    fn from_iter<I: IntoIterator<Item = OrientedPoint2f>>(iter: I) -> Self {
        Self {
            points: Vec::from_iter(iter),
        }
    }
}
