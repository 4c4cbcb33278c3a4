//! Axis-aligned bounding boxes

use crate::point::{Point2f, Vector2f};
use serde::{Deserialize, Serialize};

/// An axis-aligned box in point space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb2 {
    pub min: Point2f,
    pub max: Point2f,
}

impl Aabb2 {
    pub fn new(min: Point2f, max: Point2f) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, `None` for an empty input
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point2f>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut aabb = Self::new(first, first);
        for p in iter {
            aabb.extend(p);
        }
        Some(aabb)
    }

    /// Grow the box so that it contains `p`
    pub fn extend(&mut self, p: &Point2f) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn center(&self) -> Point2f {
        nalgebra::center(&self.min, &self.max)
    }

    /// Vector from `min` to `max`
    pub fn diagonal(&self) -> Vector2f {
        self.max - self.min
    }

    pub fn contains(&self, p: &Point2f) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let points = [
            Point2f::new(0.0, 1.0),
            Point2f::new(-2.0, 3.0),
            Point2f::new(4.0, -1.0),
        ];
        let aabb = Aabb2::from_points(&points).unwrap();
        assert_eq!(aabb.min, Point2f::new(-2.0, -1.0));
        assert_eq!(aabb.max, Point2f::new(4.0, 3.0));
        assert_eq!(aabb.center(), Point2f::new(1.0, 1.0));
        assert_eq!(aabb.diagonal(), Vector2f::new(6.0, 4.0));
        assert!(points.iter().all(|p| aabb.contains(p)));
    }

    #[test]
    fn test_from_empty() {
        assert!(Aabb2::from_points(&[]).is_none());
    }
}
