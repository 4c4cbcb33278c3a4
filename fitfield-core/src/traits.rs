//! Core traits for fitfield

use crate::point::Point2f;

/// Trait for nearest neighbor search functionality
pub trait NearestNeighborSearch {
    /// Index of the point closest to `query`, `None` when there are no points
    fn nearest(&self, query: &Point2f) -> Option<usize>;

    /// Find the k nearest neighbors to a query point, closest first
    fn find_k_nearest(&self, query: &Point2f, k: usize) -> Vec<(usize, f32)>;

    /// Find all neighbors within a given radius
    fn find_radius_neighbors(&self, query: &Point2f, radius: f32) -> Vec<(usize, f32)>;
}
