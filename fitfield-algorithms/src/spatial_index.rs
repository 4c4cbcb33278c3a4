//! Spatial index for neighborhood queries over a point set snapshot
//!
//! The index is an immutable snapshot: it copies the points it was built from
//! and is rebuilt (never patched) whenever the point set changes.

use fitfield_core::{Aabb2, NearestNeighborSearch, OrientedPoint2f, Point2f};
use rstar::primitives::GeomWithData;
use rstar::{RTree, RTreeNode, AABB};
use std::collections::VecDeque;

/// A point position tagged with its index in the source point set
type IndexedPoint = GeomWithData<[f32; 2], usize>;

/// Node of the index, numbered breadth-first from the root (node 0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexNode {
    /// Internal node with the cached bounding box of its subtree
    Inner { bounds: Aabb2, children: usize },
    /// Single point
    Leaf { id: usize },
}

/// R*-tree backed index over oriented 2D points
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    points: Vec<OrientedPoint2f>,
    tree: RTree<IndexedPoint>,
    nodes: Vec<IndexNode>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::empty()
    }
}

impl SpatialIndex {
    /// Index holding no point; every query on it returns no result
    pub fn empty() -> Self {
        Self {
            points: Vec::new(),
            tree: RTree::new(),
            nodes: Vec::new(),
        }
    }

    /// Build the index from a point slice in O(n log n)
    pub fn build(points: &[OrientedPoint2f]) -> Self {
        if points.is_empty() {
            return Self::empty();
        }

        let entries = points
            .iter()
            .enumerate()
            .map(|(id, p)| IndexedPoint::new([p.position.x, p.position.y], id))
            .collect();
        let tree = RTree::bulk_load(entries);
        let nodes = collect_nodes(&tree);

        tracing::debug!(points = points.len(), nodes = nodes.len(), "spatial index built");

        Self {
            points: points.to_vec(),
            tree,
            nodes,
        }
    }

    /// Replace the content of the index with a new snapshot
    pub fn rebuild(&mut self, points: &[OrientedPoint2f]) {
        *self = Self::build(points);
    }

    /// Points the index was built from, in insertion order
    pub fn points(&self) -> &[OrientedPoint2f] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, node_index: usize) -> Option<&IndexNode> {
        self.nodes.get(node_index)
    }

    /// Cached box of an internal node; `None` for leaves and unknown nodes
    pub fn node_bounding_box(&self, node_index: usize) -> Option<Aabb2> {
        match self.nodes.get(node_index)? {
            IndexNode::Inner { bounds, .. } => Some(*bounds),
            IndexNode::Leaf { .. } => None,
        }
    }

    /// Box of the whole point set (root node)
    pub fn bounding_box(&self) -> Option<Aabb2> {
        self.node_bounding_box(0)
    }

    /// Id of the point nearest to `query`
    pub fn nearest_neighbor(&self, query: &Point2f) -> Option<usize> {
        self.tree
            .nearest_neighbor(&[query.x, query.y])
            .map(|entry| entry.data)
    }

    /// Ids of the `k` points nearest to `query`, closest first
    pub fn k_nearest_neighbors<'a>(
        &'a self,
        query: &Point2f,
        k: usize,
    ) -> impl Iterator<Item = usize> + 'a {
        self.tree
            .nearest_neighbor_iter(&[query.x, query.y])
            .take(k)
            .map(|entry| entry.data)
    }

    /// Ids of every point within `radius` of `query` (inclusive).
    ///
    /// The sequence is lazy and its order is unspecified.
    pub fn range_neighbors<'a>(
        &'a self,
        query: &Point2f,
        radius: f32,
    ) -> impl Iterator<Item = usize> + 'a {
        self.tree
            .locate_within_distance([query.x, query.y], radius * radius)
            .map(|entry| entry.data)
    }
}

impl NearestNeighborSearch for SpatialIndex {
    fn nearest(&self, query: &Point2f) -> Option<usize> {
        self.nearest_neighbor(query)
    }

    fn find_k_nearest(&self, query: &Point2f, k: usize) -> Vec<(usize, f32)> {
        self.k_nearest_neighbors(query, k)
            .map(|id| (id, (self.points[id].position - query).norm()))
            .collect()
    }

    fn find_radius_neighbors(&self, query: &Point2f, radius: f32) -> Vec<(usize, f32)> {
        self.range_neighbors(query, radius)
            .map(|id| (id, (self.points[id].position - query).norm()))
            .collect()
    }
}

fn to_aabb(envelope: &AABB<[f32; 2]>) -> Aabb2 {
    let lower = envelope.lower();
    let upper = envelope.upper();
    Aabb2::new(Point2f::new(lower[0], lower[1]), Point2f::new(upper[0], upper[1]))
}

/// Flatten the tree breadth-first so nodes can be addressed by index
fn collect_nodes(tree: &RTree<IndexedPoint>) -> Vec<IndexNode> {
    let mut nodes = Vec::new();
    if tree.size() == 0 {
        return nodes;
    }

    let root = tree.root();
    nodes.push(IndexNode::Inner {
        bounds: to_aabb(&root.envelope()),
        children: root.children().len(),
    });

    let mut queue: VecDeque<&RTreeNode<IndexedPoint>> = root.children().iter().collect();
    while let Some(node) = queue.pop_front() {
        match node {
            RTreeNode::Leaf(entry) => nodes.push(IndexNode::Leaf { id: entry.data }),
            RTreeNode::Parent(parent) => {
                nodes.push(IndexNode::Inner {
                    bounds: to_aabb(&parent.envelope()),
                    children: parent.children().len(),
                });
                queue.extend(parent.children().iter());
            }
        }
    }
    nodes
}
