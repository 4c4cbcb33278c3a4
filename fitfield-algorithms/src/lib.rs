//! # Fitfield Algorithms
//!
//! Algorithms operating on 2D oriented point sets.
//!
//! This crate provides the spatial index used for neighborhood queries, the
//! family of weighted algebraic least-squares fits (plane, sphere, oriented
//! sphere, unoriented sphere) and normal estimation.

pub mod spatial_index;
pub mod weight;
pub mod fitting;
pub mod normals;

// Re-export commonly used items
pub use spatial_index::*;
pub use weight::*;
pub use fitting::*;
pub use normals::*;
