//! Core data structures and traits for fitfield
//!
//! This crate provides the fundamental types shared by the fitting and
//! rendering crates: oriented 2D points, the editable point set, axis-aligned
//! boxes and the common error type.

pub mod point;
pub mod point_set;
pub mod aabb;
pub mod traits;
pub mod error;

pub use point::*;
pub use point_set::*;
pub use aabb::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point2, Vector2, Matrix2};
