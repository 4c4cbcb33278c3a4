//! # Fitfield Render
//!
//! Turns local fits over a 2D point set into images.
//!
//! Field evaluators write a scalar field into a float RGBA buffer following a
//! fixed channel protocol, the colormap decodes it into colors, and passes are
//! composed in a fixed order by the [`Pipeline`]. A [`Session`] owns the
//! editable scene and presents frames through ping-pong buffers.

pub mod bresenham;
pub mod buffer;
pub mod config;
pub mod context;
pub mod field;
pub mod parallel;
pub mod passes;
pub mod pipeline;
pub mod session;

// Re-export commonly used items
pub use bresenham::*;
pub use buffer::*;
pub use config::*;
pub use context::*;
pub use field::*;
pub use passes::*;
pub use pipeline::*;
pub use session::*;
