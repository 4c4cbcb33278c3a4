//! I/O operations for fitfield
//!
//! Reading and writing point sets in the plain-text `x y [nx ny]` format and
//! exporting rendered frames as 8-bit PNG images.

pub mod error;
pub mod image_export;
pub mod points;

pub use error::*;
pub use image_export::{encode_srgb, to_byte, to_rgba8, write_png, ColorEncoding};
pub use points::{parse_line, read_point_set, read_points_from, write_point_set, write_points_to, PointRecord};
