//! Mapping between output pixels and point space

use fitfield_core::{Error, Point2f, Result};
use serde::{Deserialize, Serialize};

/// Output size and the uniform factor converting pixels to point units.
///
/// `scale` is the point-space length of one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderingContext {
    pub width: usize,
    pub height: usize,
    pub scale: f32,
}

impl Default for RenderingContext {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            scale: 1.0,
        }
    }
}

impl RenderingContext {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            scale: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Result<Self> {
        if !(scale > 0.0 && scale.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "pixel scale must be positive and finite, got {scale}"
            )));
        }
        self.scale = scale;
        Ok(self)
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn pix_to_point(&self, i: f32) -> f32 {
        i * self.scale
    }

    /// Pixel coordinate containing the point-space coordinate `x`
    pub fn point_to_pix(&self, x: f32) -> i64 {
        (x / self.scale).floor() as i64
    }

    /// Point-space position of pixel `(x, y)`
    pub fn pixel_to_point(&self, x: usize, y: usize) -> Point2f {
        Point2f::new(self.pix_to_point(x as f32), self.pix_to_point(y as f32))
    }

    pub fn point_to_pixel(&self, p: &Point2f) -> (i64, i64) {
        (self.point_to_pix(p.x), self.point_to_pix(p.y))
    }

    pub fn contains_pixel(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Row-major index of an in-bounds pixel
    pub fn pixel_index(&self, x: i64, y: i64) -> Option<usize> {
        self.contains_pixel(x, y)
            .then(|| y as usize * self.width + x as usize)
    }
}
