use super::{Frame, RenderPass};
use crate::buffer::{Pixel, RenderBuffer};
use crate::context::RenderingContext;
use crate::parallel::parallel_map;
use fitfield_core::{OrientedPoint2f, Result, Vector2f};
use serde::{Deserialize, Serialize};

/// Draws every point as a disc with a stub along its normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointOverlay {
    pub color: Pixel,
    /// Disc radius in pixels; the normal stub is twice as long
    pub half_size: f32,
}

impl Default for PointOverlay {
    fn default() -> Self {
        Self {
            color: [0.0, 0.0, 0.0, 1.0],
            half_size: 3.0,
        }
    }
}

impl PointOverlay {
    pub fn new(color: Pixel, half_size: f32) -> Self {
        Self { color, half_size }
    }

    /// In-image pixels covered by one point glyph
    fn glyph_pixels(&self, ctx: &RenderingContext, point: &OrientedPoint2f) -> Vec<usize> {
        let (i, j) = ctx.point_to_pixel(&point.position);
        let normal = point.normal();
        let tangent = Vector2f::new(-normal.y, normal.x);
        let half = self.half_size.max(0.0);
        let large = 2.0 * half;
        let reach = large.ceil() as i64;

        let mut pixels = Vec::new();
        for v in -reach..=reach {
            for u in -reach..=reach {
                let local = Vector2f::new(u as f32, v as f32);
                let in_disc = local.norm_squared() < half * half;
                let on_stub = local.dot(&tangent).abs() < 1.0
                    && local.dot(&normal) > 0.0
                    && local.norm() <= large;
                if in_disc || on_stub {
                    if let Some(index) = ctx.pixel_index(i + u, j + v) {
                        pixels.push(index);
                    }
                }
            }
        }
        pixels
    }
}

impl RenderPass for PointOverlay {
    fn name(&self) -> &str {
        "Points"
    }

    fn render(&self, frame: &Frame<'_>, buffer: &mut RenderBuffer) -> Result<()> {
        let glyphs = parallel_map(frame.points(), |p| self.glyph_pixels(frame.ctx, p));
        let pixels = buffer.pixels_mut();
        for index in glyphs.into_iter().flatten() {
            if let Some(pixel) = pixels.get_mut(index) {
                *pixel = self.color;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldConfig;
    use fitfield_algorithms::SpatialIndex;

    #[test]
    fn test_glyph_with_normal_stub() {
        let ctx = RenderingContext::new(20, 20);
        let points = [OrientedPoint2f::with_default_normal(10.0, 10.0)];
        let index = SpatialIndex::build(&points);
        let config = FieldConfig::default();
        let overlay = PointOverlay::new([1.0, 0.0, 0.0, 1.0], 2.0);

        let mut buffer = RenderBuffer::for_context(&ctx);
        overlay.render(&Frame::new(&index, &ctx, &config), &mut buffer).unwrap();

        let red = [1.0, 0.0, 0.0, 1.0];
        assert_eq!(*buffer.pixel(10, 10).unwrap(), red);
        assert_eq!(*buffer.pixel(11, 10).unwrap(), red);
        // stub points along +y, up to 2 * half_size
        assert_eq!(*buffer.pixel(10, 14).unwrap(), red);
        assert_eq!(*buffer.pixel(10, 15).unwrap(), [0.0; 4]);
        assert_eq!(*buffer.pixel(10, 6).unwrap(), [0.0; 4]);
    }

    #[test]
    fn test_glyph_is_clipped() {
        let ctx = RenderingContext::new(4, 4);
        let points = [OrientedPoint2f::new(0.0, 0.0, 3.9)];
        let index = SpatialIndex::build(&points);
        let config = FieldConfig::default();
        let mut buffer = RenderBuffer::for_context(&ctx);
        PointOverlay::default()
            .render(&Frame::new(&index, &ctx, &config), &mut buffer)
            .unwrap();
        assert_eq!(*buffer.pixel(0, 0).unwrap(), [0.0, 0.0, 0.0, 1.0]);
    }
}
