use super::{write_scalar_field, Frame, RenderPass};
use crate::buffer::RenderBuffer;
use fitfield_core::Result;

/// Distance from every pixel to the nearest point
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceField;

impl RenderPass for DistanceField {
    fn name(&self) -> &str {
        "Distance Field"
    }

    fn render(&self, frame: &Frame<'_>, buffer: &mut RenderBuffer) -> Result<()> {
        if frame.index.is_empty() {
            buffer.mark_no_field();
            return Ok(());
        }

        let points = frame.points();
        let max_value = write_scalar_field(frame.ctx, buffer, |q| {
            frame
                .index
                .nearest_neighbor(q)
                .map(|id| (points[id].position - q).norm())
        });
        tracing::debug!(max_value, "distance field rendered");
        Ok(())
    }
}

/// Distance from every pixel to the anchor point
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceFromPoint;

impl RenderPass for DistanceFromPoint {
    fn name(&self) -> &str {
        "Distance From Point"
    }

    fn render(&self, frame: &Frame<'_>, buffer: &mut RenderBuffer) -> Result<()> {
        let points = frame.points();
        if points.is_empty() {
            buffer.mark_no_field();
            return Ok(());
        }

        let anchor = points[frame.config.checked_anchor(points.len())?].position;
        write_scalar_field(frame.ctx, buffer, |q| Some((anchor - q).norm()));
        Ok(())
    }
}
