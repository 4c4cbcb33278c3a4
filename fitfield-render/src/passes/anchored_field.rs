use super::{mark_border_pixels, mls_fit, write_scalar_field, Frame, RenderPass};
use crate::bresenham::rasterize_line;
use crate::buffer::RenderBuffer;
use crate::parallel::parallel_map;
use fitfield_algorithms::{Fit, FitKind};
use fitfield_core::Result;

/// MLS fit grown from one selected point and evaluated at every pixel.
///
/// Trajectories show where every point lands on that single primitive.
#[derive(Debug, Clone, Copy)]
pub struct AnchoredField {
    kind: FitKind,
    name: &'static str,
}

impl AnchoredField {
    pub fn new(kind: FitKind) -> Self {
        let name = match kind {
            FitKind::Plane => "One Plane",
            FitKind::Sphere => "One Sphere",
            FitKind::OrientedSphere => "One Oriented Sphere",
            FitKind::UnorientedSphere => "One Unoriented Sphere",
        };
        Self { kind, name }
    }

    pub fn kind(&self) -> FitKind {
        self.kind
    }
}

impl RenderPass for AnchoredField {
    fn name(&self) -> &str {
        self.name
    }

    fn render(&self, frame: &Frame<'_>, buffer: &mut RenderBuffer) -> Result<()> {
        let points = frame.points();
        if points.is_empty() {
            buffer.mark_no_field();
            return Ok(());
        }

        let anchor = frame.config.checked_anchor(points.len())?;
        let params = frame.config.params;
        params.validate()?;

        let fit = mls_fit(self.kind, frame.index, &params, points[anchor].position);
        if !fit.is_stable() {
            tracing::debug!(kind = %self.kind, anchor, "anchored fit unstable, no field");
            buffer.mark_no_field();
            return Ok(());
        }

        write_scalar_field(frame.ctx, buffer, |q| Some(fit.display_potential(q)));

        if frame.config.trajectories {
            let ctx = frame.ctx;
            let paths = parallel_map(points, |p| {
                let target = fit.project(&p.position);
                let mut pixels = Vec::new();
                rasterize_line(ctx.point_to_pixel(&p.position), ctx.point_to_pixel(&target), |x, y| {
                    if ctx.contains_pixel(x, y) {
                        pixels.push((x, y));
                    }
                });
                pixels
            });
            mark_border_pixels(ctx, buffer, paths);
        }
        Ok(())
    }
}
