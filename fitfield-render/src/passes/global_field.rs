use super::{write_scalar_field, Frame, RenderPass};
use crate::buffer::RenderBuffer;
use fitfield_algorithms::{AnyFit, Fit, FitKind, NeighborFilter};
use fitfield_core::Result;

/// A single unweighted fit of the whole point set, evaluated at every pixel.
///
/// The fit is centered on the bounding box of the set with a support equal
/// to the box diagonal.
#[derive(Debug, Clone, Copy)]
pub struct GlobalField {
    kind: FitKind,
    name: &'static str,
}

impl GlobalField {
    pub fn new(kind: FitKind) -> Self {
        let name = match kind {
            FitKind::Plane => "Best Plane",
            FitKind::Sphere => "Best Sphere",
            FitKind::OrientedSphere => "Best Oriented Sphere",
            FitKind::UnorientedSphere => "Best Unoriented Sphere",
        };
        Self { kind, name }
    }

    pub fn kind(&self) -> FitKind {
        self.kind
    }
}

impl RenderPass for GlobalField {
    fn name(&self) -> &str {
        self.name
    }

    fn render(&self, frame: &Frame<'_>, buffer: &mut RenderBuffer) -> Result<()> {
        let Some(bounds) = frame.index.bounding_box() else {
            buffer.mark_no_field();
            return Ok(());
        };

        let points = frame.points();
        let filter = NeighborFilter::constant(bounds.center(), bounds.diagonal().norm());
        let fit = AnyFit::fit_neighbors(self.kind, filter, 0..points.len(), points);
        if !fit.is_stable() {
            tracing::debug!(kind = %self.kind, "global fit unstable, no field");
            buffer.mark_no_field();
            return Ok(());
        }

        let max_value = write_scalar_field(frame.ctx, buffer, |q| Some(fit.display_potential(q)));
        tracing::debug!(kind = %self.kind, max_value, "global field rendered");
        Ok(())
    }
}
