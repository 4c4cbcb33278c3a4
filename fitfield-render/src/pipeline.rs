//! Fixed-order composition of the passes of one frame

use crate::buffer::RenderBuffer;
use crate::config::FieldConfig;
use crate::context::RenderingContext;
use crate::field::FieldKind;
use crate::passes::{ColorMap, FillPass, Frame, PointOverlay, RenderPass};
use fitfield_algorithms::SpatialIndex;
use fitfield_core::Result;
use std::time::Instant;

/// Background fill, then the active field evaluator, then the colormap and
/// finally the optional point overlay.
pub struct Pipeline {
    pub fill: FillPass,
    pub colormap: ColorMap,
    pub overlay: Option<PointOverlay>,
    pub config: FieldConfig,
    field_kind: FieldKind,
    field: Box<dyn RenderPass>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(FieldKind::default())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("fill", &self.fill)
            .field("field", &self.field_kind)
            .field("colormap", &self.colormap)
            .field("overlay", &self.overlay)
            .field("config", &self.config)
            .finish()
    }
}

impl Pipeline {
    pub fn new(field_kind: FieldKind) -> Self {
        Self {
            fill: FillPass::default(),
            colormap: ColorMap::default(),
            overlay: Some(PointOverlay::default()),
            config: FieldConfig::default(),
            field_kind,
            field: field_kind.create_pass(),
        }
    }

    pub fn with_config(mut self, config: FieldConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_colormap(mut self, colormap: ColorMap) -> Self {
        self.colormap = colormap;
        self
    }

    pub fn with_overlay(mut self, overlay: Option<PointOverlay>) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn field_kind(&self) -> FieldKind {
        self.field_kind
    }

    /// Replace the active evaluator with a fresh instance
    pub fn set_field(&mut self, field_kind: FieldKind) {
        self.field_kind = field_kind;
        self.field = field_kind.create_pass();
    }

    /// Run every pass on `buffer`, resized to the context first
    pub fn render(
        &self,
        index: &SpatialIndex,
        ctx: &RenderingContext,
        buffer: &mut RenderBuffer,
    ) -> Result<()> {
        self.config.params.validate()?;
        buffer.resize(ctx.width, ctx.height);

        let frame = Frame::new(index, ctx, &self.config);
        let mut passes: Vec<&dyn RenderPass> = vec![&self.fill, self.field.as_ref(), &self.colormap];
        if let Some(overlay) = &self.overlay {
            passes.push(overlay);
        }

        let start = Instant::now();
        for pass in passes {
            let pass_start = Instant::now();
            pass.render(&frame, buffer)?;
            tracing::debug!(pass = pass.name(), elapsed = ?pass_start.elapsed(), "pass done");
        }
        tracing::info!(
            field = %self.field_kind,
            points = index.len(),
            width = ctx.width,
            height = ctx.height,
            elapsed = ?start.elapsed(),
            "frame rendered"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::RenderBuffer;
    use fitfield_algorithms::FitKind;
    use fitfield_core::{Error, OrientedPoint2f};

    #[test]
    fn test_empty_point_set_shows_background() {
        let ctx = RenderingContext::new(5, 5);
        let index = SpatialIndex::empty();
        let mut pipeline = Pipeline::new(FieldKind::Mls(FitKind::Plane));
        pipeline.fill = FillPass::new([0.2, 0.4, 0.6, 1.0]);
        let mut buffer = RenderBuffer::new(0, 0);

        pipeline.render(&index, &ctx, &mut buffer).unwrap();
        assert_eq!(buffer.len(), 25);
        assert!(buffer.pixels().iter().all(|p| *p == [0.2, 0.4, 0.6, 1.0]));
    }

    #[test]
    fn test_anchor_error_aborts_frame() {
        let ctx = RenderingContext::new(5, 5);
        let index = SpatialIndex::build(&[OrientedPoint2f::with_default_normal(1.0, 1.0)]);
        let mut pipeline = Pipeline::new(FieldKind::Anchored(FitKind::Plane));
        pipeline.config.anchor = 4;
        let mut buffer = RenderBuffer::for_context(&ctx);
        assert!(matches!(
            pipeline.render(&index, &ctx, &mut buffer),
            Err(Error::AnchorOutOfRange { index: 4, len: 1 })
        ));
    }

    #[test]
    fn test_set_field() {
        let mut pipeline = Pipeline::default();
        assert_eq!(pipeline.field_kind(), FieldKind::Mls(FitKind::OrientedSphere));
        pipeline.set_field(FieldKind::DistanceField);
        assert_eq!(pipeline.field_kind(), FieldKind::DistanceField);
    }
}
