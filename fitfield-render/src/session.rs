//! Editable scene: points, index snapshot, pipeline and double buffers

use crate::buffer::{PingPong, RenderBuffer};
use crate::config::FitParameters;
use crate::context::RenderingContext;
use crate::field::FieldKind;
use crate::pipeline::Pipeline;
use fitfield_algorithms::SpatialIndex;
use fitfield_core::{Error, OrientedPoint2f, Point2f, PointSet, Result};

/// Margin, in pixels, kept around the cloud by [`Session::fit_view`]
pub const VIEW_BORDER: f32 = 20.0;

/// Owns everything a frame needs.
///
/// Point edits rebuild the index before returning, so renders always see a
/// snapshot consistent with the point set.
#[derive(Debug)]
pub struct Session {
    points: PointSet,
    index: SpatialIndex,
    pipeline: Pipeline,
    ctx: RenderingContext,
    buffers: PingPong,
}

impl Session {
    pub fn new(points: PointSet, ctx: RenderingContext, pipeline: Pipeline) -> Self {
        let index = SpatialIndex::build(points.as_slice());
        Self {
            points,
            index,
            pipeline,
            buffers: PingPong::for_context(&ctx),
            ctx,
        }
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    pub fn context(&self) -> &RenderingContext {
        &self.ctx
    }

    /// Change the output size or pixel scale. Both frames are cleared on resize.
    pub fn set_context(&mut self, ctx: RenderingContext) -> Result<()> {
        if ctx.width == 0 || ctx.height == 0 {
            return Err(Error::InvalidParameter(format!(
                "image size must be positive, got {}x{}",
                ctx.width, ctx.height
            )));
        }
        self.buffers.resize(ctx.width, ctx.height);
        self.ctx = ctx;
        Ok(())
    }

    /// Last completed frame
    pub fn frame(&self) -> &RenderBuffer {
        self.buffers.presentable_buffer()
    }

    fn rebuild_index(&mut self) {
        self.index.rebuild(self.points.as_slice());
    }

    pub fn set_points(&mut self, points: PointSet) {
        self.points = points;
        self.rebuild_index();
    }

    pub fn add_point(&mut self, x: f32, y: f32) -> usize {
        let id = self.points.add_point(x, y);
        self.rebuild_index();
        id
    }

    pub fn move_point(&mut self, id: usize, x: f32, y: f32) -> Result<()> {
        self.points.move_point(id, x, y)?;
        self.rebuild_index();
        Ok(())
    }

    pub fn flip_normal(&mut self, id: usize) -> Result<()> {
        self.points.flip_normal(id)?;
        self.rebuild_index();
        Ok(())
    }

    pub fn rotate_normal(&mut self, id: usize, delta: f32) -> Result<()> {
        self.points.rotate_normal(id, delta)?;
        self.rebuild_index();
        Ok(())
    }

    /// Point under `query`, within the overlay glyph size
    pub fn find_point(&self, query: &Point2f) -> Option<usize> {
        let half_size = self.pipeline.overlay.map_or(1.0, |o| o.half_size.max(1.0));
        self.points
            .find_point(query, self.ctx.pix_to_point(half_size))
    }

    pub fn point(&self, id: usize) -> Option<&OrientedPoint2f> {
        self.points.as_slice().get(id)
    }

    /// Rescale the cloud to fill the image, keeping a border
    pub fn fit_view(&mut self) {
        let border = self.ctx.pix_to_point(VIEW_BORDER);
        let end = (
            self.ctx.pix_to_point(self.ctx.width as f32) - border,
            self.ctx.pix_to_point(self.ctx.height as f32) - border,
        );
        self.points.fit_to_range(end, (border, border));
        self.rebuild_index();
    }

    pub fn set_field(&mut self, kind: FieldKind) {
        self.pipeline.set_field(kind);
    }

    pub fn set_params(&mut self, params: FitParameters) -> Result<()> {
        params.validate()?;
        self.pipeline.config.params = params;
        Ok(())
    }

    pub fn set_anchor(&mut self, anchor: usize) {
        self.pipeline.config.anchor = anchor;
    }

    pub fn set_trajectories(&mut self, trajectories: bool) {
        self.pipeline.config.trajectories = trajectories;
    }

    /// Render into the back buffer and present it.
    ///
    /// On error the previous frame stays presented.
    pub fn render(&mut self) -> Result<&RenderBuffer> {
        let buffer = self.buffers.writable_buffer();
        if let Err(e) = self.pipeline.render(&self.index, &self.ctx, buffer) {
            tracing::warn!(error = %e, "render failed, keeping last frame");
            return Err(e);
        }
        self.buffers.flip();
        Ok(self.buffers.presentable_buffer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitfield_algorithms::FitKind;

    fn session() -> Session {
        let points = PointSet::from_points(
            (0..10)
                .map(|i| OrientedPoint2f::with_default_normal(2.0 * i as f32, 10.0))
                .collect(),
        );
        Session::new(points, RenderingContext::new(64, 64), Pipeline::default())
    }

    #[test]
    fn test_edits_rebuild_index() {
        let mut session = session();
        let id = session.add_point(50.0, 50.0);
        assert_eq!(session.index().len(), 11);
        assert_eq!(session.index().nearest_neighbor(&Point2f::new(49.0, 49.0)), Some(id));

        session.move_point(id, 0.0, 30.0).unwrap();
        assert_eq!(session.index().points()[id].position, Point2f::new(0.0, 30.0));

        assert!(matches!(
            session.flip_normal(99),
            Err(Error::PointOutOfRange { index: 99, len: 11 })
        ));
    }

    #[test]
    fn test_failed_render_keeps_last_frame() {
        let mut session = session();
        session.render().unwrap();
        let good = session.frame().clone();

        session.set_field(FieldKind::Anchored(FitKind::Plane));
        session.set_anchor(100);
        assert!(session.render().is_err());
        assert_eq!(*session.frame(), good);

        session.set_anchor(0);
        session.render().unwrap();
        assert_ne!(*session.frame(), good);
    }

    #[test]
    fn test_fit_view() {
        let mut session = session();
        session.fit_view();
        let bounds = session.index().bounding_box().unwrap();
        assert!((bounds.min.x - 20.0).abs() < 1e-4);
        assert!((bounds.max.x - 44.0).abs() < 1e-4);
        assert!((bounds.min.y - 20.0).abs() < 1e-4);
        assert_eq!(session.find_point(&Point2f::new(44.5, 20.0)), Some(9));
    }

    #[test]
    fn test_resize_renders_at_new_size() {
        let mut session = session();
        session.render().unwrap();

        let ctx = RenderingContext { width: 40, height: 24, ..*session.context() };
        session.set_context(ctx).unwrap();
        let frame = session.render().unwrap();
        assert_eq!((frame.width(), frame.height()), (40, 24));
        assert_eq!(frame.pixels().len(), 40 * 24);

        assert!(matches!(
            session.set_context(RenderingContext::new(0, 10)),
            Err(Error::InvalidParameter(_))
        ));
        assert_eq!(session.context().width, 40);
    }
}
