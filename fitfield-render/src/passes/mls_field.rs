//! Per-pixel moving least squares field

use super::{mark_border_pixels, write_scalar_field, Frame, RenderPass};
use crate::bresenham::rasterize_line;
use crate::buffer::RenderBuffer;
use crate::config::FitParameters;
use crate::context::RenderingContext;
use crate::parallel::parallel_map;
use fitfield_algorithms::{AnyFit, Fit, FitKind, NeighborFilter, SpatialIndex};
use fitfield_core::{Point2f, Result};

/// Upper bound on projection rounds when tracing a point trajectory
pub const MAX_PROJECTION_ROUNDS: usize = 50;

/// Fit `kind` over the neighbors within `scale` of `x`
pub fn fit_at(kind: FitKind, index: &SpatialIndex, scale: f32, x: &Point2f) -> AnyFit {
    AnyFit::fit_neighbors(
        kind,
        NeighborFilter::smooth(*x, scale),
        index.range_neighbors(x, scale),
        index.points(),
    )
}

/// Run the MLS re-centering loop from `start` and return the last fit
pub fn mls_fit(kind: FitKind, index: &SpatialIndex, params: &FitParameters, start: Point2f) -> AnyFit {
    let mut query = start;
    let mut fit = AnyFit::new(kind);
    for _ in 0..params.iterations {
        fit = fit_at(kind, index, params.scale, &query);
        if !fit.is_stable() {
            break;
        }
        query = fit.project(&query);
    }
    fit
}

/// Pixels crossed while a point is repeatedly projected onto its local fit.
///
/// Stops once a step moves by at most one pixel, the fit becomes unstable,
/// or after [`MAX_PROJECTION_ROUNDS`] rounds of `iterations` steps.
fn trajectory(
    kind: FitKind,
    index: &SpatialIndex,
    params: &FitParameters,
    ctx: &RenderingContext,
    start: Point2f,
) -> Vec<(i64, i64)> {
    let mut pixels = Vec::new();
    let mut x = start;

    'rounds: for _ in 0..MAX_PROJECTION_ROUNDS {
        for _ in 0..params.iterations {
            let fit = fit_at(kind, index, params.scale, &x);
            if !fit.is_stable() {
                break 'rounds;
            }
            let next = fit.project(&x);
            let count = rasterize_line(ctx.point_to_pixel(&x), ctx.point_to_pixel(&next), |px, py| {
                if ctx.contains_pixel(px, py) {
                    pixels.push((px, py));
                }
            });
            x = next;
            if count <= 1 {
                break 'rounds;
            }
        }
    }
    pixels
}

/// Local fit of one primitive kind evaluated independently at every pixel
#[derive(Debug, Clone, Copy)]
pub struct MlsField {
    kind: FitKind,
}

impl MlsField {
    pub fn new(kind: FitKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> FitKind {
        self.kind
    }
}

impl RenderPass for MlsField {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn render(&self, frame: &Frame<'_>, buffer: &mut RenderBuffer) -> Result<()> {
        if frame.index.is_empty() {
            buffer.mark_no_field();
            return Ok(());
        }

        let params = frame.config.params;
        params.validate()?;

        let max_value = write_scalar_field(frame.ctx, buffer, |q| {
            let fit = mls_fit(self.kind, frame.index, &params, *q);
            fit.is_stable().then(|| fit.display_potential(q))
        });

        if frame.config.trajectories {
            let paths = parallel_map(frame.points(), |p| {
                trajectory(self.kind, frame.index, &params, frame.ctx, p.position)
            });
            mark_border_pixels(frame.ctx, buffer, paths);
        }

        tracing::debug!(kind = %self.kind, max_value, "MLS field rendered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{FieldTag, Validity, VALIDITY_CHANNEL};
    use crate::config::FieldConfig;
    use fitfield_core::OrientedPoint2f;

    fn horizontal_line() -> Vec<OrientedPoint2f> {
        (0..20)
            .map(|i| OrientedPoint2f::with_default_normal(i as f32, 10.0))
            .collect()
    }

    #[test]
    fn test_plane_field_is_signed_distance() {
        let points = horizontal_line();
        let index = SpatialIndex::build(&points);
        let ctx = RenderingContext::new(20, 20);
        let config = FieldConfig::default();
        let mut buffer = RenderBuffer::for_context(&ctx);

        MlsField::new(FitKind::Plane)
            .render(&Frame::new(&index, &ctx, &config), &mut buffer)
            .unwrap();

        assert_eq!(buffer.field_tag(), FieldTag::ScalarField);
        let above = buffer.pixel(10, 14).unwrap();
        let below = buffer.pixel(10, 7).unwrap();
        assert!((above[0] - 4.0).abs() < 1e-3);
        assert!((below[0] + 3.0).abs() < 1e-3);
        assert_eq!(Validity::from_f32(above[VALIDITY_CHANNEL]), Validity::Valid);
        assert!((buffer.max_value() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_recentered_fit_is_evaluated_at_the_pixel() {
        let points = horizontal_line();
        let index = SpatialIndex::build(&points);
        let ctx = RenderingContext::new(20, 20);
        let config = FieldConfig::default().with_params(FitParameters::new(40.0, 3).unwrap());
        let mut buffer = RenderBuffer::for_context(&ctx);

        MlsField::new(FitKind::Plane)
            .render(&Frame::new(&index, &ctx, &config), &mut buffer)
            .unwrap();

        // the center moves onto the line, the value stays the pixel's distance
        let above = buffer.pixel(10, 14).unwrap();
        assert!((above[0] - 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_far_pixels_are_invalid() {
        let points = horizontal_line();
        let index = SpatialIndex::build(&points);
        let ctx = RenderingContext::new(80, 80);
        let config = FieldConfig::default().with_params(FitParameters::new(5.0, 2).unwrap());
        let mut buffer = RenderBuffer::for_context(&ctx);

        MlsField::new(FitKind::Sphere)
            .render(&Frame::new(&index, &ctx, &config), &mut buffer)
            .unwrap();

        let far = buffer.pixel(70, 70).unwrap();
        assert_eq!(Validity::from_f32(far[VALIDITY_CHANNEL]), Validity::Invalid);
    }

    #[test]
    fn test_mls_converges_onto_data() {
        let points = horizontal_line();
        let index = SpatialIndex::build(&points);
        let params = FitParameters::new(8.0, 3).unwrap();
        let fit = mls_fit(FitKind::OrientedSphere, &index, &params, Point2f::new(9.0, 13.0));
        assert!(fit.is_stable());
        let p = fit.project(&Point2f::new(9.0, 13.0));
        assert!((p.y - 10.0).abs() < 1e-2);
    }

    #[test]
    fn test_trajectories_mark_borders() {
        let points = vec![
            OrientedPoint2f::with_default_normal(5.0, 5.0),
            OrientedPoint2f::with_default_normal(10.0, 5.0),
            OrientedPoint2f::with_default_normal(15.0, 5.0),
            OrientedPoint2f::with_default_normal(10.0, 12.0),
        ];
        let index = SpatialIndex::build(&points);
        let ctx = RenderingContext::new(20, 20);
        let config = FieldConfig::default()
            .with_params(FitParameters::new(30.0, 1).unwrap())
            .with_trajectories(true);
        let mut buffer = RenderBuffer::for_context(&ctx);

        MlsField::new(FitKind::Plane)
            .render(&Frame::new(&index, &ctx, &config), &mut buffer)
            .unwrap();

        let borders = buffer
            .pixels()
            .iter()
            .filter(|p| Validity::from_f32(p[VALIDITY_CHANNEL]) == Validity::Border)
            .count();
        assert!(borders > 0);
    }
}
