//! Buffer-mutating passes composed by the pipeline

mod anchored_field;
mod colormap;
mod distance_field;
mod fill;
mod global_field;
mod mls_field;
mod point_overlay;

pub use anchored_field::AnchoredField;
pub use colormap::{quantify, ColorMap};
pub use distance_field::{DistanceField, DistanceFromPoint};
pub use fill::FillPass;
pub use global_field::GlobalField;
pub use mls_field::{fit_at, mls_fit, MlsField, MAX_PROJECTION_ROUNDS};
pub use point_overlay::PointOverlay;

use crate::buffer::{field_pixel, FieldTag, RenderBuffer, Validity, FIELD_CHANNEL, VALIDITY_CHANNEL};
use crate::config::FieldConfig;
use crate::context::RenderingContext;
use crate::parallel::parallel_rows_reduce;
use fitfield_algorithms::SpatialIndex;
use fitfield_core::{OrientedPoint2f, Point2f, Result};

/// Read-only state shared by every pass of one frame
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub index: &'a SpatialIndex,
    pub ctx: &'a RenderingContext,
    pub config: &'a FieldConfig,
}

impl<'a> Frame<'a> {
    pub fn new(index: &'a SpatialIndex, ctx: &'a RenderingContext, config: &'a FieldConfig) -> Self {
        Self { index, ctx, config }
    }

    pub fn points(&self) -> &'a [OrientedPoint2f] {
        self.index.points()
    }
}

/// One step of the compositing pipeline
pub trait RenderPass: Send + Sync {
    fn name(&self) -> &str;

    /// Transform `buffer`, sized to `frame.ctx`
    fn render(&self, frame: &Frame<'_>, buffer: &mut RenderBuffer) -> Result<()>;
}

/// Evaluate `eval` at every pixel and write the field channels.
///
/// `None` marks the pixel invalid. The largest valid magnitude is stored in
/// the frame header.
pub(crate) fn write_scalar_field<F>(ctx: &RenderingContext, buffer: &mut RenderBuffer, eval: F) -> f32
where
    F: Fn(&Point2f) -> Option<f32> + Sync + Send,
{
    let width = buffer.width();
    let max_value = parallel_rows_reduce(
        buffer.pixels_mut(),
        width,
        0.0f32,
        |y, row| {
            let mut row_max = 0.0f32;
            for (x, pixel) in row.iter_mut().enumerate() {
                let q = ctx.pixel_to_point(x, y);
                *pixel = match eval(&q) {
                    Some(value) => {
                        row_max = row_max.max(value.abs());
                        field_pixel(value, Validity::Valid)
                    }
                    None => field_pixel(0.0, Validity::Invalid),
                };
            }
            row_max
        },
        f32::max,
    );

    buffer.set_header(max_value, FieldTag::ScalarField);
    max_value
}

/// Flag pixels crossed by trajectories; later writes win
pub(crate) fn mark_border_pixels(
    ctx: &RenderingContext,
    buffer: &mut RenderBuffer,
    paths: impl IntoIterator<Item = Vec<(i64, i64)>>,
) {
    let pixels = buffer.pixels_mut();
    for (x, y) in paths.into_iter().flatten() {
        if let Some(pixel) = ctx.pixel_index(x, y).and_then(|i| pixels.get_mut(i)) {
            pixel[VALIDITY_CHANNEL] = Validity::Border.as_f32();
            pixel[FIELD_CHANNEL] = FieldTag::ScalarField.as_f32();
        }
    }
}
