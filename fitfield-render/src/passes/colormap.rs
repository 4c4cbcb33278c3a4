//! Decoding of scalar field channels into colors

use super::{Frame, RenderPass};
use crate::buffer::{
    FieldTag, Pixel, RenderBuffer, Validity, FIELD_CHANNEL, VALIDITY_CHANNEL, VALUE_CHANNEL,
};
use crate::parallel::execute_parallel;
use fitfield_core::{Error, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Absorbs rounding so that band boundaries quantize onto themselves
const BAND_EPSILON: f32 = 1e-4;

/// Snap `x` (clamped to [0, 1]) down to one of `bands` levels
pub fn quantify(x: f32, bands: u32) -> f32 {
    let n = bands.max(1) as f32;
    let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
    (x * n + BAND_EPSILON).floor().min(n) / n
}

fn mix(a: Pixel, b: Pixel, t: f32) -> Pixel {
    std::array::from_fn(|c| a[c] * (1.0 - t) + b[c] * t)
}

const WHITE: Pixel = [1.0; 4];

/// Banded false-color ramp with isocontour highlight.
///
/// Valid values are normalized by the frame max, quantized into `bands`
/// levels and mixed from white toward the positive or negative color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorMap {
    pub default_color: Pixel,
    pub border_color: Pixel,
    pub iso_color: Pixel,
    pub positive_color: Pixel,
    pub negative_color: Pixel,
    pub bands: u32,
    /// Values with a magnitude below this are drawn with `iso_color`
    pub iso_width: f32,
}

impl Default for ColorMap {
    fn default() -> Self {
        Self {
            default_color: [1.0, 1.0, 1.0, 1.0],
            border_color: [0.0, 0.0, 0.0, 1.0],
            iso_color: [1.0, 0.0, 0.0, 1.0],
            positive_color: [0.1, 0.35, 0.85, 1.0],
            negative_color: [0.9, 0.55, 0.1, 1.0],
            bands: 10,
            iso_width: 1.0,
        }
    }
}

impl ColorMap {
    pub fn with_bands(mut self, bands: u32) -> Self {
        self.bands = bands;
        self
    }

    pub fn with_iso_width(mut self, iso_width: f32) -> Self {
        self.iso_width = iso_width;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.bands == 0 {
            return Err(Error::InvalidParameter("colormap needs at least one band".to_string()));
        }
        if !(self.iso_width >= 0.0) {
            return Err(Error::InvalidParameter(format!(
                "iso width must be non-negative, got {}",
                self.iso_width
            )));
        }
        Ok(())
    }

    /// Color of a valid field value
    pub fn value_color(&self, value: f32, max_value: f32) -> Pixel {
        if value.abs() < self.iso_width {
            return self.iso_color;
        }
        let x = if max_value > f32::EPSILON {
            value.abs() / max_value
        } else {
            0.0
        };
        let ramp = if value >= 0.0 {
            self.positive_color
        } else {
            self.negative_color
        };
        mix(WHITE, ramp, quantify(x, self.bands))
    }

    fn decode(&self, pixel: &Pixel, max_value: f32) -> Pixel {
        if FieldTag::from_f32(pixel[FIELD_CHANNEL]) == FieldTag::NoField {
            return self.default_color;
        }
        match Validity::from_f32(pixel[VALIDITY_CHANNEL]) {
            Validity::Border => self.border_color,
            Validity::Invalid => self.default_color,
            Validity::Valid => self.value_color(pixel[VALUE_CHANNEL], max_value),
        }
    }
}

impl RenderPass for ColorMap {
    fn name(&self) -> &str {
        "ColorMap"
    }

    fn render(&self, _frame: &Frame<'_>, buffer: &mut RenderBuffer) -> Result<()> {
        if buffer.field_tag() == FieldTag::NoField {
            // the background stays, only the header slots in pixel 0 are replaced
            let restored = buffer.pixels().get(1).copied().unwrap_or(self.default_color);
            if let Some(first) = buffer.pixels_mut().first_mut() {
                *first = restored;
            }
            return Ok(());
        }
        self.validate()?;

        let max_value = buffer.max_value();
        execute_parallel(|| {
            buffer
                .pixels_mut()
                .par_iter_mut()
                .for_each(|pixel| *pixel = self.decode(pixel, max_value));
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::field_pixel;
    use crate::config::FieldConfig;
    use crate::context::RenderingContext;
    use fitfield_algorithms::SpatialIndex;

    #[test]
    fn test_quantify_is_idempotent() {
        for bands in [1, 3, 7, 10, 64] {
            for i in 0..=1000 {
                let x = i as f32 / 1000.0;
                let once = quantify(x, bands);
                assert_eq!(quantify(once, bands), once, "x = {x}, bands = {bands}");
            }
        }
    }

    #[test]
    fn test_quantify_levels() {
        assert_eq!(quantify(0.0, 10), 0.0);
        assert_eq!(quantify(0.35, 10), 0.3);
        // just below a boundary snaps up, further below does not
        assert_eq!(quantify(0.29999, 10), 0.3);
        assert_eq!(quantify(0.2995, 10), 0.2);
        assert_eq!(quantify(1.0, 10), 1.0);
        assert_eq!(quantify(2.0, 4), 1.0);
        assert_eq!(quantify(-1.0, 4), 0.0);
    }

    #[test]
    fn test_decode() {
        let ctx = RenderingContext::new(4, 1);
        let index = SpatialIndex::empty();
        let config = FieldConfig::default();
        let colormap = ColorMap::default();

        let mut buffer = RenderBuffer::for_context(&ctx);
        buffer.pixels_mut()[1] = field_pixel(0.5, Validity::Valid);
        buffer.pixels_mut()[2] = field_pixel(0.0, Validity::Invalid);
        buffer.pixels_mut()[3] = field_pixel(-8.0, Validity::Border);
        buffer.pixels_mut()[0] = field_pixel(10.0, Validity::Valid);
        buffer.set_header(10.0, FieldTag::ScalarField);

        colormap.render(&Frame::new(&index, &ctx, &config), &mut buffer).unwrap();

        let pixels = buffer.pixels();
        assert_eq!(pixels[0], colormap.positive_color);
        assert_eq!(pixels[1], colormap.iso_color);
        assert_eq!(pixels[2], colormap.default_color);
        assert_eq!(pixels[3], colormap.border_color);
    }

    #[test]
    fn test_no_field_keeps_background() {
        let ctx = RenderingContext::new(2, 2);
        let index = SpatialIndex::empty();
        let config = FieldConfig::default();
        let mut buffer = RenderBuffer::for_context(&ctx);
        buffer.fill([0.3, 0.3, 0.3, 1.0]);
        buffer.mark_no_field();

        ColorMap::default()
            .render(&Frame::new(&index, &ctx, &config), &mut buffer)
            .unwrap();
        assert!(buffer.pixels().iter().all(|p| *p == [0.3, 0.3, 0.3, 1.0]));
    }

    #[test]
    fn test_no_field_single_pixel_uses_default_color() {
        let ctx = RenderingContext::new(1, 1);
        let index = SpatialIndex::empty();
        let config = FieldConfig::default();
        let mut buffer = RenderBuffer::for_context(&ctx);
        buffer.fill([0.3, 0.3, 0.3, 1.0]);
        buffer.mark_no_field();

        let colormap = ColorMap::default();
        colormap.render(&Frame::new(&index, &ctx, &config), &mut buffer).unwrap();
        assert_eq!(buffer.pixels()[0], colormap.default_color);
    }

    #[test]
    fn test_negative_values_use_negative_ramp() {
        let colormap = ColorMap::default().with_iso_width(0.0);
        assert_eq!(colormap.value_color(-4.0, 4.0), colormap.negative_color);
        assert_eq!(colormap.value_color(0.0, 0.0), WHITE);
    }
}
