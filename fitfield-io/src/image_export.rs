//! Export of rendered frames as 8-bit images

use crate::error::IoError;
use fitfield_core::Result;
use fitfield_render::{RenderBuffer, CHANNELS};
use image::{ImageFormat, RgbaImage};
use std::path::Path;

/// How float colors are turned into bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorEncoding {
    /// `⌊v · 255⌋`
    #[default]
    Linear,
    /// sRGB transfer curve on the color channels, alpha stays linear
    Srgb,
}

/// Linear `[0, 1]` value to sRGB `[0, 1]`, without branching
pub fn encode_srgb(linear: f32) -> f32 {
    let x = linear.clamp(0.0, 1.0);
    let low = x * 12.92;
    // 1.055·x^(1/2.4) − 0.055, written so that x = 1 maps exactly to 1
    let high = 1.0 + 1.055 * (x.powf(1.0 / 2.4) - 1.0);
    let t = (x > 0.0031308) as u8 as f32;
    low * (1.0 - t) + high * t
}

/// Clamp to `[0, 1]` and floor to a byte
pub fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).floor() as u8
}

/// Convert a frame to interleaved RGBA bytes, row 0 first
pub fn to_rgba8(buffer: &RenderBuffer, encoding: ColorEncoding) -> Vec<u8> {
    buffer
        .as_flat()
        .iter()
        .enumerate()
        .map(|(i, &v)| match encoding {
            ColorEncoding::Srgb if i % CHANNELS != CHANNELS - 1 => to_byte(encode_srgb(v)),
            _ => to_byte(v),
        })
        .collect()
}

/// Write a frame as a PNG file
pub fn write_png<P: AsRef<Path>>(
    buffer: &RenderBuffer,
    path: P,
    encoding: ColorEncoding,
) -> Result<()> {
    let path = path.as_ref();
    let (width, height) = (buffer.width() as u32, buffer.height() as u32);
    let image = RgbaImage::from_raw(width, height, to_rgba8(buffer, encoding)).ok_or_else(|| {
        IoError::ImageError {
            message: format!("buffer does not match a {width}x{height} image"),
        }
    })?;

    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(IoError::from)?;
    tracing::info!(path = %path.display(), width, height, ?encoding, "image exported");
    Ok(())
}
