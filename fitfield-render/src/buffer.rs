//! Float RGBA render buffers and their channel protocol
//!
//! Until the colormap runs, the four channels of a pixel are not colors:
//!
//! | channel | meaning                                            |
//! |---------|----------------------------------------------------|
//! | 0       | field value                                        |
//! | 1       | frame max magnitude (header slot, pixel 0 only)    |
//! | 2       | [`Validity`] tag                                   |
//! | 3       | [`FieldTag`] (frame tag in pixel 0)                |

use crate::context::RenderingContext;

pub const CHANNELS: usize = 4;

/// One RGBA float pixel
pub type Pixel = [f32; CHANNELS];

pub const VALUE_CHANNEL: usize = 0;
pub const MAX_CHANNEL: usize = 1;
pub const VALIDITY_CHANNEL: usize = 2;
pub const FIELD_CHANNEL: usize = 3;

/// Flat float index of the frame max magnitude
pub const HEADER_MAX_SLOT: usize = MAX_CHANNEL;
/// Flat float index of the frame field tag
pub const HEADER_FIELD_SLOT: usize = FIELD_CHANNEL;

/// Max magnitude written when a frame carries no field
pub const NO_FIELD_MAX: f32 = -1.0;

/// Per-pixel validity tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Invalid,
    Valid,
    /// Pixel crossed by a trajectory
    Border,
}

impl Validity {
    pub fn as_f32(self) -> f32 {
        match self {
            Validity::Invalid => 0.0,
            Validity::Valid => 1.0,
            Validity::Border => 2.0,
        }
    }

    /// Unknown tags decode as `Invalid`
    pub fn from_f32(value: f32) -> Self {
        match value.round() as i32 {
            1 => Validity::Valid,
            2 => Validity::Border,
            _ => Validity::Invalid,
        }
    }
}

/// Kind of content carried by a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTag {
    NoField,
    ScalarField,
}

impl FieldTag {
    pub fn as_f32(self) -> f32 {
        match self {
            FieldTag::NoField => 0.0,
            FieldTag::ScalarField => 1.0,
        }
    }

    pub fn from_f32(value: f32) -> Self {
        if value.round() as i32 == 1 {
            FieldTag::ScalarField
        } else {
            FieldTag::NoField
        }
    }
}

/// Encode an evaluated pixel
pub fn field_pixel(value: f32, validity: Validity) -> Pixel {
    [value, 0.0, validity.as_f32(), FieldTag::ScalarField.as_f32()]
}

/// Row-major buffer of float RGBA pixels
#[derive(Debug, Clone, PartialEq)]
pub struct RenderBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl RenderBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0; CHANNELS]; width * height],
        }
    }

    pub fn for_context(ctx: &RenderingContext) -> Self {
        Self::new(ctx.width, ctx.height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Reallocate for a new size, clearing the content when the size changes
    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            *self = Self::new(width, height);
        }
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// Channels of every pixel, laid out contiguously
    pub fn as_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn as_flat_mut(&mut self) -> &mut [f32] {
        bytemuck::cast_slice_mut(&mut self.pixels)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<&Pixel> {
        if x >= self.width {
            return None;
        }
        self.pixels.get(y * self.width + x)
    }

    pub fn pixel_mut(&mut self, x: usize, y: usize) -> Option<&mut Pixel> {
        if x >= self.width {
            return None;
        }
        self.pixels.get_mut(y * self.width + x)
    }

    pub fn fill(&mut self, color: Pixel) {
        self.pixels.fill(color);
    }

    /// Frame max magnitude, `NO_FIELD_MAX` when the buffer is empty
    pub fn max_value(&self) -> f32 {
        self.as_flat()
            .get(HEADER_MAX_SLOT)
            .copied()
            .unwrap_or(NO_FIELD_MAX)
    }

    pub fn field_tag(&self) -> FieldTag {
        self.as_flat()
            .get(HEADER_FIELD_SLOT)
            .map_or(FieldTag::NoField, |tag| FieldTag::from_f32(*tag))
    }

    pub fn set_header(&mut self, max_value: f32, tag: FieldTag) {
        if let Some(pixel) = self.pixels.first_mut() {
            pixel[MAX_CHANNEL] = max_value;
            pixel[FIELD_CHANNEL] = tag.as_f32();
        }
    }

    /// Tag the frame as carrying no field, leaving other pixels untouched
    pub fn mark_no_field(&mut self) {
        self.set_header(NO_FIELD_MAX, FieldTag::NoField);
    }
}

/// Two buffers: one exposed to consumers, one being written.
///
/// The writable buffer becomes presentable only through [`PingPong::flip`].
#[derive(Debug, Clone)]
pub struct PingPong {
    buffers: [RenderBuffer; 2],
    front: usize,
}

impl PingPong {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            buffers: [RenderBuffer::new(width, height), RenderBuffer::new(width, height)],
            front: 0,
        }
    }

    pub fn for_context(ctx: &RenderingContext) -> Self {
        Self::new(ctx.width, ctx.height)
    }

    pub fn writable_buffer(&mut self) -> &mut RenderBuffer {
        &mut self.buffers[1 - self.front]
    }

    pub fn presentable_buffer(&self) -> &RenderBuffer {
        &self.buffers[self.front]
    }

    pub fn flip(&mut self) {
        self.front = 1 - self.front;
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        for buffer in &mut self.buffers {
            buffer.resize(width, height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_slots() {
        let mut buffer = RenderBuffer::new(3, 2);
        buffer.set_header(4.5, FieldTag::ScalarField);
        assert_eq!(buffer.as_flat()[1], 4.5);
        assert_eq!(buffer.as_flat()[3], 1.0);
        assert_eq!(buffer.max_value(), 4.5);
        assert_eq!(buffer.field_tag(), FieldTag::ScalarField);

        buffer.mark_no_field();
        assert_eq!(buffer.max_value(), NO_FIELD_MAX);
        assert_eq!(buffer.field_tag(), FieldTag::NoField);
    }

    #[test]
    fn test_empty_buffer_header() {
        let mut buffer = RenderBuffer::new(0, 0);
        buffer.set_header(1.0, FieldTag::ScalarField);
        assert_eq!(buffer.field_tag(), FieldTag::NoField);
        assert_eq!(buffer.max_value(), NO_FIELD_MAX);
    }

    #[test]
    fn test_tags_round_trip() {
        for v in [Validity::Invalid, Validity::Valid, Validity::Border] {
            assert_eq!(Validity::from_f32(v.as_f32()), v);
        }
        assert_eq!(Validity::from_f32(7.0), Validity::Invalid);
    }

    #[test]
    fn test_pixel_access() {
        let mut buffer = RenderBuffer::new(2, 2);
        *buffer.pixel_mut(1, 1).unwrap() = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(buffer.as_flat()[12..16], [1.0, 2.0, 3.0, 4.0]);
        assert!(buffer.pixel(2, 0).is_none());
        assert!(buffer.pixel(0, 2).is_none());
    }

    #[test]
    fn test_ping_pong() {
        let mut pp = PingPong::new(1, 1);
        pp.writable_buffer().fill([1.0; 4]);
        assert_eq!(pp.presentable_buffer().pixels()[0], [0.0; 4]);
        pp.flip();
        assert_eq!(pp.presentable_buffer().pixels()[0], [1.0; 4]);
        assert_eq!(pp.writable_buffer().pixels()[0], [0.0; 4]);
    }
}
