use super::{Frame, RenderPass};
use crate::buffer::{Pixel, RenderBuffer};
use fitfield_core::Result;
use serde::{Deserialize, Serialize};

/// Background fill, first pass of every frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillPass {
    pub color: Pixel,
}

impl Default for FillPass {
    fn default() -> Self {
        Self { color: [1.0; 4] }
    }
}

impl FillPass {
    pub fn new(color: Pixel) -> Self {
        Self { color }
    }
}

impl RenderPass for FillPass {
    fn name(&self) -> &str {
        "Fill"
    }

    fn render(&self, _frame: &Frame<'_>, buffer: &mut RenderBuffer) -> Result<()> {
        buffer.fill(self.color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldConfig;
    use crate::context::RenderingContext;
    use fitfield_algorithms::SpatialIndex;

    #[test]
    fn test_fill_overwrites_everything() {
        let ctx = RenderingContext::new(3, 3);
        let index = SpatialIndex::empty();
        let config = FieldConfig::default();
        let mut buffer = RenderBuffer::for_context(&ctx);
        buffer.pixels_mut()[4] = [9.0; 4];

        FillPass::new([0.1, 0.2, 0.3, 1.0])
            .render(&Frame::new(&index, &ctx, &config), &mut buffer)
            .unwrap();
        assert!(buffer.pixels().iter().all(|p| *p == [0.1, 0.2, 0.3, 1.0]));
    }
}
