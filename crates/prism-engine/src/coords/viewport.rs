use super::OutputSize;

/// Pixel rectangle the rasterizer maps normalized device coordinates into.
///
/// Origin is top-left; depth range defaults to `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    /// Full-surface viewport for the given output size.
    #[inline]
    pub fn from_output_size(size: OutputSize) -> Self {
        Self::new(0.0, 0.0, size.width as f32, size.height as f32)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Applies this viewport to a render pass.
    pub fn apply(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.is_valid() {
            pass.set_viewport(
                self.x,
                self.y,
                self.width,
                self.height,
                self.min_depth,
                self.max_depth,
            );
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}
