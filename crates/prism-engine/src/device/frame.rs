use crate::coords::{OutputSize, Viewport};

use super::GraphicsBackend;

/// Everything a renderer needs to draw one frame.
///
/// Borrowed from `DeviceResources`; the borrow ends before `present` so
/// handles cannot be retained across a resize or recovery.
pub struct FrameTargets<'a, B: GraphicsBackend> {
    pub device: &'a B::Device,
    pub context: &'a B::Context,
    pub swap_chain: &'a B::SwapChain,
    pub render_target: &'a B::RenderTarget,
    pub viewport: Viewport,
    pub output_size: OutputSize,
}
