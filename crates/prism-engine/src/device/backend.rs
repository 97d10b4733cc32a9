use std::fmt::Debug;

use crate::coords::OutputSize;

use super::CapabilityTier;

/// Error reported by a backend call. Backends attach context with `anyhow`.
pub type BackendError = anyhow::Error;

/// Result of handing a back buffer to the display.
#[derive(Debug, thiserror::Error)]
pub enum PresentError {
    /// The device was removed or reset; every object created from it is invalid.
    #[error("device lost: {reason}")]
    DeviceLost { reason: String },

    /// Any other presentation failure.
    #[error("present failed: {0:#}")]
    Failure(BackendError),
}

/// Window a swap chain can be bound to.
pub trait PresentationWindow {
    type Id: Copy + Eq + Debug;

    fn id(&self) -> Self::Id;

    /// Current client-area size in physical pixels.
    fn client_size(&self) -> OutputSize;
}

/// Native graphics API binding driven by `DeviceResources`.
///
/// Implementations create objects only; ownership, ordering and recovery are
/// decided by the caller. Objects are released by dropping them.
pub trait GraphicsBackend {
    type Window: PresentationWindow;
    type Device;
    type Context;
    type SwapChain;
    type RenderTarget;

    /// Creates a device and its submission context at exactly `tier`.
    fn create_device(
        &mut self,
        tier: CapabilityTier,
    ) -> Result<(Self::Device, Self::Context), BackendError>;

    /// Creates a swap chain for `window` with buffers of `size`.
    fn create_swap_chain(
        &mut self,
        device: &Self::Device,
        window: &Self::Window,
        size: OutputSize,
    ) -> Result<Self::SwapChain, BackendError>;

    /// Resizes the swap chain buffers in place.
    ///
    /// Every render target created from `swap_chain` must already be released.
    fn resize_swap_chain(
        &mut self,
        device: &Self::Device,
        swap_chain: &mut Self::SwapChain,
        size: OutputSize,
    ) -> Result<(), BackendError>;

    /// Creates a drawable view over the swap chain's current back buffer.
    fn create_render_target(
        &mut self,
        device: &Self::Device,
        swap_chain: &mut Self::SwapChain,
    ) -> Result<Self::RenderTarget, BackendError>;

    /// Presents the back buffer behind `target` and advances `target` to the
    /// next back buffer in the rotation.
    fn present(
        &mut self,
        device: &Self::Device,
        swap_chain: &mut Self::SwapChain,
        target: &mut Self::RenderTarget,
    ) -> Result<(), PresentError>;
}
