use super::{BackendError, CapabilityTier};

/// Fatal errors surfaced by `DeviceResources`.
///
/// Device loss is not represented here: it is recovered inside `present`.
/// Whenever one of these is returned, every GPU object has been released.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// No window is bound, or a previous fatal error tore the bundle down.
    #[error("no window is bound to the device resources")]
    Unbound,

    /// The configured capability ladder has no tiers to try.
    #[error("capability tier ladder is empty")]
    EmptyTierLadder,

    /// Every capability tier in the ladder was rejected.
    #[error("no capability tier could be created (tried {tried:?})")]
    TiersExhausted {
        tried: Vec<CapabilityTier>,
        #[source]
        last: BackendError,
    },

    #[error("failed to create swap chain")]
    SwapChain(#[source] BackendError),

    #[error("failed to resize swap chain buffers")]
    ResizeBuffers(#[source] BackendError),

    #[error("failed to create back-buffer render target")]
    RenderTarget(#[source] BackendError),

    #[error("present failed")]
    Present(#[source] BackendError),

    /// Rebuilding after a device loss failed.
    #[error("device-loss recovery failed")]
    RecoveryFailed(#[source] Box<DeviceError>),
}
