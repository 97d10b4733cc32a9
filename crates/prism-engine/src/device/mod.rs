//! Graphics device, swap chain and back-buffer lifecycle.
//!
//! This module is responsible for:
//! - creating the device and its submission context, walking a capability ladder
//! - creating the swap chain for a window and resizing its buffers
//! - rebuilding the back-buffer render target and viewport
//! - presenting, and recovering transparently from device loss
//!
//! `DeviceResources` owns the state machine; a `GraphicsBackend` provides the
//! native objects. `WgpuBackend` is the production backend.

mod backend;
mod error;
mod frame;
mod init;
mod notify;
mod resources;
mod tier;
pub mod wgpu_backend;

#[cfg(test)]
mod mock;

pub use backend::{BackendError, GraphicsBackend, PresentError, PresentationWindow};
pub use error::DeviceError;
pub use frame::FrameTargets;
pub use init::DeviceConfig;
pub use notify::DeviceNotify;
pub use resources::{DeviceResources, LifecycleState, PresentOutcome};
pub use tier::{default_ladder, CapabilityTier};
pub use wgpu_backend::{WgpuBackend, WgpuInit};
