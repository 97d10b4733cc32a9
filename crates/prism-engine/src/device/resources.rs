use std::error::Error;
use std::fmt::Write as _;

use crate::coords::{OutputSize, Viewport};

use super::{
    CapabilityTier, DeviceConfig, DeviceError, DeviceNotify, FrameTargets, GraphicsBackend,
    PresentError, PresentationWindow,
};

/// Externally observable lifecycle state.
///
/// There is no "lost" state: loss is recovered inside `present` or the bundle
/// is torn down back to `Unbound`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LifecycleState {
    /// No device exists.
    Unbound,
    /// Device, context and swap chain exist; size-dependent resources do not.
    DeviceReady,
    /// Everything needed to draw and present exists.
    SurfaceReady,
}

/// Outcome of a successful `present`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PresentOutcome {
    /// The frame was handed to the display.
    Presented,
    /// The device was lost; every resource was recreated. Handles fetched
    /// before the call are stale.
    Recovered,
}

/// Device-level objects. Created and released together.
struct DeviceObjects<B: GraphicsBackend> {
    device: B::Device,
    context: B::Context,
    swap_chain: B::SwapChain,
    tier: CapabilityTier,
}

/// Objects derived from the swap chain's current buffers and the output size.
struct SurfaceTargets<B: GraphicsBackend> {
    render_target: B::RenderTarget,
    viewport: Viewport,
}

/// Single owner of the device / swap chain / back-buffer bundle for one window.
///
/// Construction leaves the bundle unbound. `set_window` brings it to
/// `SurfaceReady`; `present` keeps it there, recovering from device loss in
/// place. Any fatal error releases everything before it is returned.
///
/// Calls must be serialized by the owner; nothing here is thread-aware.
pub struct DeviceResources<B: GraphicsBackend> {
    backend: B,
    config: DeviceConfig,

    window: Option<B::Window>,
    objects: Option<DeviceObjects<B>>,
    targets: Option<SurfaceTargets<B>>,

    /// Cached client-area size; the only input used to size targets.
    output_size: OutputSize,

    device_generation: u64,
    surface_generation: u64,

    notify: Vec<Box<dyn DeviceNotify>>,
}

impl<B: GraphicsBackend> DeviceResources<B> {
    pub fn new(backend: B, config: DeviceConfig) -> Self {
        Self {
            backend,
            config,
            window: None,
            objects: None,
            targets: None,
            output_size: OutputSize::default(),
            device_generation: 0,
            surface_generation: 0,
            notify: Vec::new(),
        }
    }

    /// Binds to `window` and builds every resource sized to its client area.
    ///
    /// Binding the window that is already bound only rebuilds the
    /// size-dependent resources. Binding a different window rebuilds from
    /// scratch.
    pub fn set_window(&mut self, window: B::Window) -> Result<(), DeviceError> {
        let rebinding = self
            .window
            .as_ref()
            .is_some_and(|bound| bound.id() != window.id());
        if rebinding {
            log::debug!("rebinding to window {:?}; releasing previous resources", window.id());
            self.cleanup_resources();
        }

        let size = window.client_size();
        self.output_size = size;
        self.window = Some(window);

        let built = if self.objects.is_none() {
            self.create_device_resources()
        } else {
            Ok(())
        };

        match built.and_then(|()| self.create_window_size_dependent_resources(size)) {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Handles a resize notification for the bound window.
    ///
    /// Returns `false` when the client area is unchanged and
    /// `DeviceConfig::skip_unchanged_resize` is set.
    pub fn window_size_changed(&mut self) -> Result<bool, DeviceError> {
        let size = match (self.window.as_ref(), self.objects.as_ref()) {
            (Some(window), Some(_)) => window.client_size(),
            _ => return Err(DeviceError::Unbound),
        };

        if self.config.skip_unchanged_resize && size == self.output_size && self.targets.is_some() {
            return Ok(false);
        }

        match self.create_window_size_dependent_resources(size) {
            Ok(()) => Ok(true),
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Presents the current back buffer.
    ///
    /// May block until the display accepts the frame. Device loss is
    /// recovered here and reported as `PresentOutcome::Recovered`; any other
    /// failure tears the bundle down and is returned.
    pub fn present(&mut self) -> Result<PresentOutcome, DeviceError> {
        let (Some(objects), Some(targets)) = (self.objects.as_mut(), self.targets.as_mut()) else {
            return Err(DeviceError::Unbound);
        };

        let result = self.backend.present(
            &objects.device,
            &mut objects.swap_chain,
            &mut targets.render_target,
        );

        match result {
            Ok(()) => Ok(PresentOutcome::Presented),
            Err(PresentError::DeviceLost { reason }) => {
                log::warn!("device lost on present ({reason}); recreating device resources");
                self.handle_device_lost()?;
                Ok(PresentOutcome::Recovered)
            }
            Err(PresentError::Failure(err)) => Err(self.fail(DeviceError::Present(err))),
        }
    }

    /// Registers an observer for device loss and restoration.
    pub fn register_device_notify(&mut self, notify: Box<dyn DeviceNotify>) {
        self.notify.push(notify);
    }

    /// Cached output size. Zero before the first successful `set_window`.
    pub fn output_size(&self) -> OutputSize {
        self.output_size
    }

    pub fn state(&self) -> LifecycleState {
        match (&self.objects, &self.targets) {
            (None, _) => LifecycleState::Unbound,
            (Some(_), None) => LifecycleState::DeviceReady,
            (Some(_), Some(_)) => LifecycleState::SurfaceReady,
        }
    }

    /// Tier the live device was created at.
    pub fn selected_tier(&self) -> Option<CapabilityTier> {
        self.objects.as_ref().map(|o| o.tier)
    }

    /// Incremented every time device-level resources are created.
    pub fn device_generation(&self) -> u64 {
        self.device_generation
    }

    /// Incremented every time the render target and viewport are rebuilt.
    pub fn surface_generation(&self) -> u64 {
        self.surface_generation
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn window(&self) -> Option<&B::Window> {
        self.window.as_ref()
    }

    pub fn device(&self) -> Option<&B::Device> {
        self.objects.as_ref().map(|o| &o.device)
    }

    pub fn context(&self) -> Option<&B::Context> {
        self.objects.as_ref().map(|o| &o.context)
    }

    pub fn swap_chain(&self) -> Option<&B::SwapChain> {
        self.objects.as_ref().map(|o| &o.swap_chain)
    }

    /// Render target over the current back buffer.
    pub fn render_target(&self) -> Option<&B::RenderTarget> {
        self.targets.as_ref().map(|t| &t.render_target)
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.targets.as_ref().map(|t| &t.viewport)
    }

    /// All per-frame handles at once, or `None` unless `SurfaceReady`.
    pub fn frame(&self) -> Option<FrameTargets<'_, B>> {
        let objects = self.objects.as_ref()?;
        let targets = self.targets.as_ref()?;

        Some(FrameTargets {
            device: &objects.device,
            context: &objects.context,
            swap_chain: &objects.swap_chain,
            render_target: &targets.render_target,
            viewport: targets.viewport,
            output_size: self.output_size,
        })
    }

    /// Creates the device, its context and the swap chain.
    ///
    /// Must only run while no device exists.
    fn create_device_resources(&mut self) -> Result<(), DeviceError> {
        debug_assert!(self.objects.is_none(), "device resources already exist");

        let Some(window) = self.window.as_ref() else {
            return Err(DeviceError::Unbound);
        };

        let mut tried = Vec::with_capacity(self.config.tiers.len());
        let mut last_error = None;
        let mut created = None;

        for &tier in &self.config.tiers {
            tried.push(tier);
            match self.backend.create_device(tier) {
                Ok((device, context)) => {
                    created = Some((tier, device, context));
                    break;
                }
                Err(err) => {
                    log::warn!("capability tier {tier} unavailable: {err:#}");
                    last_error = Some(err);
                }
            }
        }

        let (tier, device, context) = match (created, last_error) {
            (Some(created), _) => created,
            (None, Some(last)) => return Err(DeviceError::TiersExhausted { tried, last }),
            (None, None) => return Err(DeviceError::EmptyTierLadder),
        };

        let buffer_size = self.output_size.clamped_to_min();
        let swap_chain = match self.backend.create_swap_chain(&device, window, buffer_size) {
            Ok(swap_chain) => swap_chain,
            Err(err) => {
                drop(context);
                drop(device);
                return Err(DeviceError::SwapChain(err));
            }
        };

        self.objects = Some(DeviceObjects {
            device,
            context,
            swap_chain,
            tier,
        });
        self.device_generation += 1;

        log::info!(
            "device resources created at {tier} tier (generation {})",
            self.device_generation
        );
        Ok(())
    }

    /// Resizes the swap chain buffers to `size` and rebuilds the render
    /// target and viewport. The previous render target is released first.
    fn create_window_size_dependent_resources(&mut self, size: OutputSize) -> Result<(), DeviceError> {
        let Some(objects) = self.objects.as_mut() else {
            return Err(DeviceError::Unbound);
        };

        if let Some(previous) = self.targets.take() {
            drop(previous.render_target);
        }

        self.output_size = size;

        self.backend
            .resize_swap_chain(&objects.device, &mut objects.swap_chain, size.clamped_to_min())
            .map_err(DeviceError::ResizeBuffers)?;

        let render_target = self
            .backend
            .create_render_target(&objects.device, &mut objects.swap_chain)
            .map_err(DeviceError::RenderTarget)?;

        self.targets = Some(SurfaceTargets {
            render_target,
            viewport: Viewport::from_output_size(size),
        });
        self.surface_generation += 1;

        log::debug!("size-dependent resources built for {}x{}", size.width, size.height);
        Ok(())
    }

    /// Full teardown and rebuild against the last known output size.
    fn handle_device_lost(&mut self) -> Result<(), DeviceError> {
        for notify in self.notify.iter_mut() {
            notify.on_device_lost();
        }

        self.cleanup_resources();

        let size = self.output_size;
        let rebuilt = self
            .create_device_resources()
            .and_then(|()| self.create_window_size_dependent_resources(size));

        match rebuilt {
            Ok(()) => {
                for notify in self.notify.iter_mut() {
                    notify.on_device_restored();
                }
                log::info!("recovered from device loss");
                Ok(())
            }
            Err(err) => Err(self.fail(DeviceError::RecoveryFailed(Box::new(err)))),
        }
    }

    /// Releases everything and hands `err` back for propagation.
    fn fail(&mut self, err: DeviceError) -> DeviceError {
        log::error!("{}", error_chain(&err));
        self.cleanup_resources();
        err
    }

    /// Releases render target, viewport, swap chain, context and device, in
    /// that order.
    fn cleanup_resources(&mut self) {
        if let Some(SurfaceTargets { render_target, viewport: _ }) = self.targets.take() {
            drop(render_target);
        }

        if let Some(DeviceObjects {
            device,
            context,
            swap_chain,
            tier,
        }) = self.objects.take()
        {
            drop(swap_chain);
            drop(context);
            drop(device);
            log::debug!("released device resources ({tier} tier)");
        }
    }
}

impl<B: GraphicsBackend> Drop for DeviceResources<B> {
    fn drop(&mut self) {
        self.cleanup_resources();
    }
}

fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(out, ": {cause}");
        source = cause.source();
    }
    out
}
