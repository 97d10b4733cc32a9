//! wgpu binding for `DeviceResources`.
//!
//! Mapping onto wgpu objects:
//! - device: adapter + logical device, with a device-lost flag
//! - context: the device's queue
//! - swap chain: a surface and its active configuration
//! - render target: the acquired surface texture and a view over it
//!
//! Adapter/device acquisition is asynchronous under wgpu; it is driven to
//! completion with `pollster` so the lifecycle stays synchronous.

mod init;
mod surface;

use std::sync::{Arc, Mutex};

use anyhow::Context;
use winit::window::{Window, WindowId};

use crate::coords::OutputSize;

use super::{BackendError, CapabilityTier, GraphicsBackend, PresentError, PresentationWindow};

pub use init::WgpuInit;

impl PresentationWindow for Arc<Window> {
    type Id = WindowId;

    fn id(&self) -> WindowId {
        Window::id(self)
    }

    fn client_size(&self) -> OutputSize {
        self.inner_size().into()
    }
}

/// Owns the wgpu instance; everything else is created per device generation.
pub struct WgpuBackend {
    instance: wgpu::Instance,
    init: WgpuInit,
}

impl WgpuBackend {
    pub fn new(init: WgpuInit) -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });

        Self { instance, init }
    }

    pub fn init(&self) -> &WgpuInit {
        &self.init
    }
}

impl Default for WgpuBackend {
    fn default() -> Self {
        Self::new(WgpuInit::default())
    }
}

/// Logical device plus the adapter it was created from.
pub struct WgpuDevice {
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    lost: Arc<Mutex<Option<String>>>,
}

impl WgpuDevice {
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    /// Reason reported by the device-lost callback, if it fired.
    pub fn lost_reason(&self) -> Option<String> {
        self.lost.lock().ok().and_then(|slot| slot.clone())
    }

    pub fn is_lost(&self) -> bool {
        self.lost_reason().is_some()
    }

    /// Marks the device lost and destroys it, as a driver reset would.
    ///
    /// The next `present` reports device loss and triggers recovery.
    pub fn simulate_loss(&self) {
        if let Ok(mut slot) = self.lost.lock() {
            slot.get_or_insert_with(|| "simulated device removal".to_string());
        }
        self.device.destroy();
    }
}

/// Surface bound to a window plus its active configuration.
pub struct WgpuSwapChain {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    presented: u64,
}

impl WgpuSwapChain {
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn config(&self) -> &wgpu::SurfaceConfiguration {
        &self.config
    }

    /// Number of frames presented through this swap chain.
    pub fn presented(&self) -> u64 {
        self.presented
    }
}

/// View over the acquired back buffer.
///
/// Holding the surface texture prevents acquisition of subsequent frames;
/// it is handed back to the surface by `present`.
pub struct WgpuRenderTarget {
    frame: Option<wgpu::SurfaceTexture>,
    view: wgpu::TextureView,
}

impl WgpuRenderTarget {
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn texture(&self) -> Option<&wgpu::Texture> {
        self.frame.as_ref().map(|f| &f.texture)
    }

    fn from_frame(frame: wgpu::SurfaceTexture) -> Self {
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            frame: Some(frame),
            view,
        }
    }
}

impl GraphicsBackend for WgpuBackend {
    type Window = Arc<Window>;
    type Device = WgpuDevice;
    type Context = wgpu::Queue;
    type SwapChain = WgpuSwapChain;
    type RenderTarget = WgpuRenderTarget;

    fn create_device(
        &mut self,
        tier: CapabilityTier,
    ) -> Result<(WgpuDevice, wgpu::Queue), BackendError> {
        let adapter = pollster::block_on(self.instance.request_adapter(
            &wgpu::RequestAdapterOptions {
                power_preference: self.init.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            },
        ))
        .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("prism device"),
            required_features: self.init.required_features,
            required_limits: tier.limits(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .with_context(|| format!("adapter rejected the {tier} tier"))?;

        let lost = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&lost);
        device.set_device_lost_callback(move |reason, message| {
            if let Ok(mut slot) = slot.lock() {
                slot.get_or_insert_with(|| format!("{reason:?}: {message}"));
            }
        });

        let info = adapter.get_info();
        log::debug!("wgpu device on {} ({:?}) at {tier} tier", info.name, info.backend);

        Ok((
            WgpuDevice {
                adapter,
                device,
                lost,
            },
            queue,
        ))
    }

    fn create_swap_chain(
        &mut self,
        device: &WgpuDevice,
        window: &Arc<Window>,
        size: OutputSize,
    ) -> Result<WgpuSwapChain, BackendError> {
        let surface = self
            .instance
            .create_surface(Arc::clone(window))
            .context("failed to create wgpu surface")?;

        let caps = surface.get_capabilities(&device.adapter);
        let format = surface::choose_surface_format(&caps, self.init.prefer_srgb)
            .context("adapter cannot present to this window")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: surface::choose_present_mode(&caps, self.init.present_mode),
            alpha_mode: surface::choose_alpha_mode(&caps, self.init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: self.init.desired_maximum_frame_latency,
        };

        surface::configure(&surface, &device.device, &config)
            .context("failed to configure swap chain")?;

        Ok(WgpuSwapChain {
            surface,
            config,
            presented: 0,
        })
    }

    fn resize_swap_chain(
        &mut self,
        device: &WgpuDevice,
        swap_chain: &mut WgpuSwapChain,
        size: OutputSize,
    ) -> Result<(), BackendError> {
        let mut config = swap_chain.config.clone();
        config.width = size.width;
        config.height = size.height;
        surface::configure(&swap_chain.surface, &device.device, &config)
            .context("failed to resize swap chain buffers")?;
        swap_chain.config = config;
        Ok(())
    }

    fn create_render_target(
        &mut self,
        device: &WgpuDevice,
        swap_chain: &mut WgpuSwapChain,
    ) -> Result<WgpuRenderTarget, BackendError> {
        let frame = surface::acquire(&swap_chain.surface, &device.device, &swap_chain.config)
            .map_err(|err| anyhow::Error::new(err).context("failed to acquire initial back buffer"))?;
        Ok(WgpuRenderTarget::from_frame(frame))
    }

    fn present(
        &mut self,
        device: &WgpuDevice,
        swap_chain: &mut WgpuSwapChain,
        target: &mut WgpuRenderTarget,
    ) -> Result<(), PresentError> {
        if let Some(reason) = device.lost_reason() {
            return Err(PresentError::DeviceLost { reason });
        }

        if let Some(frame) = target.frame.take() {
            frame.present();
            swap_chain.presented += 1;
        }

        if let Some(reason) = device.lost_reason() {
            return Err(PresentError::DeviceLost { reason });
        }

        let frame = surface::acquire(&swap_chain.surface, &device.device, &swap_chain.config)?;
        *target = WgpuRenderTarget::from_frame(frame);
        Ok(())
    }
}
