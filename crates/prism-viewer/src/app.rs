use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use prism_engine::device::{DeviceResources, PresentOutcome, WgpuBackend};

use crate::config::ViewerConfig;
use crate::renderer::{ClearRenderer, RecoveryCounter};

/// Window layer and frame loop around one `DeviceResources`.
pub struct ViewerApp {
    config: ViewerConfig,
    renderer: ClearRenderer,

    // Dropped before the window.
    resources: Option<DeviceResources<WgpuBackend>>,
    window: Option<Arc<Window>>,

    lost: Rc<Cell<u32>>,
    restored: Rc<Cell<u32>>,
    error: Option<anyhow::Error>,
}

impl ViewerApp {
    pub fn new(config: ViewerConfig) -> Self {
        let renderer = ClearRenderer::new(config.color_period);
        Self {
            config,
            renderer,
            resources: None,
            window: None,
            lost: Rc::new(Cell::new(0)),
            restored: Rc::new(Cell::new(0)),
            error: None,
        }
    }

    /// Error that stopped the event loop, if any.
    pub fn into_result(self) -> Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let backend = WgpuBackend::new(self.config.gpu.clone());
        let mut resources = DeviceResources::new(backend, self.config.device.clone());
        resources.register_device_notify(Box::new(RecoveryCounter {
            lost: Rc::clone(&self.lost),
            restored: Rc::clone(&self.restored),
        }));

        resources
            .set_window(Arc::clone(&window))
            .context("failed to initialize device resources")?;

        let size = resources.output_size();
        log::info!(
            "window bound at {}x{} ({} tier)",
            size.width,
            size.height,
            resources
                .selected_tier()
                .map_or("unknown", |tier| tier.name())
        );

        window.request_redraw();
        self.resources = Some(resources);
        self.window = Some(window);
        Ok(())
    }

    fn resized(&mut self) -> Result<()> {
        let (Some(window), Some(resources)) = (self.window.as_ref(), self.resources.as_mut()) else {
            return Ok(());
        };

        if resources.window_size_changed()? {
            window.request_redraw();
        }
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let (Some(window), Some(resources)) = (self.window.as_ref(), self.resources.as_mut()) else {
            return Ok(());
        };

        // Drawing on a lost device only produces validation noise; present
        // reports the loss and rebuilds.
        if let Some(frame) = resources.frame() {
            if !frame.device.is_lost() {
                self.renderer.draw(&frame);
            }
        }

        window.pre_present_notify();

        if resources.present()? == PresentOutcome::Recovered {
            window.set_title(&format!(
                "{} ({} device recoveries)",
                self.config.title,
                self.restored.get()
            ));
        }
        Ok(())
    }

    fn simulate_device_loss(&self) {
        if let Some(device) = self.resources.as_ref().and_then(|r| r.device()) {
            log::warn!("simulating device loss (losses so far: {})", self.lost.get());
            device.simulate_loss();
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.create_window(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw.
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.resources = None;
                event_loop.exit();
            }

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let Err(err) = self.resized() {
                    self.fail(event_loop, err);
                }
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::KeyL),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.simulate_device_loss(),

            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw() {
                    self.fail(event_loop, err);
                }
            }

            _ => {}
        }
    }
}
