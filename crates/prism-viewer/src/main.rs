//! Prism viewer.
//!
//! Opens one window, drives `DeviceResources` from the winit event loop and
//! clears the back buffer each frame. Press `L` to simulate a device loss.

mod app;
mod config;
mod renderer;

use anyhow::{Context, Result};
use winit::event_loop::EventLoop;

use prism_engine::logging::{init_logging, LoggingConfig};

use crate::app::ViewerApp;
use crate::config::ViewerConfig;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    let mut app = ViewerApp::new(ViewerConfig::default());

    event_loop
        .run_app(&mut app)
        .context("winit event loop terminated with error")?;

    app.into_result()
}
