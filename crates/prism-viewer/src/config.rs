use winit::dpi::LogicalSize;

use prism_engine::device::{DeviceConfig, WgpuInit};

/// Viewer configuration.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub device: DeviceConfig,
    pub gpu: WgpuInit,
    /// Seconds for one full trip around the clear-color wheel.
    pub color_period: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "prism".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
            device: DeviceConfig::default(),
            gpu: WgpuInit::default(),
            color_period: 6.0,
        }
    }
}
