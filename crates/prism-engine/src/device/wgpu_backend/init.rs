/// Initialization parameters for the wgpu backend.
///
/// Capability tiers are configured on `DeviceConfig`; these are the knobs
/// that only make sense for wgpu surfaces.
#[derive(Debug, Clone)]
pub struct WgpuInit {
    /// Backends the instance may use.
    pub backends: wgpu::Backends,

    /// Adapter selection preference.
    pub power_preference: wgpu::PowerPreference,

    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Requested present mode. Falls back to FIFO when unsupported.
    ///
    /// FIFO blocks `present` on vertical sync and is always available.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features, on every tier.
    pub required_features: wgpu::Features,

    /// Number of back buffers the presentation engine may queue.
    ///
    /// This value is a hint; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for WgpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            desired_maximum_frame_latency: 2,
        }
    }
}
