use std::fmt;

/// Level of GPU feature support a device can be created at.
///
/// Variants are declared from most to least capable; `Ord` follows that
/// order so `Core > Downlevel > WebGl2`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CapabilityTier {
    /// Full desktop-class limits.
    Core,
    /// Reduced limits accepted by most older desktop and mobile parts.
    Downlevel,
    /// Minimum limits matching a WebGL2-class device.
    WebGl2,
}

impl CapabilityTier {
    /// Tiers in descending order of capability.
    pub const ALL: [CapabilityTier; 3] = [
        CapabilityTier::Core,
        CapabilityTier::Downlevel,
        CapabilityTier::WebGl2,
    ];

    fn rank(self) -> u8 {
        match self {
            CapabilityTier::Core => 2,
            CapabilityTier::Downlevel => 1,
            CapabilityTier::WebGl2 => 0,
        }
    }

    /// Device limits requested for this tier.
    pub fn limits(self) -> wgpu::Limits {
        match self {
            CapabilityTier::Core => wgpu::Limits::default(),
            CapabilityTier::Downlevel => wgpu::Limits::downlevel_defaults(),
            CapabilityTier::WebGl2 => wgpu::Limits::downlevel_webgl2_defaults(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CapabilityTier::Core => "core",
            CapabilityTier::Downlevel => "downlevel",
            CapabilityTier::WebGl2 => "webgl2",
        }
    }
}

impl PartialOrd for CapabilityTier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CapabilityTier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for CapabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Default fallback ladder: every tier, most capable first.
pub fn default_ladder() -> Vec<CapabilityTier> {
    CapabilityTier::ALL.to_vec()
}
