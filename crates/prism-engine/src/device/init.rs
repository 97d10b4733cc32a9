use super::{default_ladder, CapabilityTier};

/// Lifecycle parameters for `DeviceResources`.
///
/// Backend-specific knobs (surface format, present mode, ...) live on the
/// backend's own init type.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Capability tiers tried in order until device creation succeeds.
    ///
    /// Order the list from most to least capable.
    pub tiers: Vec<CapabilityTier>,

    /// Skip rebuilding size-dependent resources on a resize notification
    /// whose client area equals the cached output size.
    ///
    /// `set_window` always rebuilds regardless of this flag.
    pub skip_unchanged_resize: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            tiers: default_ladder(),
            skip_unchanged_resize: true,
        }
    }
}
