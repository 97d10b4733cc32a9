use winit::dpi::PhysicalSize;

/// Drawable size of the output surface in physical pixels.
///
/// This is the cached source of truth for sizing render targets and the
/// viewport. A zero-area size is valid (minimized window, or not yet bound).
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct OutputSize {
    pub width: u32,
    pub height: u32,
}

impl OutputSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Size usable for swap-chain buffers, which cannot be zero in either axis.
    #[inline]
    pub fn clamped_to_min(self) -> Self {
        Self {
            width: self.width.max(1),
            height: self.height.max(1),
        }
    }
}

impl From<PhysicalSize<u32>> for OutputSize {
    fn from(size: PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

impl From<OutputSize> for PhysicalSize<u32> {
    fn from(size: OutputSize) -> Self {
        PhysicalSize::new(size.width, size.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        assert!(OutputSize::default().is_empty());
        assert!(OutputSize::new(640, 0).is_empty());
        assert!(!OutputSize::new(1, 1).is_empty());
    }

    #[test]
    fn clamp_keeps_nonzero_axes() {
        assert_eq!(OutputSize::new(0, 0).clamped_to_min(), OutputSize::new(1, 1));
        assert_eq!(OutputSize::new(800, 0).clamped_to_min(), OutputSize::new(800, 1));
        assert_eq!(OutputSize::new(800, 600).clamped_to_min(), OutputSize::new(800, 600));
    }

    #[test]
    fn converts_from_physical_size() {
        let size: OutputSize = PhysicalSize::new(1024u32, 768u32).into();
        assert_eq!(size, OutputSize::new(1024, 768));
    }
}
