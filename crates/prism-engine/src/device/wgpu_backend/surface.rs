use anyhow::{anyhow, bail};

use crate::coords::OutputSize;
use crate::device::{BackendError, PresentError};

/// Picks the swap-chain format: an sRGB 8-bit format when asked for and
/// offered, otherwise whatever the surface lists first.
///
/// `None` means the adapter cannot present to the window at all.
pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    const SRGB: [wgpu::TextureFormat; 2] = [
        wgpu::TextureFormat::Bgra8UnormSrgb,
        wgpu::TextureFormat::Rgba8UnormSrgb,
    ];

    let srgb = prefer_srgb
        .then(|| SRGB.into_iter().find(|f| caps.formats.contains(f)))
        .flatten();
    srgb.or_else(|| caps.formats.first().copied())
}

/// Requested alpha mode if the surface supports it, else the surface's own
/// first choice.
pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    match requested {
        Some(mode) if caps.alpha_modes.contains(&mode) => mode,
        _ => caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto),
    }
}

/// Falls back to `Fifo`, the one mode every surface must support.
pub(crate) fn choose_present_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: wgpu::PresentMode,
) -> wgpu::PresentMode {
    if caps.present_modes.contains(&requested) {
        requested
    } else {
        wgpu::PresentMode::Fifo
    }
}

/// Rejects back-buffer sizes the device cannot allocate.
pub(crate) fn check_extent(size: OutputSize, limits: &wgpu::Limits) -> Result<(), BackendError> {
    let max = limits.max_texture_dimension_2d;
    if size.width > max || size.height > max {
        bail!(
            "back buffer {}x{} exceeds the device limit of {max}",
            size.width,
            size.height
        );
    }
    Ok(())
}

/// Configures `surface`, returning validation failures instead of handing
/// them to the device's uncaptured-error handler (which panics by default).
pub(crate) fn configure(
    surface: &wgpu::Surface<'_>,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> Result<(), BackendError> {
    check_extent(OutputSize::new(config.width, config.height), &device.limits())?;

    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    surface.configure(device, config);
    match pollster::block_on(scope.pop()) {
        Some(err) => Err(anyhow!("surface configuration rejected: {err}")),
        None => Ok(()),
    }
}

/// What to do about a failed back-buffer acquisition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum AcquireAction {
    /// Surface no longer matches the window; reconfigure and retry once.
    Reconfigure,
    /// Transient; retry once as is.
    Retry,
    /// The surface or device is gone; recreate everything.
    DeviceLost,
    /// Unrecoverable.
    Fatal,
}

pub(crate) fn classify_surface_error(err: &wgpu::SurfaceError) -> AcquireAction {
    match err {
        wgpu::SurfaceError::Lost => AcquireAction::DeviceLost,
        wgpu::SurfaceError::Outdated => AcquireAction::Reconfigure,
        wgpu::SurfaceError::Timeout => AcquireAction::Retry,
        wgpu::SurfaceError::OutOfMemory => AcquireAction::Fatal,
        wgpu::SurfaceError::Other => AcquireAction::Fatal,
    }
}

/// Acquires the next back buffer, retrying once on outdated/timeout.
pub(crate) fn acquire(
    surface: &wgpu::Surface<'_>,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> Result<wgpu::SurfaceTexture, PresentError> {
    let first = match surface.get_current_texture() {
        Ok(texture) => return Ok(texture),
        Err(err) => err,
    };

    match classify_surface_error(&first) {
        AcquireAction::Reconfigure => {
            log::debug!("surface outdated; reconfiguring before retry");
            configure(surface, device, config).map_err(PresentError::Failure)?;
        }
        AcquireAction::Retry => log::debug!("back-buffer acquisition timed out; retrying"),
        AcquireAction::DeviceLost => return Err(lost(first)),
        AcquireAction::Fatal => return Err(fatal(first)),
    }

    surface.get_current_texture().map_err(|err| {
        if classify_surface_error(&err) == AcquireAction::DeviceLost {
            lost(err)
        } else {
            fatal(err)
        }
    })
}

fn lost(err: wgpu::SurfaceError) -> PresentError {
    PresentError::DeviceLost {
        reason: format!("surface {err}"),
    }
}

fn fatal(err: wgpu::SurfaceError) -> PresentError {
    PresentError::Failure(anyhow::Error::new(err).context("failed to acquire back buffer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(formats: Vec<wgpu::TextureFormat>) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats,
            present_modes: vec![wgpu::PresentMode::Fifo],
            alpha_modes: vec![wgpu::CompositeAlphaMode::Opaque],
            ..Default::default()
        }
    }

    #[test]
    fn prefers_srgb_formats() {
        let c = caps(vec![
            wgpu::TextureFormat::Bgra8Unorm,
            wgpu::TextureFormat::Bgra8UnormSrgb,
        ]);
        assert_eq!(
            choose_surface_format(&c, true),
            Some(wgpu::TextureFormat::Bgra8UnormSrgb)
        );
        assert_eq!(
            choose_surface_format(&c, false),
            Some(wgpu::TextureFormat::Bgra8Unorm)
        );
        assert_eq!(choose_surface_format(&caps(vec![]), true), None);
    }

    #[test]
    fn unsupported_modes_fall_back() {
        let c = caps(vec![wgpu::TextureFormat::Bgra8Unorm]);
        assert_eq!(
            choose_present_mode(&c, wgpu::PresentMode::Mailbox),
            wgpu::PresentMode::Fifo
        );
        assert_eq!(
            choose_alpha_mode(&c, Some(wgpu::CompositeAlphaMode::PreMultiplied)),
            wgpu::CompositeAlphaMode::Opaque
        );
    }

    #[test]
    fn oversized_back_buffers_are_rejected() {
        let limits = wgpu::Limits::downlevel_defaults();
        let max = limits.max_texture_dimension_2d;

        assert!(check_extent(OutputSize::new(max, max), &limits).is_ok());
        assert!(check_extent(OutputSize::new(1, 1), &limits).is_ok());

        let err = check_extent(OutputSize::new(max + 1, 600), &limits).expect_err("too wide");
        assert!(err.to_string().contains("exceeds the device limit"));
        assert!(check_extent(OutputSize::new(800, max + 1), &limits).is_err());
    }

    #[test]
    fn only_lost_surfaces_count_as_device_loss() {
        assert_eq!(
            classify_surface_error(&wgpu::SurfaceError::Lost),
            AcquireAction::DeviceLost
        );
        assert_eq!(
            classify_surface_error(&wgpu::SurfaceError::Outdated),
            AcquireAction::Reconfigure
        );
        assert_eq!(
            classify_surface_error(&wgpu::SurfaceError::Timeout),
            AcquireAction::Retry
        );
        assert_eq!(
            classify_surface_error(&wgpu::SurfaceError::OutOfMemory),
            AcquireAction::Fatal
        );
    }
}
