/// Observer for device loss and restoration.
///
/// Renderers that own device-dependent objects (pipelines, buffers) register
/// one of these to drop and rebuild them around a recovery.
pub trait DeviceNotify {
    /// Called before the lost device and everything created from it is released.
    fn on_device_lost(&mut self);

    /// Called after the device and the size-dependent resources are rebuilt.
    fn on_device_restored(&mut self);
}
