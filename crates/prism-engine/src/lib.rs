//! Prism engine crate.
//!
//! Owns the graphics device, swap chain and back-buffer lifecycle for a
//! single window, including transparent recovery from device loss.

pub mod coords;
pub mod device;
pub mod logging;
