//! Geometry value types shared between the device layer and renderers.
//!
//! All sizes are physical pixels with a top-left origin.

mod size;
mod viewport;

pub use size::OutputSize;
pub use viewport::Viewport;
