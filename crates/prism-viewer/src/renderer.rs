use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use prism_engine::device::{DeviceNotify, FrameTargets, WgpuBackend};

/// Clears the back buffer to a color cycling around the hue wheel.
pub struct ClearRenderer {
    started: Instant,
    period: f32,
}

impl ClearRenderer {
    pub fn new(period: f32) -> Self {
        Self {
            started: Instant::now(),
            period: period.max(0.1),
        }
    }

    /// Records and submits one clear pass into the frame's render target.
    pub fn draw(&self, frame: &FrameTargets<'_, WgpuBackend>) {
        let hue = (self.started.elapsed().as_secs_f32() / self.period).fract();
        let clear = hue_to_color(hue);

        let mut encoder = frame
            .device
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("prism frame encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("prism clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: frame.render_target.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            frame.viewport.apply(&mut pass);
        }

        frame.context.submit(std::iter::once(encoder.finish()));
    }
}

/// Counts device losses and restorations for the window title.
pub struct RecoveryCounter {
    pub lost: Rc<Cell<u32>>,
    pub restored: Rc<Cell<u32>>,
}

impl DeviceNotify for RecoveryCounter {
    fn on_device_lost(&mut self) {
        self.lost.set(self.lost.get() + 1);
    }

    fn on_device_restored(&mut self) {
        self.restored.set(self.restored.get() + 1);
        log::info!("device restored ({} recoveries so far)", self.restored.get());
    }
}

/// Fully saturated, mid-brightness color for `hue` in `[0, 1)`.
fn hue_to_color(hue: f32) -> wgpu::Color {
    let h = hue.rem_euclid(1.0) * 6.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    let scale = 0.6;
    wgpu::Color {
        r: (r * scale) as f64,
        g: (g * scale) as f64,
        b: (b * scale) as f64,
        a: 1.0,
    }
}
