//! Render pass setup for the frame's color and depth/stencil attachments.
//!
//! Clears are deferred: [`PendingClears`] accumulates clear requests and
//! hands them to the next pass as `LoadOp::Clear`. Aspects with no pending
//! clear are loaded, so consecutive passes see each other's results.

use crate::backend::ClearTargets;
use crate::depth::DepthStencilBuffer;

/// Clear requests not yet applied to an attachment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PendingClears {
    targets: ClearTargets,
    color: wgpu::Color,
    stencil: u32,
}

impl PendingClears {
    /// Records a clear with the values current at call time.
    pub fn request(&mut self, targets: ClearTargets, color: wgpu::Color, stencil: u8) {
        if targets.color {
            self.color = color;
        }
        if targets.stencil {
            self.stencil = u32::from(stencil);
        }
        self.targets = self.targets.merge(targets);
    }

    pub fn is_empty(&self) -> bool {
        !self.targets.any()
    }

    /// Load operations for the next pass; consumes the pending clears.
    pub fn take_loads(&mut self) -> PassLoads {
        let targets = std::mem::take(&mut self.targets);
        PassLoads {
            color: if targets.color {
                wgpu::LoadOp::Clear(self.color)
            } else {
                wgpu::LoadOp::Load
            },
            depth: if targets.depth {
                wgpu::LoadOp::Clear(DepthStencilBuffer::CLEAR_DEPTH)
            } else {
                wgpu::LoadOp::Load
            },
            stencil: if targets.stencil {
                wgpu::LoadOp::Clear(self.stencil)
            } else {
                wgpu::LoadOp::Load
            },
        }
    }
}

/// Load operations for the three attachment aspects of one pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PassLoads {
    pub color: wgpu::LoadOp<wgpu::Color>,
    pub depth: wgpu::LoadOp<f32>,
    pub stencil: wgpu::LoadOp<u32>,
}

/// Begin a pass over the surface color view and the depth/stencil buffer.
pub fn begin_render_pass<'encoder>(
    encoder: &'encoder mut wgpu::CommandEncoder,
    color_view: &wgpu::TextureView,
    depth_view: &wgpu::TextureView,
    loads: PassLoads,
    label: &str,
) -> wgpu::RenderPass<'encoder> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: loads.color,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth_view,
            depth_ops: Some(wgpu::Operations {
                load: loads.depth,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: Some(wgpu::Operations {
                load: loads.stencil,
                store: wgpu::StoreOp::Store,
            }),
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}

/// Linear RGBA array to a `wgpu::Color`.
pub fn to_wgpu_color(color: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: f64::from(color[0]),
        g: f64::from(color[1]),
        b: f64::from(color[2]),
        a: f64::from(color[3]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_pending_clears_loads_everything() {
        let mut pending = PendingClears::default();
        assert!(pending.is_empty());
        let loads = pending.take_loads();
        assert_eq!(loads.color, wgpu::LoadOp::Load);
        assert_eq!(loads.depth, wgpu::LoadOp::Load);
        assert_eq!(loads.stencil, wgpu::LoadOp::Load);
    }

    #[test]
    fn test_full_clear_then_load() {
        let mut pending = PendingClears::default();
        pending.request(ClearTargets::ALL, wgpu::Color::BLACK, 0);
        let loads = pending.take_loads();
        assert_eq!(loads.color, wgpu::LoadOp::Clear(wgpu::Color::BLACK));
        assert_eq!(loads.depth, wgpu::LoadOp::Clear(1.0));
        assert_eq!(loads.stencil, wgpu::LoadOp::Clear(0));

        assert!(pending.is_empty());
        assert_eq!(pending.take_loads().depth, wgpu::LoadOp::Load);
    }

    #[test]
    fn test_stencil_only_clear_keeps_color_and_depth() {
        let mut pending = PendingClears::default();
        pending.request(ClearTargets::STENCIL, wgpu::Color::RED, 7);
        let loads = pending.take_loads();
        assert_eq!(loads.color, wgpu::LoadOp::Load);
        assert_eq!(loads.depth, wgpu::LoadOp::Load);
        assert_eq!(loads.stencil, wgpu::LoadOp::Clear(7));
    }

    #[test]
    fn test_later_stencil_value_wins() {
        let mut pending = PendingClears::default();
        pending.request(ClearTargets::ALL, wgpu::Color::BLACK, 0);
        pending.request(ClearTargets::STENCIL, wgpu::Color::BLACK, 3);
        let loads = pending.take_loads();
        assert_eq!(loads.stencil, wgpu::LoadOp::Clear(3));
        assert_eq!(loads.color, wgpu::LoadOp::Clear(wgpu::Color::BLACK));
    }

    #[test]
    fn test_to_wgpu_color() {
        let color = to_wgpu_color([0.8, 0.8, 0.8, 1.0]);
        assert!((color.r - 0.8).abs() < 1e-6);
        assert_eq!(color.a, 1.0);
    }
}
