//! On-screen backend: executes the command stream with wgpu.
//!
//! Every draw records its own render pass so that pending clears and the
//! draw's pipeline state apply in submission order. Per-draw uniforms live
//! in one dynamic uniform buffer and are uploaded when the frame is
//! submitted, before the command buffer that reads them.

use glam::Mat4;
use umbra_config::RenderConfig;
use umbra_mesh::TriangleMesh;

use crate::backend::{ClearTargets, MeshUploader, RenderBackend};
use crate::buffer::{BufferAllocator, MeshBuffer};
use crate::camera::Camera;
use crate::depth::DepthStencilBuffer;
use crate::gpu::{RenderContext, SurfaceError};
use crate::pass::{PendingClears, begin_render_pass, to_wgpu_color};
use crate::pipeline::{DRAW_UNIFORM_STRIDE, DrawUniform, FlatPipelineCache};
use crate::scene::{MeshHandle, SceneObject};
use crate::state::PipelineState;

pub struct WgpuRenderer {
    context: RenderContext,
    depth: DepthStencilBuffer,
    pipelines: FlatPipelineCache,
    meshes: Vec<MeshBuffer>,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    max_draws: u32,
    clear_color: wgpu::Color,
}

impl WgpuRenderer {
    pub fn new(context: RenderContext, config: &RenderConfig) -> Self {
        let device = &context.device;
        let depth = DepthStencilBuffer::new(
            device,
            context.surface_config.width,
            context.surface_config.height,
        );
        let pipelines = FlatPipelineCache::new(device, context.surface_format);

        let max_draws = config.max_draws_per_frame.max(1);
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draw-uniforms"),
            size: u64::from(max_draws) * DRAW_UNIFORM_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw-uniform-bind-group"),
            layout: &pipelines.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniform>() as u64),
                }),
            }],
        });

        Self {
            context,
            depth,
            pipelines,
            meshes: Vec::new(),
            uniform_buffer,
            uniform_bind_group,
            max_draws,
            clear_color: to_wgpu_color(config.clear_color),
        }
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Reconfigures the surface and the depth/stencil buffer in physical pixels.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
        self.depth.resize(
            &self.context.device,
            self.context.surface_config.width,
            self.context.surface_config.height,
        );
    }

    /// Acquires the next surface texture and starts recording a frame.
    pub fn begin_frame(&mut self) -> Result<WgpuFrame<'_>, SurfaceError> {
        let surface_texture = self.context.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        Ok(WgpuFrame {
            renderer: self,
            encoder: Some(encoder),
            surface_texture: Some(surface_texture),
            view,
            pending: PendingClears::default(),
            clear_stencil: 0,
            uniforms: Vec::new(),
            overflow_logged: false,
        })
    }
}

impl MeshUploader for WgpuRenderer {
    fn upload_mesh(&mut self, label: &str, mesh: &TriangleMesh) -> MeshHandle {
        let buffer = BufferAllocator::new(&self.context.device).create_mesh(label, mesh);
        log::debug!("uploaded mesh '{label}': {} indices", buffer.index_count);
        self.meshes.push(buffer);
        MeshHandle(self.meshes.len() as u32 - 1)
    }
}

/// One frame in flight. Submit with [`WgpuFrame::submit`]; dropping an
/// unsubmitted frame submits it with a warning.
pub struct WgpuFrame<'a> {
    renderer: &'a mut WgpuRenderer,
    encoder: Option<wgpu::CommandEncoder>,
    surface_texture: Option<wgpu::SurfaceTexture>,
    view: wgpu::TextureView,
    pending: PendingClears,
    clear_stencil: u8,
    uniforms: Vec<u8>,
    overflow_logged: bool,
}

impl WgpuFrame<'_> {
    fn draw_count(&self) -> u32 {
        (self.uniforms.len() as u64 / DRAW_UNIFORM_STRIDE) as u32
    }

    fn push_uniform(&mut self, uniform: DrawUniform) -> wgpu::DynamicOffset {
        let offset = self.uniforms.len();
        self.uniforms
            .resize(offset + DRAW_UNIFORM_STRIDE as usize, 0);
        self.uniforms[offset..offset + std::mem::size_of::<DrawUniform>()]
            .copy_from_slice(bytemuck::bytes_of(&uniform));
        offset as wgpu::DynamicOffset
    }

    /// Records a pass that only applies pending clears.
    fn flush_clears(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let Some(encoder) = self.encoder.as_mut() else {
            return;
        };
        let loads = self.pending.take_loads();
        let _pass = begin_render_pass(
            encoder,
            &self.view,
            &self.renderer.depth.view,
            loads,
            "clear-pass",
        );
    }

    fn finish(&mut self) {
        self.flush_clears();
        let (Some(encoder), Some(surface_texture)) =
            (self.encoder.take(), self.surface_texture.take())
        else {
            return;
        };
        let context = &self.renderer.context;
        if !self.uniforms.is_empty() {
            context
                .queue
                .write_buffer(&self.renderer.uniform_buffer, 0, &self.uniforms);
        }
        context.queue.submit([encoder.finish()]);
        surface_texture.present();
    }

    /// Submit the command buffer and present the surface texture.
    pub fn submit(mut self) {
        self.finish();
    }
}

impl RenderBackend for WgpuFrame<'_> {
    fn set_clear_stencil(&mut self, value: u8) {
        self.clear_stencil = value;
    }

    fn clear(&mut self, targets: ClearTargets) {
        self.pending
            .request(targets, self.renderer.clear_color, self.clear_stencil);
    }

    fn draw(&mut self, object: &SceneObject, camera: &Camera, state: &PipelineState) {
        if self.draw_count() >= self.renderer.max_draws {
            if !self.overflow_logged {
                log::warn!(
                    "more than {} draws in one frame, skipping the rest",
                    self.renderer.max_draws
                );
                self.overflow_logged = true;
            }
            return;
        }
        if self.renderer.meshes.get(object.mesh.0 as usize).is_none() {
            log::warn!("draw skipped: unknown mesh {:?}", object.mesh);
            return;
        }

        let mvp: Mat4 = camera.view_projection_matrix() * object.transform.matrix();
        let offset = self.push_uniform(DrawUniform {
            mvp: mvp.to_cols_array_2d(),
            color: object.color,
        });
        let loads = self.pending.take_loads();

        let Some(encoder) = self.encoder.as_mut() else {
            return;
        };
        let WgpuRenderer {
            context,
            depth,
            pipelines,
            meshes,
            uniform_bind_group,
            ..
        } = &mut *self.renderer;
        let pipeline = pipelines.get_or_create(&context.device, state);
        let mesh = &meshes[object.mesh.0 as usize];

        let mut pass = begin_render_pass(encoder, &self.view, &depth.view, loads, "draw-pass");
        pass.set_pipeline(pipeline);
        pass.set_stencil_reference(u32::from(state.stencil_func().reference));
        pass.set_bind_group(0, &*uniform_bind_group, &[offset]);
        mesh.bind(&mut pass);
        mesh.draw(&mut pass);
    }
}

impl Drop for WgpuFrame<'_> {
    fn drop(&mut self) {
        if self.encoder.is_some() {
            log::warn!("WgpuFrame dropped without explicit submit() - auto-submitting");
            self.finish();
        }
    }
}
