//! Flat-color rendering pipelines, one per distinct fixed-function state.

use std::collections::HashMap;
use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};

use crate::buffer::VertexPosition;
use crate::depth::DepthStencilBuffer;
use crate::state::PipelineState;

/// Per-draw uniform: model-view-projection and flat RGBA color.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DrawUniform {
    pub mvp: [[f32; 4]; 4],
    pub color: [f32; 4],
}

/// Distance between consecutive draw uniforms in the dynamic uniform buffer.
pub const DRAW_UNIFORM_STRIDE: wgpu::BufferAddress = 256;

/// The WGSL source code for the flat-color shader.
pub const FLAT_SHADER_SOURCE: &str = r#"
struct DrawUniform {
    mvp: mat4x4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> draw: DrawUniform;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return draw.mvp * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return draw.color;
}
"#;

/// Lazily builds a `wgpu::RenderPipeline` for each [`PipelineState`] it sees.
///
/// The stencil reference is set per pass, so states that differ only in
/// their reference share a pipeline.
pub struct FlatPipelineCache {
    shader: wgpu::ShaderModule,
    layout: wgpu::PipelineLayout,
    pub bind_group_layout: wgpu::BindGroupLayout,
    color_format: wgpu::TextureFormat,
    pipelines: HashMap<PipelineState, wgpu::RenderPipeline>,
}

impl FlatPipelineCache {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("flat-shader"),
            source: wgpu::ShaderSource::Wgsl(FLAT_SHADER_SOURCE.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw-uniform-bind-group-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<DrawUniform>() as u64),
                },
                count: None,
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("flat-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        Self {
            shader,
            layout,
            bind_group_layout,
            color_format,
            pipelines: HashMap::new(),
        }
    }

    /// Number of distinct pipelines built so far.
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    pub fn get_or_create(
        &mut self,
        device: &wgpu::Device,
        state: &PipelineState,
    ) -> &wgpu::RenderPipeline {
        let key = state.pipeline_key();
        let Self {
            shader,
            layout,
            color_format,
            pipelines,
            ..
        } = self;
        pipelines.entry(key).or_insert_with(|| {
            log::debug!("building pipeline for {key:?}");
            create_flat_pipeline(device, shader, layout, *color_format, &key)
        })
    }
}

fn create_flat_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    state: &PipelineState,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("flat-pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[VertexPosition::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: state.cull_mode(),
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(state.depth_stencil_state(DepthStencilBuffer::FORMAT)),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: state.blend_state(),
                write_mask: state.color_mask().to_wgpu(),
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}
