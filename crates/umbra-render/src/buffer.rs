//! Vertex and index buffer management for GPU rendering.

use bytemuck::{Pod, Zeroable};
use umbra_mesh::TriangleMesh;

/// A complete mesh buffer containing vertex and index data ready for GPU rendering.
pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshBuffer {
    /// Bind vertex and index buffers to a render pass.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    }

    /// Draw the entire mesh using indexed rendering.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// GPU buffer allocator for creating vertex and index buffers.
pub struct BufferAllocator<'a> {
    device: &'a wgpu::Device,
}

impl<'a> BufferAllocator<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }

    /// Upload a triangle mesh as position-only vertices and `u32` indices.
    pub fn create_mesh(&self, label: &str, mesh: &TriangleMesh) -> MeshBuffer {
        let vertices: Vec<VertexPosition> = mesh
            .positions
            .iter()
            .map(|&position| VertexPosition { position })
            .collect();
        MeshBuffer {
            vertex_buffer: self.create_buffer(
                &format!("{label}-vertices"),
                bytemuck::cast_slice(&vertices),
                wgpu::BufferUsages::VERTEX,
            ),
            index_buffer: self.create_buffer(
                &format!("{label}-indices"),
                bytemuck::cast_slice(&mesh.indices),
                wgpu::BufferUsages::INDEX,
            ),
            index_count: mesh.indices.len() as u32,
        }
    }

    fn create_buffer(&self, label: &str, data: &[u8], usage: wgpu::BufferUsages) -> wgpu::Buffer {
        use wgpu::util::DeviceExt;

        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data,
                usage: usage | wgpu::BufferUsages::COPY_DST,
            })
    }
}

/// Position-only vertex; color comes from the per-draw uniform.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct VertexPosition {
    pub position: [f32; 3],
}

impl VertexPosition {
    /// Get the vertex buffer layout for this vertex type.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<VertexPosition>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device;

    #[test]
    fn test_vertex_position_layout() {
        let layout = VertexPosition::layout();
        assert_eq!(layout.array_stride, 12);
        assert_eq!(layout.attributes.len(), 1);
        assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x3);
    }

    #[test]
    fn test_cuboid_upload_index_count() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let allocator = BufferAllocator::new(&device);
        let mesh = allocator.create_mesh("cube", &umbra_mesh::unit_cuboid());
        assert_eq!(mesh.index_count, 36);
        assert_eq!(mesh.vertex_buffer.size(), 24 * 12);
    }

    #[test]
    fn test_empty_mesh_creates_zero_index_count() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let allocator = BufferAllocator::new(&device);
        let mesh = allocator.create_mesh("empty", &TriangleMesh::new());
        assert_eq!(mesh.index_count, 0);
    }
}
