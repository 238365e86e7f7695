use wgpu::{
    Buffer, BufferUsages, Device, IndexFormat, Queue, RenderPass,
    util::{BufferInitDescriptor, DeviceExt},
};

use crate::device::MeshVertex;

/// Vertex buffer of one mesh plus lazily built fan indices
pub struct GpuMesh {
    vertex_buffer: Buffer,
    capacity: usize,
    vertex_count: u32,
    fan_indices: Option<(Buffer, u32)>,
}

impl GpuMesh {
    pub fn new(device: &Device, vertices: &[MeshVertex]) -> Self {
        Self {
            vertex_buffer: create_vertex_buffer(device, vertices),
            capacity: vertices.len().max(1),
            vertex_count: vertices.len() as u32,
            fan_indices: None,
        }
    }

    /// Rewrites the vertices in place, reallocating only when they outgrow the buffer
    pub fn update(&mut self, device: &Device, queue: &Queue, vertices: &[MeshVertex]) {
        if vertices.len() > self.capacity {
            self.vertex_buffer = create_vertex_buffer(device, vertices);
            self.capacity = vertices.len();
        } else if !vertices.is_empty() {
            queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));
        }
        if self.vertex_count != vertices.len() as u32 {
            self.fan_indices = None;
        }
        self.vertex_count = vertices.len() as u32;
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Builds the triangle list indices `(0, i, i + 1)` for drawing as a fan
    pub fn ensure_fan_indices(&mut self, device: &Device) {
        if self.fan_indices.is_some() || self.vertex_count < 3 {
            return;
        }
        let indices = fan_indices(self.vertex_count);
        let buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Fan Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: BufferUsages::INDEX,
        });
        self.fan_indices = Some((buffer, indices.len() as u32));
    }

    /// Draws `count` vertices, or `count` fan indices when `indexed`
    pub fn draw(&self, pass: &mut RenderPass<'_>, indexed: bool, count: u32) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        if indexed {
            if let Some((indices, len)) = &self.fan_indices {
                pass.set_index_buffer(indices.slice(..), IndexFormat::Uint32);
                pass.draw_indexed(0..count.min(*len), 0, 0..1);
            }
        } else {
            pass.draw(0..count.min(self.vertex_count), 0..1);
        }
    }
}

fn create_vertex_buffer(device: &Device, vertices: &[MeshVertex]) -> Buffer {
    // empty meshes still get a buffer so ids stay valid
    let placeholder = [MeshVertex::default()];
    let contents = if vertices.is_empty() {
        &placeholder[..]
    } else {
        vertices
    };
    device.create_buffer_init(&BufferInitDescriptor {
        label: Some("Mesh Vertex Buffer"),
        contents: bytemuck::cast_slice(contents),
        usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
    })
}

/// Triangle list indices covering a fan of `vertex_count` vertices
pub fn fan_indices(vertex_count: u32) -> Vec<u32> {
    (1..vertex_count.saturating_sub(1))
        .flat_map(|i| [0, i, i + 1])
        .collect()
}
