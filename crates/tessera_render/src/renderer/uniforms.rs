use bytemuck::{Pod, Zeroable};
use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindingResource, Buffer,
    BufferBinding, BufferDescriptor, BufferUsages, Device, Queue,
};

use crate::device::{UniformLocation, UniformValue};

/// Byte size of [`Uniforms`], also the binding size of the uniform group
pub const UNIFORMS_SIZE: u64 = std::mem::size_of::<Uniforms>() as u64;

/// CPU copy of a program's uniform block, laid out like `Uniforms` in the prelude
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub projection: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            projection: glam::Mat4::IDENTITY.to_cols_array_2d(),
            model: glam::Mat4::IDENTITY.to_cols_array_2d(),
            color: [1.0; 4],
        }
    }
}

impl Uniforms {
    pub fn set(&mut self, location: UniformLocation, value: UniformValue) {
        match (location.0, value) {
            (0, UniformValue::Mat4(m)) => self.projection = m.to_cols_array_2d(),
            (1, UniformValue::Mat4(m)) => self.model = m.to_cols_array_2d(),
            (2, UniformValue::Vec4(v)) => self.color = v.to_array(),
            (slot, value) => log::warn!("uniform slot {slot} can't hold {value:?}"),
        }
    }
}

/// One snapshot of [`Uniforms`] per draw, bound at dynamic offsets
///
/// Snapshots are staged on the CPU during the frame & uploaded in one write;
/// the GPU buffer only ever grows.
pub struct UniformArena {
    staging: Vec<u8>,
    stride: u64,
    buffer: Option<(Buffer, BindGroup, u64)>,
}

impl UniformArena {
    /// `alignment` is the device's `min_uniform_buffer_offset_alignment`
    pub fn new(alignment: u32) -> Self {
        Self {
            staging: Vec::new(),
            stride: UNIFORMS_SIZE.next_multiple_of(alignment as u64),
            buffer: None,
        }
    }

    /// Stages a snapshot and returns its dynamic offset
    pub fn push(&mut self, uniforms: &Uniforms) -> u32 {
        let offset = self.staging.len();
        self.staging.extend_from_slice(bytemuck::bytes_of(uniforms));
        self.staging.resize(offset + self.stride as usize, 0);
        offset as u32
    }

    /// Writes everything staged this frame, growing the GPU buffer if needed
    pub fn upload(&mut self, device: &Device, queue: &Queue, layout: &BindGroupLayout) {
        if self.staging.is_empty() {
            return;
        }
        let needed = self.staging.len() as u64;
        let capacity = self.buffer.as_ref().map_or(0, |(_, _, c)| *c);
        if needed > capacity {
            let capacity = needed.next_power_of_two().max(self.stride * 64);
            self.buffer = Some(self.create(device, layout, capacity));
        }
        if let Some((buffer, _, _)) = &self.buffer {
            queue.write_buffer(buffer, 0, &self.staging);
        }
    }

    pub fn bind_group(&self) -> Option<&BindGroup> {
        self.buffer.as_ref().map(|(_, group, _)| group)
    }

    pub fn clear(&mut self) {
        self.staging.clear();
    }

    fn create(
        &self,
        device: &Device,
        layout: &BindGroupLayout,
        capacity: u64,
    ) -> (Buffer, BindGroup, u64) {
        let buffer = device.create_buffer(&BufferDescriptor {
            label: Some("Uniform Arena"),
            size: capacity,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("Uniform Arena Bind Group"),
            layout,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: BindingResource::Buffer(BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: std::num::NonZeroU64::new(UNIFORMS_SIZE),
                }),
            }],
        });
        (buffer, bind_group, capacity)
    }
}
