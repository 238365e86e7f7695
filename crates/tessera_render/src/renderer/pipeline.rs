use std::num::NonZeroU64;

use wgpu::{
    BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType, BlendState,
    BufferBindingType, ColorTargetState, ColorWrites, CompareFunction, DepthStencilState, Device,
    FragmentState, PipelineLayout, PipelineLayoutDescriptor, PrimitiveState, PrimitiveTopology,
    RenderPipeline, RenderPipelineDescriptor, SamplerBindingType, ShaderModule, ShaderStages,
    TextureFormat, TextureSampleType, TextureViewDimension, VertexAttribute, VertexBufferLayout,
    VertexFormat, VertexState, VertexStepMode,
};

use super::uniforms::UNIFORMS_SIZE;
use crate::device::MeshVertex;

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Bind group & pipeline layouts shared by every program
///
/// - group 0: texture (binding 0) & sampler (binding 1), fragment stage
/// - group 1: per-draw uniforms at a dynamic offset, both stages
pub struct Layouts {
    pub texture: BindGroupLayout,
    pub uniforms: BindGroupLayout,
    pub pipeline: PipelineLayout,
}

impl Layouts {
    pub fn new(device: &Device) -> Self {
        let texture = create_texture_bind_group_layout(device);
        let uniforms = create_uniform_bind_group_layout(device);
        let pipeline = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Program Pipeline Layout"),
            bind_group_layouts: &[&texture, &uniforms],
            push_constant_ranges: &[],
        });

        Self {
            texture,
            uniforms,
            pipeline,
        }
    }
}

/// The two pipelines a program needs: filled triangles & line strips
pub struct ProgramPipelines {
    pub triangles: RenderPipeline,
    pub lines: RenderPipeline,
}

impl ProgramPipelines {
    pub fn new(
        device: &Device,
        label: &str,
        module: &ShaderModule,
        layouts: &Layouts,
        surface_format: TextureFormat,
    ) -> Self {
        let create = |topology| {
            create_program_pipeline(device, label, module, layouts, surface_format, topology)
        };
        Self {
            triangles: create(PrimitiveTopology::TriangleList),
            lines: create(PrimitiveTopology::LineStrip),
        }
    }

    pub fn get(&self, topology: PrimitiveTopology) -> &RenderPipeline {
        match topology {
            PrimitiveTopology::LineStrip => &self.lines,
            _ => &self.triangles,
        }
    }
}

/// Matches `VertexInput` in the shader prelude:
/// - location 0: `vec2<f32>` (position)
/// - location 1: `vec2<f32>` (uv)
fn mesh_vertex_layout() -> VertexBufferLayout<'static> {
    VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshVertex>() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &[
            VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: VertexFormat::Float32x2,
            },
            VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: VertexFormat::Float32x2,
            },
        ],
    }
}

fn create_texture_bind_group_layout(device: &Device) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("Texture Bind Group Layout"),
        entries: &[
            BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: true },
                    view_dimension: TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 1,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Sampler(SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

fn create_uniform_bind_group_layout(device: &Device) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("Uniform Bind Group Layout"),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStages::VERTEX_FRAGMENT,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: NonZeroU64::new(UNIFORMS_SIZE),
            },
            count: None,
        }],
    })
}

/// Alpha blended, depth tested (`LessEqual`) so lower z draws on top
fn create_program_pipeline(
    device: &Device,
    label: &str,
    module: &ShaderModule,
    layouts: &Layouts,
    surface_format: TextureFormat,
    topology: PrimitiveTopology,
) -> RenderPipeline {
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layouts.pipeline),
        vertex: VertexState {
            module,
            entry_point: Some("vs_main"),
            buffers: &[mesh_vertex_layout()],
            compilation_options: Default::default(),
        },
        primitive: PrimitiveState {
            topology,
            ..Default::default()
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: CompareFunction::LessEqual,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        fragment: Some(FragmentState {
            module,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: surface_format,
                blend: Some(BlendState::ALPHA_BLENDING),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        multiview: None,
        cache: None,
    })
}
