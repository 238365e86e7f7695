use wgpu::{
    AddressMode, BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout,
    BindingResource, Device, Extent3d, FilterMode, Origin3d, Queue, RenderPass,
    SamplerDescriptor, TexelCopyBufferLayout, TexelCopyTextureInfo, TextureAspect,
    TextureDescriptor, TextureDimension, TextureFormat, TextureUsages,
};

/// A GPU texture that can be bound in shaders for rendering
///
/// Keeps only the bind group; `wgpu` holds the texture & sampler alive through it
pub struct GpuTexture {
    bind_group: BindGroup,
}

impl GpuTexture {
    /// Creates a new texture from raw RGBA image data,
    /// uploads the data, & builds the bind group using the layout
    ///
    /// - `data`: Must be in tightly packed 8-bit RGBA format
    /// - `width`, `height`: Dimensions of the image in pixels
    pub fn from_rgba(
        device: &Device,
        queue: &Queue,
        layout: &BindGroupLayout,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Self {
        let size = Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&TextureDescriptor {
            label: None,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: Origin3d::ZERO,
                aspect: TextureAspect::All,
            },
            data,
            TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&Default::default());
        // linear filtering keeps scaled glyph edges smooth
        let sampler = device.create_sampler(&SamplerDescriptor {
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            ..Default::default()
        });
        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: None,
            layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(&view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self { bind_group }
    }

    /// Creates a 1×1 white fallback texture
    ///
    /// Bound for [`TextureId::NONE`](crate::TextureId::NONE) & unknown ids
    pub fn create_default(device: &Device, queue: &Queue, layout: &BindGroupLayout) -> Self {
        Self::from_rgba(device, queue, layout, &[255u8, 255, 255, 255], 1, 1)
    }

    /// Binds this texture at the given index in the render pass
    pub fn bind(&self, pass: &mut RenderPass<'_>, index: u32) {
        pass.set_bind_group(index, &self.bind_group, &[]);
    }
}
