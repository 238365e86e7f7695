//! `wgpu` implementation of [`GraphicsDevice`]
//!
//! Draw verbs are recorded during the frame together with a snapshot of the
//! bound program, texture & uniforms, then replayed in one render pass by
//! [`Renderer::render_frame`].

mod gpu_texture;
mod mesh;
mod pipeline;
mod uniforms;

use std::collections::HashMap;

pub use wgpu::{Device, Queue, TextureFormat};

use wgpu::{
    CommandEncoderDescriptor, DeviceDescriptor, Extent3d, LoadOp, Operations, PresentMode,
    PrimitiveTopology, RenderPassColorAttachment, RenderPassDepthStencilAttachment,
    RenderPassDescriptor, RequestAdapterOptions, StoreOp, Surface, SurfaceConfiguration,
    SurfaceError, SurfaceTarget, TextureDescriptor, TextureDimension, TextureUsages, TextureView,
    WindowHandle, util::new_instance_with_webgpu_detection,
};

use crate::{
    color::Color,
    device::{
        DrawMode, GraphicsDevice, MeshId, MeshVertex, ProgramId, ShaderSource, TextureId,
        UniformLocation, UniformValue, builtin_uniform,
    },
    error::{CompileError, RenderError},
    shader::PRELUDE,
    texture::rgba_len,
};
use gpu_texture::GpuTexture;
use mesh::GpuMesh;
use pipeline::{DEPTH_FORMAT, Layouts, ProgramPipelines};
use uniforms::{UniformArena, Uniforms};

struct RenderTarget {
    surface: Surface<'static>,
    config: SurfaceConfiguration,
    depth: TextureView,
}

struct Gpu {
    device: Device,
    queue: Queue,
}

struct Program {
    pipelines: ProgramPipelines,
    uniforms: Uniforms,
}

/// One recorded draw, replayed at the end of the frame
struct DrawCommand {
    program: ProgramId,
    topology: PrimitiveTopology,
    indexed: bool,
    texture: TextureId,
    mesh: MeshId,
    count: u32,
    uniform_offset: u32,
}

/// Low-level GPU renderer built on `wgpu`
///
/// Owns the surface, every uploaded mesh, texture & program, and the draw
/// commands recorded since the last [`Renderer::render_frame`]
pub struct Renderer {
    gpu: Gpu,
    target: RenderTarget,
    layouts: Layouts,
    clear_color: Color,
    next_id: u32,
    meshes: HashMap<MeshId, GpuMesh>,
    textures: HashMap<TextureId, GpuTexture>,
    default_texture: GpuTexture,
    programs: HashMap<ProgramId, Program>,
    bound_program: Option<ProgramId>,
    bound_texture: TextureId,
    uniforms: UniformArena,
    commands: Vec<DrawCommand>,
}

impl Renderer {
    /// Creates a new `Renderer` with a configured surface, depth buffer & default texture
    pub async fn new(
        inner_width: u32,
        inner_height: u32,
        window: impl Into<SurfaceTarget<'static>> + WindowHandle,
    ) -> Result<Renderer, RenderError> {
        let instance = new_instance_with_webgpu_detection(&Default::default()).await;
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                // Force find adapter that can present to this surface
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await?;
        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                #[cfg(target_arch = "wasm32")]
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                ..Default::default()
            })
            .await?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        // WebGPU throws error 'size is zero' if not set
        let (w, h) = (inner_width.max(1), inner_height.max(1));
        let mut config = surface
            .get_default_config(&adapter, w, h)
            .ok_or(RenderError::UnsupportedSurface)?;
        config.present_mode = PresentMode::AutoVsync;
        surface.configure(&device, &config);

        let layouts = Layouts::new(&device);
        let default_texture = GpuTexture::create_default(&device, &queue, &layouts.texture);
        let depth = create_depth_view(&device, w, h);
        let alignment = device.limits().min_uniform_buffer_offset_alignment;

        Ok(Renderer {
            gpu: Gpu { device, queue },
            target: RenderTarget {
                surface,
                config,
                depth,
            },
            layouts,
            clear_color: Color::BLACK,
            next_id: 0,
            meshes: HashMap::new(),
            textures: HashMap::new(),
            default_texture,
            programs: HashMap::new(),
            bound_program: None,
            bound_texture: TextureId::NONE,
            uniforms: UniformArena::new(alignment),
            commands: Vec::new(),
        })
    }

    pub fn device(&self) -> &Device {
        &self.gpu.device
    }

    pub fn queue(&self) -> &Queue {
        &self.gpu.queue
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.target.config.format
    }

    /// Replays every draw recorded since the last call in one pass & presents
    ///
    /// A lost or outdated surface is reconfigured & the frame is dropped
    pub fn render_frame(&mut self) -> Result<(), RenderError> {
        let frame = match self.target.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                log::debug!("surface lost, reconfiguring");
                self.configure_surface();
                self.end_frame();
                return Ok(());
            }
            Err(err) => {
                self.end_frame();
                return Err(err.into());
            }
        };

        let view = frame.texture.create_view(&Default::default());
        self.uniforms
            .upload(&self.gpu.device, &self.gpu.queue, &self.layouts.uniforms);
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut r_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(self.clear_color.into()),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.target.depth,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if let Some(uniforms) = self.uniforms.bind_group() {
                for cmd in &self.commands {
                    // resources released after recording are skipped
                    let (Some(program), Some(mesh)) =
                        (self.programs.get(&cmd.program), self.meshes.get(&cmd.mesh))
                    else {
                        continue;
                    };
                    let texture = self
                        .textures
                        .get(&cmd.texture)
                        .unwrap_or(&self.default_texture);

                    r_pass.set_pipeline(program.pipelines.get(cmd.topology));
                    texture.bind(&mut r_pass, 0);
                    r_pass.set_bind_group(1, uniforms, &[cmd.uniform_offset]);
                    mesh.draw(&mut r_pass, cmd.indexed, cmd.count);
                }
            }
        }

        self.gpu.queue.submit(Some(encoder.finish()));
        frame.present();
        self.end_frame();
        Ok(())
    }

    fn end_frame(&mut self) {
        self.commands.clear();
        self.uniforms.clear();
    }

    fn configure_surface(&mut self) {
        self.target
            .surface
            .configure(&self.gpu.device, &self.target.config);
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Resizes the surface & depth buffer
    pub fn resize(&mut self, w: u32, h: u32) {
        if w == 0 || h == 0 {
            return;
        }
        (self.target.config.width, self.target.config.height) = (w, h);
        self.configure_surface();
        self.target.depth = create_depth_view(&self.gpu.device, w, h);
    }

    /// Returns the current surface dimensions (in pixels)
    pub fn surface_size(&self) -> (f32, f32) {
        (
            self.target.config.width as f32,
            self.target.config.height as f32,
        )
    }

    /// Enables/disables V‑Sync by changing the surface present mode
    ///
    /// `vsync = true` → [`PresentMode::Fifo`] (V‑Sync ON)
    /// `vsync = false` → [`PresentMode::AutoNoVsync`] (V‑Sync OFF)
    ///
    /// Reconfigures the surface immediately
    pub fn set_vsync(&mut self, on: bool) {
        self.target.config.present_mode = if on {
            PresentMode::Fifo
        } else {
            PresentMode::AutoNoVsync
        };
        self.configure_surface();
    }

    /// Sets the color used to clear the screen before drawing
    pub fn clear(&mut self, color: Color) {
        self.clear_color = color;
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn validate<T>(&self, build: impl FnOnce(&Device) -> T) -> Result<T, String> {
        self.gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = build(&self.gpu.device);
        match pollster::block_on(self.gpu.device.pop_error_scope()) {
            Some(err) => Err(err.to_string()),
            None => Ok(value),
        }
    }

    // Errors surface asynchronously through the uncaptured error handler on the web
    #[cfg(target_arch = "wasm32")]
    fn validate<T>(&self, build: impl FnOnce(&Device) -> T) -> Result<T, String> {
        Ok(build(&self.gpu.device))
    }
}

impl GraphicsDevice for Renderer {
    fn create_mesh(&mut self, vertices: &[MeshVertex]) -> MeshId {
        let id = MeshId(self.next_id());
        self.meshes
            .insert(id, GpuMesh::new(&self.gpu.device, vertices));
        id
    }

    fn update_mesh(&mut self, mesh: MeshId, vertices: &[MeshVertex]) {
        match self.meshes.get_mut(&mesh) {
            Some(gpu_mesh) => gpu_mesh.update(&self.gpu.device, &self.gpu.queue, vertices),
            None => log::warn!("update of unknown mesh {mesh:?}"),
        }
    }

    fn release_mesh(&mut self, mesh: MeshId) {
        self.meshes.remove(&mesh);
    }

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureId {
        let id = TextureId(self.next_id());
        let valid = rgba_len(width, height).is_some_and(|len| len > 0 && rgba.len() >= len);
        if !valid {
            // unknown ids fall back to the white texture
            log::error!("invalid {width}x{height} texture with {} bytes", rgba.len());
            return id;
        }
        let texture = GpuTexture::from_rgba(
            &self.gpu.device,
            &self.gpu.queue,
            &self.layouts.texture,
            rgba,
            width,
            height,
        );
        self.textures.insert(id, texture);
        id
    }

    fn release_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
    }

    fn compile_program(&mut self, source: &ShaderSource) -> Result<ProgramId, CompileError> {
        let label = source.label.to_string();
        let wgsl = format!("{PRELUDE}\n{}\n{}", source.vertex, source.fragment);

        let module = self
            .validate(|device| {
                device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some(&label),
                    source: wgpu::ShaderSource::Wgsl(wgsl.into()),
                })
            })
            .map_err(|message| CompileError::Compile {
                label: label.clone(),
                message,
            })?;

        let (layouts, format) = (&self.layouts, self.target.config.format);
        let pipelines = self
            .validate(|device| ProgramPipelines::new(device, &label, &module, layouts, format))
            .map_err(|message| CompileError::Link {
                label: label.clone(),
                message,
            })?;

        let id = ProgramId(self.next_id());
        self.programs.insert(
            id,
            Program {
                pipelines,
                uniforms: Uniforms::default(),
            },
        );
        Ok(id)
    }

    fn release_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
        if self.bound_program == Some(program) {
            self.bound_program = None;
        }
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.programs.get(&program).and_then(|_| builtin_uniform(name))
    }

    fn bind_program(&mut self, program: ProgramId) {
        self.bound_program = Some(program);
    }

    fn bind_texture(&mut self, texture: TextureId) {
        self.bound_texture = texture;
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let program = self.bound_program.and_then(|id| self.programs.get_mut(&id));
        match program {
            Some(program) => program.uniforms.set(location, value),
            None => log::warn!("set_uniform without a bound program"),
        }
    }

    fn draw(&mut self, mesh: MeshId, mode: DrawMode, count: u32) {
        let Some(program_id) = self.bound_program else {
            log::warn!("draw without a bound program");
            return;
        };
        let (Some(program), Some(gpu_mesh)) =
            (self.programs.get(&program_id), self.meshes.get_mut(&mesh))
        else {
            return;
        };

        let count = count.min(gpu_mesh.vertex_count());
        let (topology, indexed, count) = match mode {
            DrawMode::TriangleFan => {
                if count < 3 {
                    return;
                }
                gpu_mesh.ensure_fan_indices(&self.gpu.device);
                (PrimitiveTopology::TriangleList, true, (count - 2) * 3)
            }
            DrawMode::Triangles => (PrimitiveTopology::TriangleList, false, count),
            DrawMode::LineStrip => (PrimitiveTopology::LineStrip, false, count),
        };

        let uniform_offset = self.uniforms.push(&program.uniforms);
        self.commands.push(DrawCommand {
            program: program_id,
            topology,
            indexed,
            texture: self.bound_texture,
            mesh,
            count,
            uniform_offset,
        });
    }
}

fn create_depth_view(device: &Device, width: u32, height: u32) -> TextureView {
    device
        .create_texture(&TextureDescriptor {
            label: Some("Depth Texture"),
            size: Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&Default::default())
}
