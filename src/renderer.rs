//! Forward renderer for a [`SceneWorld`].
//!
//! Three passes per frame:
//! 1. shadow depth from the directional light (casters only)
//! 2. lit scene into an HDR target sized by the viewport's drawing buffer
//! 3. linear tone mapping onto the output (window surface or offscreen)
//!
//! Meshes are uploaded the first time the renderer sees them, so objects
//! added to the scene after construction are picked up on the next frame.

use crate::capture::unpad_rows;
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Vertex};
use crate::scene::SceneWorld;
use crate::viewport::Viewport;
use bytemuck::{Pod, Zeroable};
use winit::dpi::PhysicalSize;

const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GlobalsUniform {
    view_proj: [[f32; 4]; 4],
    light_view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
    light_direction: [f32; 4],
    light_color: [f32; 4],
    ambient_color: [f32; 4],
    shadow_params: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct MeshUniform {
    model: [[f32; 4]; 4],
    base_color: [f32; 4],
    material: [f32; 4],
}

impl MeshUniform {
    fn from_mesh(mesh: &Mesh) -> Self {
        let material = &mesh.material;
        Self {
            model: mesh.transform.matrix().to_cols_array_2d(),
            base_color: material.color.scaled(1.0),
            material: [
                material.metalness,
                material.roughness,
                if mesh.receive_shadow { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ToneMappingUniform {
    exposure: f32,
    encode_srgb: f32,
    _padding: [f32; 2],
}

impl ToneMappingUniform {
    fn new(exposure: f32, output_format: wgpu::TextureFormat) -> Self {
        Self {
            exposure,
            encode_srgb: if output_format.is_srgb() { 0.0 } else { 1.0 },
            _padding: [0.0; 2],
        }
    }
}

/// Where the final image goes.
pub enum RenderOutput {
    Surface {
        surface: wgpu::Surface<'static>,
        size: PhysicalSize<u32>,
    },
    Offscreen {
        width: u32,
        height: u32,
    },
}

enum OutputTarget {
    Surface {
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    },
    Offscreen {
        texture: wgpu::Texture,
        view: wgpu::TextureView,
    },
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    cast_shadow: bool,
}

struct RenderTargets {
    hdr_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    tone_mapping_bind_group: wgpu::BindGroup,
}

pub struct Renderer {
    output: OutputTarget,
    output_format: wgpu::TextureFormat,
    output_size: (u32, u32),
    viewport: Viewport,

    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    shadow_globals_bind_group: wgpu::BindGroup,
    mesh_bind_group_layout: wgpu::BindGroupLayout,
    tone_mapping_bind_group_layout: wgpu::BindGroupLayout,
    tone_mapping_buffer: wgpu::Buffer,
    hdr_sampler: wgpu::Sampler,

    scene_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    tone_mapping_pipeline: wgpu::RenderPipeline,

    shadow_view: wgpu::TextureView,
    targets: RenderTargets,
    meshes: Vec<GpuMesh>,
}

impl Renderer {
    pub fn new(
        gpu: &GpuContext,
        output: RenderOutput,
        viewport: Viewport,
        scene: &SceneWorld,
    ) -> anyhow::Result<Self> {
        let (output, output_format, output_size) = Self::create_output(gpu, output)?;
        log::info!(
            "Renderer output {:?} {}x{}, drawing buffer {:?}",
            output_format,
            output_size.0,
            output_size.1,
            viewport.drawing_buffer_size()
        );

        let globals_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Globals Buffer"),
            size: std::mem::size_of::<GlobalsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let map_size = scene.scene.directional.shadow.map_size.max(1);
        let shadow_view = Self::create_texture(
            gpu,
            "Shadow Map",
            (map_size, map_size),
            DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        )
        .create_view(&wgpu::TextureViewDescriptor::default());
        let shadow_sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });
        let hdr_sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("HDR Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let globals_layout = Self::create_globals_layout(gpu);
        let shadow_globals_layout = Self::create_shadow_globals_layout(gpu);
        let mesh_bind_group_layout = Self::create_mesh_layout(gpu);
        let tone_mapping_bind_group_layout = Self::create_tone_mapping_layout(gpu);

        let globals_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                },
            ],
        });
        let shadow_globals_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Globals Bind Group"),
            layout: &shadow_globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let tone_mapping_buffer = gpu.create_buffer_init(
            "Tone Mapping Buffer",
            bytemuck::bytes_of(&ToneMappingUniform::new(scene.scene.exposure, output_format)),
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        let scene_shader = gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });
        let shadow_shader = gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/shadow.wgsl").into()),
        });
        let tone_mapping_shader = gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Tone Mapping Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/tonemap.wgsl").into()),
        });

        let scene_pipeline = Self::create_scene_pipeline(
            gpu,
            &scene_shader,
            &[&globals_layout, &mesh_bind_group_layout],
        );
        let shadow_pipeline = Self::create_shadow_pipeline(
            gpu,
            &shadow_shader,
            &[&shadow_globals_layout, &mesh_bind_group_layout],
        );
        let tone_mapping_pipeline = Self::create_tone_mapping_pipeline(
            gpu,
            &tone_mapping_shader,
            &tone_mapping_bind_group_layout,
            output_format,
        );

        let targets = Self::create_targets(
            gpu,
            viewport.drawing_buffer_size(),
            &tone_mapping_bind_group_layout,
            &hdr_sampler,
            &tone_mapping_buffer,
        );

        let mut renderer = Self {
            output,
            output_format,
            output_size,
            viewport,
            globals_buffer,
            globals_bind_group,
            shadow_globals_bind_group,
            mesh_bind_group_layout,
            tone_mapping_bind_group_layout,
            tone_mapping_buffer,
            hdr_sampler,
            scene_pipeline,
            shadow_pipeline,
            tone_mapping_pipeline,
            shadow_view,
            targets,
            meshes: Vec::new(),
        };
        renderer.upload_new_meshes(gpu, scene);
        Ok(renderer)
    }

    /// Final image size in pixels.
    pub fn output_size(&self) -> (u32, u32) {
        self.output_size
    }

    /// HDR render target size: client size times the clamped pixel ratio.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        self.viewport.drawing_buffer_size()
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.viewport.pixel_ratio()
    }

    pub fn output_format(&self) -> wgpu::TextureFormat {
        self.output_format
    }

    /// Resizes the output and render targets. Calling it again with the same
    /// sizes rebuilds identical targets. Empty sizes are ignored.
    pub fn resize(&mut self, gpu: &GpuContext, viewport: Viewport, physical_size: PhysicalSize<u32>) {
        if viewport.is_empty() || physical_size.width == 0 || physical_size.height == 0 {
            return;
        }

        self.viewport = viewport;
        if let OutputTarget::Surface { surface, config } = &mut self.output {
            config.width = physical_size.width;
            config.height = physical_size.height;
            surface.configure(&gpu.device, config);
            self.output_size = (config.width, config.height);
        }

        self.targets = Self::create_targets(
            gpu,
            viewport.drawing_buffer_size(),
            &self.tone_mapping_bind_group_layout,
            &self.hdr_sampler,
            &self.tone_mapping_buffer,
        );
        log::debug!(
            "Resized: output {:?}, drawing buffer {:?}, pixel ratio {}",
            self.output_size,
            self.viewport.drawing_buffer_size(),
            self.viewport.pixel_ratio()
        );
    }

    /// Reconfigures the surface with its current settings, e.g. after
    /// `SurfaceError::Lost`.
    pub fn reconfigure(&self, gpu: &GpuContext) {
        if let OutputTarget::Surface { surface, config } = &self.output {
            surface.configure(&gpu.device, config);
        }
    }

    pub fn render(&mut self, gpu: &GpuContext, scene: &SceneWorld) -> Result<(), wgpu::SurfaceError> {
        self.upload_new_meshes(gpu, scene);
        self.write_uniforms(gpu, scene);

        let frame = match &self.output {
            OutputTarget::Surface { surface, .. } => Some(surface.get_current_texture()?),
            OutputTarget::Offscreen { .. } => None,
        };
        let surface_view = frame
            .as_ref()
            .map(|f| f.texture.create_view(&wgpu::TextureViewDescriptor::default()));
        let output_view = match (&self.output, &surface_view) {
            (OutputTarget::Offscreen { view, .. }, _) => view,
            (OutputTarget::Surface { .. }, Some(view)) => view,
            (OutputTarget::Surface { .. }, None) => return Err(wgpu::SurfaceError::Lost),
        };

        let mut encoder = gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        let light = &scene.scene.directional;
        if scene.scene.shadows_enabled && light.cast_shadow {
            self.encode_shadow_pass(&mut encoder);
        }
        self.encode_scene_pass(&mut encoder, scene);
        self.encode_tone_mapping_pass(&mut encoder, output_view);

        gpu.queue.submit(Some(encoder.finish()));
        if let Some(frame) = frame {
            frame.present();
        }

        Ok(())
    }

    /// Reads back the last offscreen frame as tightly packed RGBA8 rows.
    /// Returns `None` when rendering to a window surface.
    pub fn capture_frame(&self, gpu: &GpuContext) -> Option<Vec<u8>> {
        let OutputTarget::Offscreen { texture, .. } = &self.output else {
            return None;
        };
        let (width, height) = self.output_size;

        let unpadded_bytes_per_row = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let bytes_per_row = ((unpadded_bytes_per_row + align - 1) / align) * align;

        let staging_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Staging Buffer"),
            size: bytes_per_row as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Capture Encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &staging_buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        let submission = gpu.queue.submit(Some(encoder.finish()));
        gpu.device.poll(wgpu::MaintainBase::WaitForSubmissionIndex(submission));

        let buffer_slice = staging_buffer.slice(..);
        let (tx, rx) = futures::channel::oneshot::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        gpu.device.poll(wgpu::MaintainBase::Wait);

        if let Err(e) = pollster::block_on(rx).ok()? {
            log::error!("Failed to map capture buffer: {:?}", e);
            return None;
        }

        let data = buffer_slice.get_mapped_range();
        let frame = unpad_rows(&data, bytes_per_row as usize, unpadded_bytes_per_row as usize, height as usize);
        drop(data);
        staging_buffer.unmap();

        Some(frame)
    }

    fn upload_new_meshes(&mut self, gpu: &GpuContext, scene: &SceneWorld) {
        let meshes = scene.scene.meshes();
        for (index, mesh) in meshes.iter().enumerate().skip(self.meshes.len()) {
            let data = mesh.geometry.build();
            let vertex_buffer = gpu.create_buffer_init(
                &format!("Mesh {} Vertices", index),
                bytemuck::cast_slice(&data.vertices),
                wgpu::BufferUsages::VERTEX,
            );
            let index_buffer = gpu.create_buffer_init(
                &format!("Mesh {} Indices", index),
                bytemuck::cast_slice(&data.indices),
                wgpu::BufferUsages::INDEX,
            );
            let uniform_buffer = gpu.create_buffer_init(
                &format!("Mesh {} Uniform", index),
                bytemuck::bytes_of(&MeshUniform::from_mesh(mesh)),
                wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            );
            let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("Mesh {} Bind Group", index)),
                layout: &self.mesh_bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

            log::debug!(
                "Uploaded mesh {}: {} vertices, {} indices",
                index,
                data.vertices.len(),
                data.indices.len()
            );
            self.meshes.push(GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: data.indices.len() as u32,
                uniform_buffer,
                bind_group,
                cast_shadow: mesh.cast_shadow,
            });
        }
    }

    fn write_uniforms(&mut self, gpu: &GpuContext, scene: &SceneWorld) {
        let render_scene = &scene.scene;
        let light = &render_scene.directional;
        let camera_position = scene.camera.position();
        let shadows = render_scene.shadows_enabled && light.cast_shadow;

        let globals = GlobalsUniform {
            view_proj: scene.camera.view_projection_matrix().to_cols_array_2d(),
            light_view_proj: light.shadow_view_projection().to_cols_array_2d(),
            camera_position: [camera_position.x, camera_position.y, camera_position.z, 1.0],
            light_direction: light.direction().extend(0.0).to_array(),
            light_color: light.color.scaled(light.intensity),
            ambient_color: render_scene.ambient.color.scaled(render_scene.ambient.intensity),
            shadow_params: [
                light.shadow.bias,
                1.0 / light.shadow.map_size.max(1) as f32,
                if shadows { 1.0 } else { 0.0 },
                0.0,
            ],
        };
        gpu.queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
        gpu.queue.write_buffer(
            &self.tone_mapping_buffer,
            0,
            bytemuck::bytes_of(&ToneMappingUniform::new(render_scene.exposure, self.output_format)),
        );

        for (gpu_mesh, mesh) in self.meshes.iter_mut().zip(render_scene.meshes()) {
            gpu_mesh.cast_shadow = mesh.cast_shadow;
            gpu.queue.write_buffer(
                &gpu_mesh.uniform_buffer,
                0,
                bytemuck::bytes_of(&MeshUniform::from_mesh(mesh)),
            );
        }
    }

    fn encode_shadow_pass(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.shadow_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.shadow_pipeline);
        pass.set_bind_group(0, &self.shadow_globals_bind_group, &[]);
        for mesh in self.meshes.iter().filter(|m| m.cast_shadow) {
            Self::draw_mesh(&mut pass, mesh);
        }
    }

    fn encode_scene_pass(&self, encoder: &mut wgpu::CommandEncoder, scene: &SceneWorld) {
        let background = scene.scene.background;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.targets.hdr_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: background.r as f64,
                        g: background.g as f64,
                        b: background.b as f64,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.targets.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.scene_pipeline);
        pass.set_bind_group(0, &self.globals_bind_group, &[]);
        for mesh in &self.meshes {
            Self::draw_mesh(&mut pass, mesh);
        }
    }

    fn encode_tone_mapping_pass(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Tone Mapping Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.tone_mapping_pipeline);
        pass.set_bind_group(0, &self.targets.tone_mapping_bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    fn draw_mesh<'a>(pass: &mut wgpu::RenderPass<'a>, mesh: &'a GpuMesh) {
        pass.set_bind_group(1, &mesh.bind_group, &[]);
        pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }

    fn create_output(
        gpu: &GpuContext,
        output: RenderOutput,
    ) -> anyhow::Result<(OutputTarget, wgpu::TextureFormat, (u32, u32))> {
        match output {
            RenderOutput::Surface { surface, size } => {
                let surface_caps = surface.get_capabilities(&gpu.adapter);
                let surface_format = surface_caps
                    .formats
                    .iter()
                    .find(|f| f.is_srgb())
                    .copied()
                    .or_else(|| surface_caps.formats.first().copied())
                    .ok_or_else(|| anyhow::anyhow!("Surface is incompatible with the adapter"))?;

                let config = wgpu::SurfaceConfiguration {
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    format: surface_format,
                    width: size.width.max(1),
                    height: size.height.max(1),
                    present_mode: wgpu::PresentMode::Fifo,
                    alpha_mode: surface_caps.alpha_modes[0],
                    view_formats: vec![],
                    desired_maximum_frame_latency: 2,
                };
                surface.configure(&gpu.device, &config);

                let size = (config.width, config.height);
                Ok((OutputTarget::Surface { surface, config }, surface_format, size))
            }
            RenderOutput::Offscreen { width, height } => {
                let size = (width.max(1), height.max(1));
                let texture = Self::create_texture(
                    gpu,
                    "Offscreen Output",
                    size,
                    OFFSCREEN_FORMAT,
                    wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
                );
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                Ok((OutputTarget::Offscreen { texture, view }, OFFSCREEN_FORMAT, size))
            }
        }
    }

    fn create_texture(
        gpu: &GpuContext,
        label: &str,
        (width, height): (u32, u32),
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> wgpu::Texture {
        gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        })
    }

    fn create_targets(
        gpu: &GpuContext,
        size: (u32, u32),
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        tone_mapping_buffer: &wgpu::Buffer,
    ) -> RenderTargets {
        let usage = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
        let hdr_view = Self::create_texture(gpu, "HDR Target", size, HDR_FORMAT, usage)
            .create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = Self::create_texture(
            gpu,
            "Depth Target",
            size,
            DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        )
        .create_view(&wgpu::TextureViewDescriptor::default());

        let tone_mapping_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Tone Mapping Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&hdr_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: tone_mapping_buffer.as_entire_binding(),
                },
            ],
        });

        RenderTargets {
            hdr_view,
            depth_view,
            tone_mapping_bind_group,
        }
    }

    fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }
    }

    fn create_globals_layout(gpu: &GpuContext) -> wgpu::BindGroupLayout {
        gpu.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[
                Self::uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        })
    }

    fn create_shadow_globals_layout(gpu: &GpuContext) -> wgpu::BindGroupLayout {
        gpu.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Globals Bind Group Layout"),
            entries: &[Self::uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        })
    }

    fn create_mesh_layout(gpu: &GpuContext) -> wgpu::BindGroupLayout {
        gpu.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Bind Group Layout"),
            entries: &[Self::uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
        })
    }

    fn create_tone_mapping_layout(gpu: &GpuContext) -> wgpu::BindGroupLayout {
        gpu.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Tone Mapping Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                Self::uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
        })
    }

    fn create_scene_pipeline(
        gpu: &GpuContext,
        shader: &wgpu::ShaderModule,
        layouts: &[&wgpu::BindGroupLayout],
    ) -> wgpu::RenderPipeline {
        let pipeline_layout = gpu.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: layouts,
            push_constant_ranges: &[],
        });

        gpu.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: "vs_main",
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        })
    }

    fn create_shadow_pipeline(
        gpu: &GpuContext,
        shader: &wgpu::ShaderModule,
        layouts: &[&wgpu::BindGroupLayout],
    ) -> wgpu::RenderPipeline {
        let pipeline_layout = gpu.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: layouts,
            push_constant_ranges: &[],
        });

        gpu.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: "vs_shadow",
                buffers: &[Vertex::layout()],
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Back faces cast, keeping acne off the lit side.
                cull_mode: Some(wgpu::Face::Front),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        })
    }

    fn create_tone_mapping_pipeline(
        gpu: &GpuContext,
        shader: &wgpu::ShaderModule,
        layout: &wgpu::BindGroupLayout,
        output_format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let pipeline_layout = gpu.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Tone Mapping Pipeline Layout"),
            bind_group_layouts: &[layout],
            push_constant_ranges: &[],
        });

        gpu.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Tone Mapping Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: "vs_main",
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: output_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        })
    }
}
