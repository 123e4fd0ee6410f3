//! WebGPU renderer: panorama sphere, billboard quads, gaze reticle.
//!
//! No depth buffer: the sphere is drawn first and the interactive quads
//! and reticle are layered over it in submission order, which matches how
//! the tour composes (hotspots and docks always read on top of the pano).

use app_core::{EYE_HEIGHT, PANO_SPHERE_RADIUS};
use glam::{Mat4, Vec3, Vec4};
use std::rc::Rc;
use web_sys as web;
use wgpu::util::DeviceExt;

use crate::textures::RgbaImage;

const PANO_WGSL: &str = include_str!("shaders/pano.wgsl");
const BILLBOARD_WGSL: &str = include_str!("shaders/billboard.wgsl");
const RETICLE_WGSL: &str = include_str!("shaders/reticle.wgsl");

const SPHERE_SECTORS: u32 = 60;
const SPHERE_STACKS: u32 = 40;
const MAX_BILLBOARDS: usize = 96;
const OBJECT_STRIDE: u64 = 256; // min dynamic uniform alignment

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ObjectData {
    model: [[f32; 4]; 4],
    tint: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ReticleParams {
    params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SphereVertex {
    position: [f32; 3],
    uv: [f32; 2],
}

/// Uploaded image plus its sampler bind group; dropped handles release the
/// GPU memory, so billboard/hotspot teardown is just dropping these.
pub struct GpuTexture {
    _texture: wgpu::Texture,
    pub bind_group: wgpu::BindGroup,
}

pub struct BillboardDraw {
    pub model: Mat4,
    pub tint: Vec4,
    pub texture: Rc<GpuTexture>,
}

#[derive(Clone, Copy, Default)]
pub struct ReticleDraw {
    pub visible: bool,
    pub progress: f32,
}

/// Everything the driver wants on screen this frame.
#[derive(Default)]
pub struct DrawList {
    pub pano: Option<Rc<GpuTexture>>,
    pub billboards: Vec<BillboardDraw>,
    pub reticle: ReticleDraw,
}

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    pano_pipeline: wgpu::RenderPipeline,
    billboard_pipeline: wgpu::RenderPipeline,
    reticle_pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    reticle_buffer: wgpu::Buffer,
    reticle_bind_group: wgpu::BindGroup,

    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    sphere_vb: wgpu::Buffer,
    sphere_ib: wgpu::Buffer,
    sphere_index_count: u32,
    quad_vb: wgpu::Buffer,

    width: u32,
    height: u32,
}

impl<'a> GpuState<'a> {
    pub async fn new(canvas: &'a web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width();
        let height = canvas.height();

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps.formats[0];
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tex sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // Bind group layouts
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals bgl"),
            entries: &[uniform_entry(0, false)],
        });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object bgl"),
            entries: &[uniform_entry(0, true)],
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture bgl"),
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
            ],
        });

        // Uniform buffers
        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let object_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("objects"),
            size: OBJECT_STRIDE * MAX_BILLBOARDS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let reticle_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("reticle"),
            size: std::mem::size_of::<ReticleParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals bg"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });
        let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object bg"),
            layout: &object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &object_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ObjectData>() as u64),
                }),
            }],
        });
        let reticle_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("reticle bg"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: reticle_buffer.as_entire_binding(),
            }],
        });

        // Geometry
        let (vertices, indices) = build_sphere_mesh();
        let sphere_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere vb"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let sphere_ib = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere ib"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let quad_vertices: [f32; 12] = [
            -0.5, -0.5, 0.5, -0.5, 0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, 0.5,
        ];
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad vb"),
            contents: bytemuck::cast_slice(&quad_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // Pipelines
        let pano_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pano shader"),
            source: wgpu::ShaderSource::Wgsl(PANO_WGSL.into()),
        });
        let billboard_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("billboard shader"),
            source: wgpu::ShaderSource::Wgsl(BILLBOARD_WGSL.into()),
        });
        let reticle_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("reticle shader"),
            source: wgpu::ShaderSource::Wgsl(RETICLE_WGSL.into()),
        });

        let sphere_vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SphereVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 12,
                    shader_location: 1,
                },
            ],
        };
        let quad_vertex_layout = wgpu::VertexBufferLayout {
            array_stride: (std::mem::size_of::<f32>() * 2) as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 0,
                shader_location: 0,
            }],
        };

        let pano_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pano pl"),
            bind_group_layouts: &[&globals_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let pano_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("pano pipeline"),
            layout: Some(&pano_pl),
            vertex: wgpu::VertexState {
                module: &pano_shader,
                entry_point: Some("vs_main"),
                buffers: &[sphere_vertex_layout],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                // The sphere is viewed from inside; skip culling instead of
                // fighting the inverted winding.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &pano_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let billboard_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("billboard pl"),
            bind_group_layouts: &[&globals_layout, &object_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let billboard_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("billboard pipeline"),
            layout: Some(&billboard_pl),
            vertex: wgpu::VertexState {
                module: &billboard_shader,
                entry_point: Some("vs_main"),
                buffers: &[quad_vertex_layout.clone()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &billboard_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let reticle_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("reticle pl"),
            bind_group_layouts: &[&globals_layout],
            push_constant_ranges: &[],
        });
        let reticle_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("reticle pipeline"),
            layout: Some(&reticle_pl),
            vertex: wgpu::VertexState {
                module: &reticle_shader,
                entry_point: Some("vs_main"),
                buffers: &[quad_vertex_layout],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &reticle_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pano_pipeline,
            billboard_pipeline,
            reticle_pipeline,
            globals_buffer,
            globals_bind_group,
            object_buffer,
            object_bind_group,
            reticle_buffer,
            reticle_bind_group,
            texture_layout,
            sampler,
            sphere_vb,
            sphere_ib,
            sphere_index_count: indices.len() as u32,
            quad_vb,
            width,
            height,
        })
    }

    /// Upload RGBA pixels as an sRGB texture ready for either pipeline.
    pub fn create_texture(&self, image: &RgbaImage) -> GpuTexture {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: None,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: None,
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        GpuTexture {
            _texture: texture,
            bind_group,
        }
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn render(&mut self, view_proj: Mat4, list: &DrawList) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });

        self.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::bytes_of(&Globals {
                view_proj: view_proj.to_cols_array_2d(),
            }),
        );

        let count = list.billboards.len().min(MAX_BILLBOARDS);
        if list.billboards.len() > MAX_BILLBOARDS {
            log::warn!("billboard overflow: {} dropped", list.billboards.len() - count);
        }
        for (i, draw) in list.billboards.iter().take(count).enumerate() {
            self.queue.write_buffer(
                &self.object_buffer,
                i as u64 * OBJECT_STRIDE,
                bytemuck::bytes_of(&ObjectData {
                    model: draw.model.to_cols_array_2d(),
                    tint: draw.tint.to_array(),
                }),
            );
        }
        self.queue.write_buffer(
            &self.reticle_buffer,
            0,
            bytemuck::bytes_of(&ReticleParams {
                params: [
                    crate::constants::RETICLE_RADIUS * 2.0,
                    self.aspect(),
                    list.reticle.progress,
                    if list.reticle.visible { 1.0 } else { 0.0 },
                ],
            }),
        );

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rpass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.06,
                            g: 0.06,
                            b: 0.06,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(pano) = &list.pano {
                rpass.set_pipeline(&self.pano_pipeline);
                rpass.set_bind_group(0, &self.globals_bind_group, &[]);
                rpass.set_bind_group(1, &pano.bind_group, &[]);
                rpass.set_vertex_buffer(0, self.sphere_vb.slice(..));
                rpass.set_index_buffer(self.sphere_ib.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..self.sphere_index_count, 0, 0..1);
            }

            rpass.set_pipeline(&self.billboard_pipeline);
            rpass.set_bind_group(0, &self.globals_bind_group, &[]);
            rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
            for (i, draw) in list.billboards.iter().take(count).enumerate() {
                rpass.set_bind_group(
                    1,
                    &self.object_bind_group,
                    &[(i as u64 * OBJECT_STRIDE) as u32],
                );
                rpass.set_bind_group(2, &draw.texture.bind_group, &[]);
                rpass.draw(0..6, 0..1);
            }

            if list.reticle.visible {
                rpass.set_pipeline(&self.reticle_pipeline);
                rpass.set_bind_group(0, &self.reticle_bind_group, &[]);
                rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
                rpass.draw(0..6, 0..1);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn uniform_entry(binding: u32, dynamic: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Inside-out UV sphere around the eye, equirect-mapped so 0 degrees sits
/// straight ahead on -Z.
fn build_sphere_mesh() -> (Vec<SphereVertex>, Vec<u32>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    let center = Vec3::new(0.0, EYE_HEIGHT, 0.0);

    for stack in 0..=SPHERE_STACKS {
        let v = stack as f32 / SPHERE_STACKS as f32;
        let phi = v * std::f32::consts::PI;
        let (sp, cp) = phi.sin_cos();
        for sector in 0..=SPHERE_SECTORS {
            let u = sector as f32 / SPHERE_SECTORS as f32;
            let theta = u * std::f32::consts::TAU;
            let (st, ct) = theta.sin_cos();
            // u = 0.5 lands on -Z (forward); u grows clockwise from above,
            // the mirror a viewer inside the sphere expects.
            let dir = Vec3::new(-sp * st, cp, sp * ct);
            vertices.push(SphereVertex {
                position: (center + dir * PANO_SPHERE_RADIUS).to_array(),
                uv: [u, v],
            });
        }
    }
    let ring = SPHERE_SECTORS + 1;
    for stack in 0..SPHERE_STACKS {
        for sector in 0..SPHERE_SECTORS {
            let a = stack * ring + sector;
            let b = a + ring;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    (vertices, indices)
}
