#[cfg(target_arch = "wasm32")]
mod imp {
    use ::wgpu::util::DeviceExt;
    use std::borrow::Cow;
    use std::collections::HashMap;
    use wasm_bindgen::prelude::*;

    use gpu::{RenderCommand, RenderFrame, uv_sphere};
    use scene::components::TextureId;
    use tracing::debug;

    use crate::textures::RgbaImage;

    const CLEAR: ::wgpu::Color = ::wgpu::Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    const GLOBE_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

@group(1) @binding(0)
var tex: texture_2d<f32>;
@group(1) @binding(1)
var tex_sampler: sampler;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) uv: vec2<f32>) -> VsOut {
    return VsOut(globals.view_proj * globals.model * vec4<f32>(position, 1.0), uv);
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    // Unlit: the surface image is shown as-is.
    return textureSample(tex, tex_sampler, in.uv);
}
"#;

    const SPRITE_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

@group(1) @binding(0)
var tex: texture_2d<f32>;
@group(1) @binding(1)
var tex_sampler: sampler;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) uv: vec2<f32>) -> VsOut {
    return VsOut(globals.view_proj * vec4<f32>(position, 1.0), uv);
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let c = textureSample(tex, tex_sampler, in.uv);
    if c.a < 0.01 {
        discard;
    }
    return c;
}
"#;

    const STARS_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) a: f32,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) alpha: f32) -> VsOut {
    return VsOut(globals.view_proj * vec4<f32>(position, 1.0), alpha);
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 1.0, 1.0, in.a);
}
"#;

    #[repr(C)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct TexturedVertex {
        position: [f32; 3],
        uv: [f32; 2],
    }

    #[repr(C)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct StarVertex {
        position: [f32; 3],
        alpha: f32,
    }

    #[repr(C)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct Globals {
        view_proj: [[f32; 4]; 4],
        model: [[f32; 4]; 4],
    }

    const TEXTURED_ATTRIBUTES: [::wgpu::VertexAttribute; 2] = [
        ::wgpu::VertexAttribute {
            format: ::wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: 0,
        },
        ::wgpu::VertexAttribute {
            format: ::wgpu::VertexFormat::Float32x2,
            offset: 12,
            shader_location: 1,
        },
    ];

    const STAR_ATTRIBUTES: [::wgpu::VertexAttribute; 2] = [
        ::wgpu::VertexAttribute {
            format: ::wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: 0,
        },
        ::wgpu::VertexAttribute {
            format: ::wgpu::VertexFormat::Float32,
            offset: 12,
            shader_location: 1,
        },
    ];

    struct SphereMesh {
        radius: f64,
        segments: u32,
        vertex_buffer: ::wgpu::Buffer,
        index_buffer: ::wgpu::Buffer,
        index_count: u32,
    }

    /// Growable vertex buffer rewritten every frame.
    struct DynamicBuffer {
        label: &'static str,
        buffer: ::wgpu::Buffer,
        capacity: u64,
    }

    impl DynamicBuffer {
        fn new(device: &::wgpu::Device, label: &'static str, capacity: u64) -> Self {
            let capacity = capacity.max(64);
            let buffer = device.create_buffer(&::wgpu::BufferDescriptor {
                label: Some(label),
                size: capacity,
                usage: ::wgpu::BufferUsages::VERTEX | ::wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            Self {
                label,
                buffer,
                capacity,
            }
        }

        fn write(&mut self, device: &::wgpu::Device, queue: &::wgpu::Queue, bytes: &[u8]) {
            let needed = bytes.len() as u64;
            if needed > self.capacity {
                *self = Self::new(device, self.label, needed.next_power_of_two());
            }
            if needed > 0 {
                queue.write_buffer(&self.buffer, 0, bytes);
            }
        }
    }

    pub struct GpuContext {
        _instance: &'static ::wgpu::Instance,
        surface: ::wgpu::Surface<'static>,
        device: ::wgpu::Device,
        queue: ::wgpu::Queue,
        config: ::wgpu::SurfaceConfiguration,
        depth_view: ::wgpu::TextureView,
        globals_buffer: ::wgpu::Buffer,
        globals_bind_group: ::wgpu::BindGroup,
        texture_layout: ::wgpu::BindGroupLayout,
        sampler: ::wgpu::Sampler,
        globe_pipeline: ::wgpu::RenderPipeline,
        sprite_pipeline: ::wgpu::RenderPipeline,
        stars_pipeline: ::wgpu::RenderPipeline,
        sphere: Option<SphereMesh>,
        sprite_vertices: DynamicBuffer,
        star_vertices: DynamicBuffer,
        textures: HashMap<TextureId, ::wgpu::BindGroup>,
        fallback_texture: ::wgpu::BindGroup,
    }

    fn create_depth_view(
        device: &::wgpu::Device,
        config: &::wgpu::SurfaceConfiguration,
    ) -> ::wgpu::TextureView {
        let tex = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some("globe-depth"),
            size: ::wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format: ::wgpu::TextureFormat::Depth24Plus,
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        tex.create_view(&::wgpu::TextureViewDescriptor::default())
    }

    fn create_texture_bind_group(
        device: &::wgpu::Device,
        queue: &::wgpu::Queue,
        layout: &::wgpu::BindGroupLayout,
        sampler: &::wgpu::Sampler,
        image: &RgbaImage,
        label: &str,
    ) -> ::wgpu::BindGroup {
        let size = ::wgpu::Extent3d {
            width: image.width.max(1),
            height: image.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format: ::wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: ::wgpu::TextureUsages::TEXTURE_BINDING | ::wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            ::wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: ::wgpu::Origin3d::ZERO,
                aspect: ::wgpu::TextureAspect::All,
            },
            &image.pixels,
            ::wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * size.width),
                rows_per_image: Some(size.height),
            },
            size,
        );
        let view = texture.create_view(&::wgpu::TextureViewDescriptor::default());
        device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                ::wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ::wgpu::BindingResource::TextureView(&view),
                },
                ::wgpu::BindGroupEntry {
                    binding: 1,
                    resource: ::wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn create_pipeline(
        device: &::wgpu::Device,
        label: &str,
        layout: &::wgpu::PipelineLayout,
        shader: &::wgpu::ShaderModule,
        buffer: ::wgpu::VertexBufferLayout<'_>,
        format: ::wgpu::TextureFormat,
        topology: ::wgpu::PrimitiveTopology,
        blend: ::wgpu::BlendState,
        depth_write_enabled: bool,
    ) -> ::wgpu::RenderPipeline {
        device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: ::wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[buffer],
            },
            fragment: Some(::wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(::wgpu::ColorTargetState {
                    format,
                    blend: Some(blend),
                    write_mask: ::wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: ::wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: ::wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: ::wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(::wgpu::DepthStencilState {
                format: ::wgpu::TextureFormat::Depth24Plus,
                depth_write_enabled,
                depth_compare: ::wgpu::CompareFunction::LessEqual,
                stencil: ::wgpu::StencilState::default(),
                bias: ::wgpu::DepthBiasState::default(),
            }),
            multisample: ::wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    impl GpuContext {
        pub async fn new(canvas: web_sys::HtmlCanvasElement) -> Result<Self, JsValue> {
            let width = canvas.width().max(1);
            let height = canvas.height().max(1);

            // `wgpu::Surface` must not outlive its `wgpu::Instance`; the
            // instance lives for the rest of the page.
            let instance: &'static ::wgpu::Instance = Box::leak(Box::new(::wgpu::Instance::new(
                &::wgpu::InstanceDescriptor {
                    backends: ::wgpu::Backends::BROWSER_WEBGPU | ::wgpu::Backends::GL,
                    ..Default::default()
                },
            )));

            let surface = instance
                .create_surface(::wgpu::SurfaceTarget::Canvas(canvas))
                .map_err(|e| JsValue::from_str(&format!("surface error: {e}")))?;

            let adapter = instance
                .request_adapter(&::wgpu::RequestAdapterOptions {
                    power_preference: ::wgpu::PowerPreference::HighPerformance,
                    compatible_surface: Some(&surface),
                    force_fallback_adapter: false,
                })
                .await
                .map_err(|e| JsValue::from_str(&format!("adapter error: {e}")))?;

            let (device, queue) = adapter
                .request_device(&::wgpu::DeviceDescriptor {
                    label: Some("globe-wgpu-device"),
                    required_features: ::wgpu::Features::empty(),
                    required_limits: ::wgpu::Limits::downlevel_webgl2_defaults(),
                    ..Default::default()
                })
                .await
                .map_err(|e| JsValue::from_str(&format!("device error: {e}")))?;

            let caps = surface.get_capabilities(&adapter);
            let format = caps
                .formats
                .iter()
                .copied()
                .find(|f| f.is_srgb())
                .or_else(|| caps.formats.first().copied())
                .ok_or_else(|| JsValue::from_str("surface reports no formats"))?;
            let alpha_mode = caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(::wgpu::CompositeAlphaMode::Auto);

            let config = ::wgpu::SurfaceConfiguration {
                usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
                format,
                width,
                height,
                desired_maximum_frame_latency: 2,
                present_mode: ::wgpu::PresentMode::Fifo,
                alpha_mode,
                view_formats: vec![],
            };
            surface.configure(&device, &config);
            let depth_view = create_depth_view(&device, &config);

            let globals_buffer = device.create_buffer(&::wgpu::BufferDescriptor {
                label: Some("globe-globals"),
                size: std::mem::size_of::<Globals>() as u64,
                usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let globals_layout =
                device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                    label: Some("globe-globals-bgl"),
                    entries: &[::wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: ::wgpu::ShaderStages::VERTEX,
                        ty: ::wgpu::BindingType::Buffer {
                            ty: ::wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    }],
                });

            let globals_bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
                label: Some("globe-globals-bg"),
                layout: &globals_layout,
                entries: &[::wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                }],
            });

            let texture_layout =
                device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                    label: Some("globe-texture-bgl"),
                    entries: &[
                        ::wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: ::wgpu::ShaderStages::FRAGMENT,
                            ty: ::wgpu::BindingType::Texture {
                                sample_type: ::wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: ::wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        ::wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: ::wgpu::ShaderStages::FRAGMENT,
                            ty: ::wgpu::BindingType::Sampler(::wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                });

            let sampler = device.create_sampler(&::wgpu::SamplerDescriptor {
                label: Some("globe-sampler"),
                address_mode_u: ::wgpu::AddressMode::ClampToEdge,
                address_mode_v: ::wgpu::AddressMode::ClampToEdge,
                address_mode_w: ::wgpu::AddressMode::ClampToEdge,
                mag_filter: ::wgpu::FilterMode::Linear,
                min_filter: ::wgpu::FilterMode::Linear,
                ..Default::default()
            });

            let textured_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
                label: Some("globe-textured-pipeline-layout"),
                bind_group_layouts: &[&globals_layout, &texture_layout],
                immediate_size: 0,
            });
            let stars_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
                label: Some("globe-stars-pipeline-layout"),
                bind_group_layouts: &[&globals_layout],
                immediate_size: 0,
            });

            let globe_shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
                label: Some("globe-shader"),
                source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(GLOBE_SHADER)),
            });
            let sprite_shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
                label: Some("globe-sprite-shader"),
                source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(SPRITE_SHADER)),
            });
            let stars_shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
                label: Some("globe-stars-shader"),
                source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(STARS_SHADER)),
            });

            let textured_buffer = || ::wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<TexturedVertex>() as ::wgpu::BufferAddress,
                step_mode: ::wgpu::VertexStepMode::Vertex,
                attributes: &TEXTURED_ATTRIBUTES,
            };

            let globe_pipeline = create_pipeline(
                &device,
                "globe-pipeline",
                &textured_layout,
                &globe_shader,
                textured_buffer(),
                format,
                ::wgpu::PrimitiveTopology::TriangleList,
                ::wgpu::BlendState::REPLACE,
                true,
            );
            // Billboards and stars are blended and leave depth untouched so
            // their draw order among themselves does not matter.
            let sprite_pipeline = create_pipeline(
                &device,
                "globe-sprite-pipeline",
                &textured_layout,
                &sprite_shader,
                textured_buffer(),
                format,
                ::wgpu::PrimitiveTopology::TriangleList,
                ::wgpu::BlendState::ALPHA_BLENDING,
                false,
            );
            let stars_pipeline = create_pipeline(
                &device,
                "globe-stars-pipeline",
                &stars_layout,
                &stars_shader,
                ::wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<StarVertex>() as ::wgpu::BufferAddress,
                    step_mode: ::wgpu::VertexStepMode::Vertex,
                    attributes: &STAR_ATTRIBUTES,
                },
                format,
                ::wgpu::PrimitiveTopology::PointList,
                ::wgpu::BlendState::ALPHA_BLENDING,
                false,
            );

            let white = RgbaImage {
                width: 1,
                height: 1,
                pixels: vec![255, 255, 255, 255],
            };
            let fallback_texture = create_texture_bind_group(
                &device,
                &queue,
                &texture_layout,
                &sampler,
                &white,
                "globe-fallback-texture",
            );

            let sprite_vertices = DynamicBuffer::new(&device, "globe-sprite-vertices", 4096);
            let star_vertices = DynamicBuffer::new(&device, "globe-star-vertices", 16 * 1024);

            Ok(Self {
                _instance: instance,
                surface,
                device,
                queue,
                config,
                depth_view,
                globals_buffer,
                globals_bind_group,
                texture_layout,
                sampler,
                globe_pipeline,
                sprite_pipeline,
                stars_pipeline,
                sphere: None,
                sprite_vertices,
                star_vertices,
                textures: HashMap::new(),
                fallback_texture,
            })
        }

        pub fn resize(&mut self, width: u32, height: u32) {
            self.config.width = width.max(1);
            self.config.height = height.max(1);
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, &self.config);
        }

        pub fn upload_texture(&mut self, id: TextureId, image: &RgbaImage) {
            let bind_group = create_texture_bind_group(
                &self.device,
                &self.queue,
                &self.texture_layout,
                &self.sampler,
                image,
                "globe-texture",
            );
            self.textures.insert(id, bind_group);
        }

        fn texture(&self, id: Option<TextureId>) -> &::wgpu::BindGroup {
            id.and_then(|id| self.textures.get(&id))
                .unwrap_or(&self.fallback_texture)
        }

        fn ensure_sphere(&mut self, radius: f64, segments: u32) {
            if let Some(mesh) = &self.sphere {
                if mesh.radius == radius && mesh.segments == segments {
                    return;
                }
            }
            let (vertices, indices) = uv_sphere(radius, segments);
            let vertices: Vec<TexturedVertex> = vertices
                .iter()
                .map(|v| TexturedVertex {
                    position: v.position,
                    uv: v.uv,
                })
                .collect();
            let vertex_buffer = self
                .device
                .create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                    label: Some("globe-sphere-vertices"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: ::wgpu::BufferUsages::VERTEX,
                });
            let index_buffer = self
                .device
                .create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                    label: Some("globe-sphere-indices"),
                    contents: bytemuck::cast_slice(&indices),
                    usage: ::wgpu::BufferUsages::INDEX,
                });
            self.sphere = Some(SphereMesh {
                radius,
                segments,
                vertex_buffer,
                index_buffer,
                index_count: indices.len() as u32,
            });
        }

        /// Draw one frame: the globe, then stars, then billboards.
        ///
        /// Only one sphere is drawn per frame; its model matrix lives in the
        /// shared globals block.
        pub fn render(&mut self, frame: &RenderFrame) -> Result<(), JsValue> {
            let mut sphere = None;
            let mut sprite_vertices = Vec::new();
            let mut sprite_draws = Vec::new();
            for command in &frame.commands {
                match *command {
                    RenderCommand::Sphere {
                        model,
                        radius,
                        segments,
                        texture,
                    } => {
                        if sphere.is_none() {
                            sphere = Some((model, radius, segments, texture));
                        } else {
                            debug!("extra sphere command skipped");
                        }
                    }
                    RenderCommand::Sprite {
                        center,
                        size,
                        texture,
                    } => {
                        let start = sprite_vertices.len() as u32;
                        sprite_vertices.extend(frame.sprite_corners(center, size).iter().map(
                            |(position, uv)| TexturedVertex {
                                position: *position,
                                uv: *uv,
                            },
                        ));
                        sprite_draws.push((start..start + 6, texture));
                    }
                }
            }

            let globals = Globals {
                view_proj: frame.view_proj.to_f32_cols(),
                model: sphere
                    .map(|(model, ..)| model.to_f32_cols())
                    .unwrap_or(foundation::math::Mat4::IDENTITY.to_f32_cols()),
            };
            self.queue
                .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

            if let Some((_, radius, segments, _)) = sphere {
                self.ensure_sphere(radius, segments);
            }
            self.sprite_vertices.write(
                &self.device,
                &self.queue,
                bytemuck::cast_slice(&sprite_vertices),
            );
            let stars: Vec<StarVertex> = frame
                .stars
                .iter()
                .map(|s| StarVertex {
                    position: s.position,
                    alpha: s.alpha,
                })
                .collect();
            self.star_vertices
                .write(&self.device, &self.queue, bytemuck::cast_slice(&stars));

            let output = self
                .surface
                .get_current_texture()
                .map_err(|e| JsValue::from_str(&format!("surface acquire failed: {e}")))?;
            let view = output
                .texture
                .create_view(&::wgpu::TextureViewDescriptor::default());

            let mut encoder = self
                .device
                .create_command_encoder(&::wgpu::CommandEncoderDescriptor {
                    label: Some("globe-frame-encoder"),
                });

            {
                let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
                    label: Some("globe-pass"),
                    color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        depth_slice: None,
                        ops: ::wgpu::Operations {
                            load: ::wgpu::LoadOp::Clear(CLEAR),
                            store: ::wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: Some(::wgpu::RenderPassDepthStencilAttachment {
                        view: &self.depth_view,
                        depth_ops: Some(::wgpu::Operations {
                            load: ::wgpu::LoadOp::Clear(1.0),
                            store: ::wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                    multiview_mask: None,
                });
                rpass.set_bind_group(0, &self.globals_bind_group, &[]);

                if let (Some((_, _, _, texture)), Some(mesh)) = (sphere, &self.sphere) {
                    rpass.set_pipeline(&self.globe_pipeline);
                    rpass.set_bind_group(1, self.texture(texture), &[]);
                    rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    rpass.set_index_buffer(mesh.index_buffer.slice(..), ::wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }

                if !stars.is_empty() {
                    rpass.set_pipeline(&self.stars_pipeline);
                    rpass.set_vertex_buffer(0, self.star_vertices.buffer.slice(..));
                    rpass.draw(0..stars.len() as u32, 0..1);
                }

                if !sprite_draws.is_empty() {
                    rpass.set_pipeline(&self.sprite_pipeline);
                    rpass.set_vertex_buffer(0, self.sprite_vertices.buffer.slice(..));
                    for (range, texture) in sprite_draws {
                        rpass.set_bind_group(1, self.texture(texture), &[]);
                        rpass.draw(range, 0..1);
                    }
                }
            }

            self.queue.submit(std::iter::once(encoder.finish()));
            output.present();
            Ok(())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use gpu::RenderFrame;
    use scene::components::TextureId;
    use wasm_bindgen::prelude::JsValue;

    use crate::textures::RgbaImage;

    #[derive(Debug, Default)]
    pub struct GpuContext;

    impl GpuContext {
        pub async fn new(_canvas: web_sys::HtmlCanvasElement) -> Result<Self, JsValue> {
            Err(JsValue::from_str(
                "wgpu initialization is only available on wasm32 targets",
            ))
        }

        pub fn resize(&mut self, _width: u32, _height: u32) {}

        pub fn upload_texture(&mut self, _id: TextureId, _image: &RgbaImage) {}

        pub fn render(&mut self, _frame: &RenderFrame) -> Result<(), JsValue> {
            Err(JsValue::from_str(
                "wgpu rendering is only available on wasm32 targets",
            ))
        }
    }
}

pub use imp::GpuContext;
