//! Draws the live bodies of the simulation as flat colored shapes over the scene.

struct BodyMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

pub struct Canvas {
    meshes: std::collections::HashMap<u64, BodyMesh>,
    next_geometry_id: u64,
    frame: Vec<u64>,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    bodies: crate::gpu::DynamicUniform<BodyUniform>,
    pipeline: wgpu::RenderPipeline,
}

impl Canvas {
    pub fn new(gpu: &crate::gpu::Gpu) -> Self {
        let uniform_buffer = wgpu::util::DeviceExt::create_buffer_init(
            &gpu.device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Canvas Uniform Buffer"),
                contents: bytemuck::cast_slice(&[CanvasUniform::default()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        let uniform_bind_group_layout =
            gpu.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    }],
                    label: Some("canvas_uniform_bind_group_layout"),
                });

        let uniform_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("canvas_uniform_bind_group"),
        });

        let bodies = crate::gpu::DynamicUniform::new(
            gpu,
            "canvas_body_uniform",
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            64,
        );

        let pipeline = create_pipeline(gpu, &[&uniform_bind_group_layout, bodies.layout()]);

        Self {
            meshes: std::collections::HashMap::new(),
            next_geometry_id: 0,
            frame: Vec::new(),
            uniform_buffer,
            uniform_bind_group,
            bodies,
            pipeline,
        }
    }

    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        geometry: &crate::bodies::Geometry,
    ) -> crate::bodies::GeometryHandle {
        let vertices = geometry
            .vertices
            .iter()
            .map(|vertex| [vertex.x, vertex.y])
            .collect::<Vec<_>>();
        let indices = geometry.triangle_list_indices();

        let vertex_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Body Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );
        let index_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Body Index Buffer"),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            },
        );

        let id = self.next_geometry_id;
        self.next_geometry_id += 1;
        self.meshes.insert(
            id,
            BodyMesh {
                vertex_buffer,
                index_buffer,
                index_count: indices.len() as u32,
            },
        );
        crate::bodies::GeometryHandle::new(id)
    }

    pub fn release(&mut self, handle: crate::bodies::GeometryHandle) {
        match self.meshes.remove(&handle.id()) {
            Some(mesh) => {
                mesh.vertex_buffer.destroy();
                mesh.index_buffer.destroy();
            }
            None => log::warn!("Released unknown body geometry {}", handle.id()),
        }
    }

    /// Writes this frame's projection and per-body uniforms. Must run before [`Canvas::render`].
    pub fn prepare(
        &mut self,
        gpu: &crate::gpu::Gpu,
        draws: &[crate::bodies::BodyDraw<'_>],
        world_size: &nalgebra_glm::Vec2,
    ) {
        let half = world_size / 2.0;
        let projection = nalgebra_glm::ortho_rh_zo(-half.x, half.x, -half.y, half.y, -1.0, 1.0);
        gpu.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[CanvasUniform { projection }]),
        );

        let (ids, uniforms): (Vec<_>, Vec<_>) = draws
            .iter()
            .filter(|draw| self.meshes.contains_key(&draw.geometry.id()))
            .map(|draw| {
                let model = nalgebra_glm::translation(&nalgebra_glm::vec3(
                    draw.position.x,
                    draw.position.y,
                    0.0,
                )) * nalgebra_glm::rotation(draw.angle, &nalgebra_glm::Vec3::z());
                (
                    draw.geometry.id(),
                    BodyUniform {
                        model,
                        color: nalgebra_glm::vec4(draw.color.x, draw.color.y, draw.color.z, 1.0),
                    },
                )
            })
            .unzip();
        self.bodies.write(gpu, &uniforms);
        self.frame = ids;
    }

    pub fn render<'rpass>(&'rpass self, render_pass: &mut wgpu::RenderPass<'rpass>) {
        if self.frame.is_empty() {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        for (index, id) in self.frame.iter().enumerate() {
            let Some(mesh) = self.meshes.get(id) else {
                continue;
            };
            render_pass.set_bind_group(1, self.bodies.bind_group(), &[self.bodies.offset(index)]);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct CanvasUniform {
    projection: nalgebra_glm::Mat4,
}

impl Default for CanvasUniform {
    fn default() -> Self {
        Self {
            projection: nalgebra_glm::Mat4::identity(),
        }
    }
}

#[repr(C)]
#[derive(Default, Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct BodyUniform {
    model: nalgebra_glm::Mat4,
    color: nalgebra_glm::Vec4,
}

fn create_pipeline(
    gpu: &crate::gpu::Gpu,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::RenderPipeline {
    let shader_module = gpu
        .device
        .create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("canvas_shader"),
            source: wgpu::ShaderSource::Wgsl(std::borrow::Cow::Borrowed(SHADER_SOURCE)),
        });

    let pipeline_layout = gpu
        .device
        .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("canvas_pipeline_layout"),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

    gpu.device
        .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("canvas_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: "vertex_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                }],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
                unclipped_depth: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: "fragment_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
        })
}

const SHADER_SOURCE: &str = "
struct Canvas {
    projection: mat4x4<f32>,
};

struct Body {
    model: mat4x4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> canvas: Canvas;

@group(1) @binding(0)
var<uniform> body: Body;

@vertex
fn vertex_main(@location(0) position: vec2<f32>) -> @builtin(position) vec4<f32> {
    return canvas.projection * body.model * vec4<f32>(position, 0.0, 1.0);
}

@fragment
fn fragment_main() -> @location(0) vec4<f32> {
    return body.color;
}
";
