use crate::scene::{LightKind, PrimitiveKind, RenderShapeEntry, Scene};
use crate::tessellate::Vertex3d;

pub const MAX_LIGHTS: usize = 8;

struct PrimitiveMesh {
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

#[derive(Debug, Copy, Clone)]
pub struct ShapeDraw {
    pub entry: RenderShapeEntry,
    pub mesh: PrimitiveKind,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Tessellation {
    pub parameter_1: u32,
    pub parameter_2: u32,
}

pub struct SceneView {
    meshes: std::collections::HashMap<PrimitiveKind, PrimitiveMesh>,
    shapes: Vec<ShapeDraw>,
    lights: Vec<LightUniform>,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    shape_uniforms: crate::gpu::DynamicUniform<ShapeUniform>,
    pipeline: wgpu::RenderPipeline,
}

impl SceneView {
    pub fn new(gpu: &crate::gpu::Gpu, tessellation: Tessellation) -> Self {
        let uniform_buffer = wgpu::util::DeviceExt::create_buffer_init(
            &gpu.device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Scene Uniform Buffer"),
                contents: bytemuck::cast_slice(&[SceneUniform::default()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        let uniform_bind_group_layout =
            gpu.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    }],
                    label: Some("scene_uniform_bind_group_layout"),
                });

        let uniform_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("scene_uniform_bind_group"),
        });

        let shape_uniforms = crate::gpu::DynamicUniform::new(
            gpu,
            "scene_shape_uniform",
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            64,
        );

        let pipeline = create_pipeline(gpu, &[&uniform_bind_group_layout, shape_uniforms.layout()]);

        let meshes = [
            PrimitiveKind::Cube,
            PrimitiveKind::Sphere,
            PrimitiveKind::Cylinder,
            PrimitiveKind::Cone,
        ]
        .into_iter()
        .map(|kind| (kind, create_mesh(&gpu.device, kind, tessellation)))
        .collect();

        Self {
            meshes,
            shapes: Vec::new(),
            lights: Vec::new(),
            uniform_buffer,
            uniform_bind_group,
            shape_uniforms,
            pipeline,
        }
    }

    pub fn load_scene(&mut self, gpu: &crate::gpu::Gpu, scene: &Scene) {
        self.shapes = scene
            .flatten()
            .into_iter()
            .map(|entry| ShapeDraw {
                mesh: entry.primitive.kind,
                entry,
            })
            .collect();

        if scene.lights.len() > MAX_LIGHTS {
            log::warn!(
                "Scene has {} lights, only the first {MAX_LIGHTS} are used",
                scene.lights.len()
            );
        }
        self.lights = scene
            .lights
            .iter()
            .take(MAX_LIGHTS)
            .map(LightUniform::from)
            .collect();

        let uniforms = self
            .shapes
            .iter()
            .map(|shape| ShapeUniform::from(&shape.entry))
            .collect::<Vec<_>>();
        self.shape_uniforms.write(gpu, &uniforms);
        log::info!("Scene view holds {} shapes", self.shapes.len());
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.lights.clear();
        log::info!("Scene view cleared");
    }

    pub fn prepare(&self, gpu: &crate::gpu::Gpu, camera: &crate::camera::Camera) {
        let mut uniform = SceneUniform {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(gpu.aspect_ratio()),
            camera_position: nalgebra_glm::vec3_to_vec4(&camera.position),
            light_count: self.lights.len() as u32,
            ..Default::default()
        };
        uniform.lights[..self.lights.len()].copy_from_slice(&self.lights);
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    pub fn render<'rpass>(&'rpass self, render_pass: &mut wgpu::RenderPass<'rpass>) {
        if self.shapes.is_empty() {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        for (index, shape) in self.shapes.iter().enumerate() {
            let Some(mesh) = self.meshes.get(&shape.mesh) else {
                continue;
            };
            render_pass.set_bind_group(
                1,
                self.shape_uniforms.bind_group(),
                &[self.shape_uniforms.offset(index)],
            );
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.draw(0..mesh.vertex_count, 0..1);
        }
    }
}

fn create_mesh(device: &wgpu::Device, kind: PrimitiveKind, tessellation: Tessellation) -> PrimitiveMesh {
    let vertices =
        crate::tessellate::tessellate(kind, tessellation.parameter_1, tessellation.parameter_2);
    let vertex_buffer = wgpu::util::DeviceExt::create_buffer_init(
        device,
        &wgpu::util::BufferInitDescriptor {
            label: Some("Primitive Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        },
    );
    PrimitiveMesh {
        vertex_buffer,
        vertex_count: vertices.len() as u32,
    }
}

#[repr(C)]
#[derive(Default, Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct LightUniform {
    color: nalgebra_glm::Vec4,
    position: nalgebra_glm::Vec4,
    direction: nalgebra_glm::Vec4,
    attenuation: nalgebra_glm::Vec4,
    kind: u32,
    angle: f32,
    penumbra: f32,
    _padding: f32,
}

impl From<&crate::scene::Light> for LightUniform {
    fn from(light: &crate::scene::Light) -> Self {
        Self {
            color: nalgebra_glm::vec3_to_vec4(&light.color),
            position: nalgebra_glm::vec3_to_vec4(&light.position),
            direction: nalgebra_glm::vec3_to_vec4(&light.direction),
            attenuation: nalgebra_glm::vec3_to_vec4(&light.attenuation),
            kind: match light.kind {
                LightKind::Directional => 0,
                LightKind::Point => 1,
                LightKind::Spot => 2,
            },
            angle: light.angle,
            penumbra: light.penumbra,
            _padding: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Default, Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SceneUniform {
    view: nalgebra_glm::Mat4,
    projection: nalgebra_glm::Mat4,
    camera_position: nalgebra_glm::Vec4,
    lights: [LightUniform; MAX_LIGHTS],
    light_count: u32,
    _padding: [u32; 3],
}

#[repr(C)]
#[derive(Default, Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ShapeUniform {
    model: nalgebra_glm::Mat4,
    normal: nalgebra_glm::Mat4,
    ambient: nalgebra_glm::Vec4,
    diffuse: nalgebra_glm::Vec4,
    /// Shininess in `w`.
    specular: nalgebra_glm::Vec4,
}

impl From<&RenderShapeEntry> for ShapeUniform {
    fn from(entry: &RenderShapeEntry) -> Self {
        let material = &entry.material;
        Self {
            model: entry.transform,
            normal: nalgebra_glm::transpose(&nalgebra_glm::inverse(&entry.transform)),
            ambient: nalgebra_glm::vec3_to_vec4(&material.ambient),
            diffuse: nalgebra_glm::vec3_to_vec4(&material.diffuse),
            specular: nalgebra_glm::vec4(
                material.specular.x,
                material.specular.y,
                material.specular.z,
                material.shininess,
            ),
        }
    }
}

fn create_pipeline(
    gpu: &crate::gpu::Gpu,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::RenderPipeline {
    let shader_module = gpu
        .device
        .create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(std::borrow::Cow::Borrowed(SHADER_SOURCE)),
        });

    let pipeline_layout = gpu
        .device
        .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

    gpu.device
        .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: "vertex_main",
                buffers: &[Vertex3d::description(&Vertex3d::attributes())],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
                unclipped_depth: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: crate::gpu::Gpu::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
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
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
        })
}

impl Vertex3d {
    pub fn attributes() -> Vec<wgpu::VertexAttribute> {
        wgpu::vertex_attr_array![
            0 => Float32x3, // position
            1 => Float32x3, // normal
        ]
        .to_vec()
    }

    pub fn description(attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex3d>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }
}

const SHADER_SOURCE: &str = "
const MAX_LIGHTS: u32 = 8u;
const DIRECTIONAL: u32 = 0u;
const POINT: u32 = 1u;
const SPOT: u32 = 2u;

struct Light {
    color: vec4<f32>,
    position: vec4<f32>,
    direction: vec4<f32>,
    attenuation: vec4<f32>,
    kind: u32,
    angle: f32,
    penumbra: f32,
    padding: f32,
};

struct Scene {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    camera_position: vec4<f32>,
    lights: array<Light, 8>,
    light_count: u32,
};

struct Shape {
    model: mat4x4<f32>,
    normal: mat4x4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> scene: Scene;

@group(1) @binding(0)
var<uniform> shape: Shape;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
};

@vertex
fn vertex_main(vert: VertexInput) -> VertexOutput {
    let world_position = shape.model * vec4<f32>(vert.position, 1.0);
    var out: VertexOutput;
    out.world_position = world_position.xyz;
    out.world_normal = (shape.normal * vec4<f32>(vert.normal, 0.0)).xyz;
    out.position = scene.projection * scene.view * world_position;
    return out;
}

fn spot_intensity(light: Light, to_light: vec3<f32>) -> f32 {
    let x = acos(clamp(dot(-to_light, normalize(light.direction.xyz)), -1.0, 1.0));
    let outer = light.angle;
    let inner = outer - light.penumbra;
    if (x <= inner) {
        return 1.0;
    }
    if (x > outer) {
        return 0.0;
    }
    let t = (x - inner) / max(outer - inner, 0.0001);
    return 1.0 - (-2.0 * t * t * t + 3.0 * t * t);
}

@fragment
fn fragment_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(in.world_normal);
    let to_camera = normalize(scene.camera_position.xyz - in.world_position);
    var color = shape.ambient.xyz;

    for (var index = 0u; index < min(scene.light_count, MAX_LIGHTS); index = index + 1u) {
        let light = scene.lights[index];
        var to_light = normalize(-light.direction.xyz);
        var intensity = 1.0;
        if (light.kind != DIRECTIONAL) {
            let offset = light.position.xyz - in.world_position;
            let light_distance = length(offset);
            to_light = offset / max(light_distance, 0.0001);
            let falloff = light.attenuation.x
                + light.attenuation.y * light_distance
                + light.attenuation.z * light_distance * light_distance;
            intensity = min(1.0, 1.0 / max(falloff, 0.0001));
            if (light.kind == SPOT) {
                intensity = intensity * spot_intensity(light, to_light);
            }
        }

        let diffuse = shape.diffuse.xyz * max(dot(normal, to_light), 0.0);
        let reflected = reflect(-to_light, normal);
        let highlight = pow(max(dot(reflected, to_camera), 0.0), max(shape.specular.w, 0.0001));
        let specular = shape.specular.xyz * highlight;
        color = color + intensity * light.color.xyz * (diffuse + specular);
    }

    return vec4<f32>(clamp(color, vec3<f32>(0.0), vec3<f32>(1.0)), 1.0);
}
";
