#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ShapeKind {
    #[default]
    Box,
    Circle,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Topology {
    TriangleList,
    /// Vertex 0 is the hub shared by every triangle.
    TriangleFan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<nalgebra_glm::Vec2>,
    pub topology: Topology,
}

impl Geometry {
    pub fn quad(half_extent: f32) -> Self {
        let h = half_extent;
        Self {
            vertices: vec![
                nalgebra_glm::vec2(-h, -h),
                nalgebra_glm::vec2(h, -h),
                nalgebra_glm::vec2(h, h),
                nalgebra_glm::vec2(-h, -h),
                nalgebra_glm::vec2(h, h),
                nalgebra_glm::vec2(-h, h),
            ],
            topology: Topology::TriangleList,
        }
    }

    /// Center vertex followed by `segments + 1` rim vertices, the last one closing the loop.
    pub fn circle(radius: f32, segments: usize) -> Self {
        let segments = segments.max(3);
        let mut vertices = Vec::with_capacity(segments + 2);
        vertices.push(nalgebra_glm::vec2(0.0, 0.0));
        vertices.extend((0..=segments).map(|segment| {
            let angle = segment as f32 / segments as f32 * std::f32::consts::TAU;
            nalgebra_glm::vec2(radius * angle.cos(), radius * angle.sin())
        }));
        Self {
            vertices,
            topology: Topology::TriangleFan,
        }
    }

    pub fn triangle_list_indices(&self) -> Vec<u32> {
        let count = self.vertices.len() as u32;
        match self.topology {
            Topology::TriangleList => (0..count).collect(),
            Topology::TriangleFan => (1..count.saturating_sub(1))
                .flat_map(|rim| [0, rim, rim + 1])
                .collect(),
        }
    }
}

/// Identifies geometry owned by a [`GeometryStore`]. Not `Clone`: releasing consumes it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct GeometryHandle(u64);

impl GeometryHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

pub trait GeometryStore {
    fn upload(&mut self, geometry: &Geometry) -> GeometryHandle;
    fn release(&mut self, handle: GeometryHandle);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct BodyHandle(usize);

impl BodyHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct SimBody {
    physics: crate::physics::PhysicsBody,
    geometry: GeometryHandle,
    shape: ShapeKind,
    half_extent: f32,
    color: nalgebra_glm::Vec3,
    vertex_count: usize,
}

impl SimBody {
    pub fn physics(&self) -> &crate::physics::PhysicsBody {
        &self.physics
    }

    pub fn geometry(&self) -> &GeometryHandle {
        &self.geometry
    }

    pub fn shape(&self) -> ShapeKind {
        self.shape
    }

    pub fn half_extent(&self) -> f32 {
        self.half_extent
    }

    pub fn color(&self) -> nalgebra_glm::Vec3 {
        self.color
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    fn destroy(
        self,
        physics: &mut crate::physics::PhysicsWorld,
        store: &mut impl GeometryStore,
    ) {
        physics.remove_body(self.physics);
        store.release(self.geometry);
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BodyDraw<'a> {
    pub geometry: &'a GeometryHandle,
    pub position: nalgebra_glm::Vec2,
    pub angle: f32,
    pub shape: ShapeKind,
    pub color: nalgebra_glm::Vec3,
}

pub struct Bodies {
    bodies: Vec<SimBody>,
    circle_segments: usize,
}

impl Bodies {
    pub fn new(circle_segments: usize) -> Self {
        Self {
            bodies: Vec::new(),
            circle_segments,
        }
    }

    pub fn spawn(
        &mut self,
        physics: &mut crate::physics::PhysicsWorld,
        store: &mut impl GeometryStore,
        shape: ShapeKind,
        position: nalgebra_glm::Vec2,
        half_extent: f32,
        color: nalgebra_glm::Vec3,
    ) -> BodyHandle {
        let (collider, geometry) = match shape {
            ShapeKind::Box => (
                crate::physics::ColliderShape::Cuboid { half_extent },
                Geometry::quad(half_extent),
            ),
            ShapeKind::Circle => (
                crate::physics::ColliderShape::Ball {
                    radius: half_extent,
                },
                Geometry::circle(half_extent, self.circle_segments),
            ),
        };

        let physics_body = physics.add_dynamic_body(position, collider);
        let geometry_handle = store.upload(&geometry);

        let handle = BodyHandle(self.bodies.len());
        self.bodies.push(SimBody {
            physics: physics_body,
            geometry: geometry_handle,
            shape,
            half_extent,
            color,
            vertex_count: geometry.vertices.len(),
        });
        log::info!(
            "Spawned {shape:?} #{} at ({}, {}) with half extent {half_extent}",
            handle.0,
            position.x,
            position.y
        );
        handle
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&SimBody> {
        self.bodies.get(handle.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimBody> {
        self.bodies.iter()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn draws<'a>(
        &'a self,
        physics: &'a crate::physics::PhysicsWorld,
    ) -> impl Iterator<Item = BodyDraw<'a>> + 'a {
        self.bodies.iter().filter_map(move |body| {
            let state = physics.body_state(&body.physics)?;
            Some(BodyDraw {
                geometry: &body.geometry,
                position: state.position,
                angle: state.angle,
                shape: body.shape,
                color: body.color,
            })
        })
    }

    pub fn teardown(
        &mut self,
        physics: &mut crate::physics::PhysicsWorld,
        store: &mut impl GeometryStore,
    ) -> usize {
        let count = self.bodies.len();
        self.bodies
            .drain(..)
            .for_each(|body| body.destroy(physics, store));
        log::info!("Tore down {count} bodies");
        count
    }
}
