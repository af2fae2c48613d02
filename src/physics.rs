use rapier2d::prelude::*;

fn to_rapier(vector: &nalgebra_glm::Vec2) -> Vector<Real> {
    vector![vector.x, vector.y]
}

fn from_rapier(vector: &Vector<Real>) -> nalgebra_glm::Vec2 {
    nalgebra_glm::vec2(vector.x, vector.y)
}

#[derive(Debug, Copy, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ColliderShape {
    Cuboid { half_extent: f32 },
    Ball { radius: f32 },
}

#[derive(Debug, PartialEq, Eq)]
pub struct PhysicsBody {
    body_handle: RigidBodyHandle,
    collider_handle: ColliderHandle,
}

#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub struct BodyState {
    pub position: nalgebra_glm::Vec2,
    pub angle: f32,
    pub velocity: nalgebra_glm::Vec2,
    pub mass: f32,
    /// Force accumulated for the next step.
    pub force: nalgebra_glm::Vec2,
    pub dynamic: bool,
}

pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    density: f32,
    friction: f32,
}

impl PhysicsWorld {
    pub fn new(settings: &crate::settings::PhysicsSettings) -> Self {
        let mut integration_parameters = IntegrationParameters {
            dt: settings.timestep,
            ..Default::default()
        };
        integration_parameters.num_solver_iterations =
            std::num::NonZeroUsize::new(settings.velocity_iterations)
                .unwrap_or(std::num::NonZeroUsize::MIN);
        integration_parameters.num_internal_stabilization_iterations =
            settings.position_iterations;

        Self {
            gravity: to_rapier(&settings.gravity),
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            density: settings.density,
            friction: settings.friction,
        }
    }

    pub fn add_ground(&mut self, center: nalgebra_glm::Vec2, half_width: f32, half_height: f32) {
        let ground = RigidBodyBuilder::fixed()
            .translation(to_rapier(&center))
            .build();
        let ground_handle = self.bodies.insert(ground);
        let collider = ColliderBuilder::cuboid(half_width, half_height).build();
        self.colliders
            .insert_with_parent(collider, ground_handle, &mut self.bodies);
        log::info!(
            "Added ground at ({}, {}) with half extents ({half_width}, {half_height})",
            center.x,
            center.y
        );
    }

    pub fn add_dynamic_body(
        &mut self,
        position: nalgebra_glm::Vec2,
        shape: ColliderShape,
    ) -> PhysicsBody {
        let rigid_body = RigidBodyBuilder::dynamic()
            .translation(to_rapier(&position))
            .linvel(vector![0.0, 0.0])
            .build();
        let body_handle = self.bodies.insert(rigid_body);

        let builder = match shape {
            ColliderShape::Cuboid { half_extent } => {
                ColliderBuilder::cuboid(half_extent, half_extent)
            }
            ColliderShape::Ball { radius } => ColliderBuilder::ball(radius),
        };
        let collider = builder.density(self.density).friction(self.friction).build();
        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);

        PhysicsBody {
            body_handle,
            collider_handle,
        }
    }

    pub fn remove_body(&mut self, body: PhysicsBody) {
        self.bodies.remove(
            body.body_handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Advances the world by one fixed timestep, then clears every force accumulator
    /// so that a force added between two steps is integrated exactly once.
    pub fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
        self.bodies
            .iter_mut()
            .for_each(|(_, rigid_body)| rigid_body.reset_forces(false));
    }

    pub fn apply_force(&mut self, body: &PhysicsBody, force: nalgebra_glm::Vec2) {
        if let Some(rigid_body) = self.bodies.get_mut(body.body_handle) {
            rigid_body.add_force(to_rapier(&force), true);
        }
    }

    pub fn body_state(&self, body: &PhysicsBody) -> Option<BodyState> {
        let rigid_body = self.bodies.get(body.body_handle)?;
        Some(BodyState {
            position: from_rapier(rigid_body.translation()),
            angle: rigid_body.rotation().angle(),
            velocity: from_rapier(rigid_body.linvel()),
            mass: rigid_body.mass(),
            force: from_rapier(&rigid_body.user_force()),
            dynamic: rigid_body.is_dynamic(),
        })
    }

    pub fn collider_shape(&self, body: &PhysicsBody) -> Option<ColliderShape> {
        let shape = self.colliders.get(body.collider_handle)?.shape();
        if let Some(ball) = shape.as_ball() {
            Some(ColliderShape::Ball {
                radius: ball.radius,
            })
        } else {
            shape.as_cuboid().map(|cuboid| ColliderShape::Cuboid {
                half_extent: cuboid.half_extents.x,
            })
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn timestep(&self) -> f32 {
        self.integration_parameters.dt
    }
}
