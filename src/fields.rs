pub fn gravity_force(
    center: &nalgebra_glm::Vec2,
    position: &nalgebra_glm::Vec2,
    mass: f32,
    settings: &crate::settings::FieldSettings,
) -> Option<nalgebra_glm::Vec2> {
    let direction = center - position;
    let distance_squared = direction.norm_squared();
    if distance_squared <= settings.singularity_epsilon {
        return None;
    }
    let normalized = direction / distance_squared.sqrt();
    Some(normalized * (settings.gravity_strength * mass * settings.gravity_multiplier))
}

pub fn explosion_force(
    center: &nalgebra_glm::Vec2,
    position: &nalgebra_glm::Vec2,
    settings: &crate::settings::FieldSettings,
) -> Option<nalgebra_glm::Vec2> {
    let direction = position - center;
    let distance_squared = direction.norm_squared();
    if distance_squared <= settings.singularity_epsilon
        || distance_squared >= settings.explosion_range_squared
    {
        return None;
    }
    let distance = distance_squared.sqrt();
    Some(direction / distance * (settings.explosion_strength / distance))
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct FieldReport {
    pub gravity: usize,
    pub explosion: usize,
}

#[derive(Debug, Clone)]
pub struct ForceFieldState {
    gravity_center: Option<nalgebra_glm::Vec2>,
    explosion_center: Option<nalgebra_glm::Vec2>,
    settings: crate::settings::FieldSettings,
}

impl ForceFieldState {
    pub fn new(settings: crate::settings::FieldSettings) -> Self {
        Self {
            gravity_center: None,
            explosion_center: None,
            settings,
        }
    }

    pub fn gravity_center(&self) -> Option<nalgebra_glm::Vec2> {
        self.gravity_center
    }

    pub fn gravity_active(&self) -> bool {
        self.gravity_center.is_some()
    }

    pub fn set_gravity_center(&mut self, center: nalgebra_glm::Vec2) {
        log::info!("Gravity center set to ({}, {})", center.x, center.y);
        self.gravity_center = Some(center);
    }

    pub fn clear_gravity(&mut self) {
        if self.gravity_center.take().is_some() {
            log::info!("Gravity center cleared");
        }
    }

    pub fn explosion_center(&self) -> Option<nalgebra_glm::Vec2> {
        self.explosion_center
    }

    pub fn explosion_armed(&self) -> bool {
        self.explosion_center.is_some()
    }

    pub fn arm_explosion(&mut self, center: nalgebra_glm::Vec2) {
        log::info!("Explosion armed at ({}, {})", center.x, center.y);
        self.explosion_center = Some(center);
    }

    /// Runs one field pass over every live dynamic body. The explosion is
    /// disarmed afterwards even when no body was in range.
    pub fn apply(
        &mut self,
        physics: &mut crate::physics::PhysicsWorld,
        bodies: &crate::bodies::Bodies,
    ) -> FieldReport {
        let mut report = FieldReport::default();
        let explosion_center = self.explosion_center.take();
        if self.gravity_center.is_none() && explosion_center.is_none() {
            return report;
        }

        for body in bodies.iter() {
            let Some(state) = physics.body_state(body.physics()) else {
                continue;
            };
            if !state.dynamic {
                continue;
            }

            if let Some(force) = self
                .gravity_center
                .and_then(|center| gravity_force(&center, &state.position, state.mass, &self.settings))
            {
                physics.apply_force(body.physics(), force);
                report.gravity += 1;
            }

            if let Some(force) = explosion_center
                .and_then(|center| explosion_force(&center, &state.position, &self.settings))
            {
                physics.apply_force(body.physics(), force);
                report.explosion += 1;
            }
        }

        if explosion_center.is_some() {
            log::info!("Explosion pushed {} bodies", report.explosion);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> crate::settings::FieldSettings {
        crate::settings::FieldSettings::default()
    }

    #[test]
    fn gravity_points_at_center_scaled_by_mass() {
        let force = gravity_force(
            &nalgebra_glm::vec2(0.0, 5.0),
            &nalgebra_glm::vec2(0.0, 0.0),
            2.0,
            &settings(),
        )
        .unwrap();
        assert!(force.x.abs() < 1e-6);
        assert!((force.y - 9.8 * 2.0 * 2.0).abs() < 1e-4);
    }

    #[test]
    fn gravity_magnitude_ignores_distance() {
        let near = gravity_force(
            &nalgebra_glm::vec2(1.0, 0.0),
            &nalgebra_glm::vec2(0.0, 0.0),
            1.0,
            &settings(),
        )
        .unwrap();
        let far = gravity_force(
            &nalgebra_glm::vec2(100.0, 0.0),
            &nalgebra_glm::vec2(0.0, 0.0),
            1.0,
            &settings(),
        )
        .unwrap();
        assert!((near.norm() - far.norm()).abs() < 1e-4);
    }

    #[test]
    fn gravity_skips_bodies_on_the_center() {
        let center = nalgebra_glm::vec2(3.0, 3.0);
        assert_eq!(gravity_force(&center, &center, 1.0, &settings()), None);
        assert_eq!(
            gravity_force(&center, &nalgebra_glm::vec2(3.005, 3.0), 1.0, &settings()),
            None
        );
    }

    #[test]
    fn singularity_guard_includes_its_boundary() {
        let settings = crate::settings::FieldSettings {
            singularity_epsilon: 0.25,
            ..settings()
        };
        let center = nalgebra_glm::vec2(0.0, 0.0);
        let on_boundary = nalgebra_glm::vec2(0.5, 0.0);
        let just_outside = nalgebra_glm::vec2(0.5, 0.001);

        assert_eq!(gravity_force(&center, &on_boundary, 1.0, &settings), None);
        assert!(gravity_force(&center, &just_outside, 1.0, &settings).is_some());

        assert_eq!(explosion_force(&center, &on_boundary, &settings), None);
        assert!(explosion_force(&center, &just_outside, &settings).is_some());
    }

    #[test]
    fn explosion_points_outward_with_linear_falloff() {
        let center = nalgebra_glm::vec2(0.0, 0.0);
        let one = explosion_force(&center, &nalgebra_glm::vec2(1.0, 0.0), &settings()).unwrap();
        let two = explosion_force(&center, &nalgebra_glm::vec2(-2.0, 0.0), &settings()).unwrap();
        assert!((one.x - 200.0).abs() < 1e-3);
        assert!((two.x + 100.0).abs() < 1e-3);
        assert!(one.y.abs() < 1e-6 && two.y.abs() < 1e-6);
    }

    #[test]
    fn explosion_has_a_finite_range() {
        let center = nalgebra_glm::vec2(0.0, 0.0);
        assert_eq!(
            explosion_force(&center, &nalgebra_glm::vec2(3.0, 1.0), &settings()),
            None
        );
        assert_eq!(
            explosion_force(&center, &nalgebra_glm::vec2(4.0, 0.0), &settings()),
            None
        );
        assert_eq!(explosion_force(&center, &center, &settings()), None);
        assert!(explosion_force(&center, &nalgebra_glm::vec2(3.0, 0.0), &settings()).is_some());
    }

    #[test]
    fn explosion_disarms_even_without_bodies() {
        let mut physics =
            crate::physics::PhysicsWorld::new(&crate::settings::PhysicsSettings::default());
        let bodies = crate::bodies::Bodies::new(24);
        let mut fields = ForceFieldState::new(settings());
        fields.arm_explosion(nalgebra_glm::vec2(0.0, 0.0));
        assert!(fields.explosion_armed());
        assert_eq!(fields.explosion_center(), Some(nalgebra_glm::vec2(0.0, 0.0)));
        assert_eq!(fields.apply(&mut physics, &bodies), FieldReport::default());
        assert!(!fields.explosion_armed());
        assert_eq!(fields.explosion_center(), None);
    }

    #[test]
    fn field_pass_applies_forces_to_live_bodies() {
        let mut physics = crate::physics::PhysicsWorld::new(&crate::settings::PhysicsSettings {
            gravity: nalgebra_glm::vec2(0.0, 0.0),
            ..Default::default()
        });
        let mut store = crate::bodies::tests::CountingStore::default();
        let mut bodies = crate::bodies::Bodies::new(24);
        let centered = bodies.spawn(
            &mut physics,
            &mut store,
            crate::bodies::ShapeKind::Circle,
            nalgebra_glm::vec2(0.0, 5.0),
            0.2,
            nalgebra_glm::vec3(1.0, 1.0, 1.0),
        );
        let below = bodies.spawn(
            &mut physics,
            &mut store,
            crate::bodies::ShapeKind::Box,
            nalgebra_glm::vec2(0.0, 0.0),
            0.2,
            nalgebra_glm::vec3(1.0, 1.0, 1.0),
        );
        physics.step();

        let mut fields = ForceFieldState::new(settings());
        fields.set_gravity_center(nalgebra_glm::vec2(0.0, 5.0));
        fields.arm_explosion(nalgebra_glm::vec2(1.0, 0.0));
        let report = fields.apply(&mut physics, &bodies);
        assert_eq!(report, FieldReport { gravity: 1, explosion: 1 });

        let centered = physics
            .body_state(bodies.get(centered).unwrap().physics())
            .unwrap();
        assert_eq!(centered.force, nalgebra_glm::vec2(0.0, 0.0));

        let below = physics
            .body_state(bodies.get(below).unwrap().physics())
            .unwrap();
        assert!(below.force.y > 0.0);
        assert!(below.force.x < 0.0);

        assert!(!fields.explosion_armed());
        assert!(fields.gravity_active());
    }
}
