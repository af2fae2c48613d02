/// Maps a window position in pixels to world coordinates, with +Y pointing up
/// and the origin at the center of the window.
pub fn screen_to_world(
    screen_position: &nalgebra_glm::Vec2,
    screen_size: &nalgebra_glm::Vec2,
    world_size: &nalgebra_glm::Vec2,
) -> nalgebra_glm::Vec2 {
    let x_ratio = screen_position.x / screen_size.x.max(1.0);
    let y_ratio = screen_position.y / screen_size.y.max(1.0);
    nalgebra_glm::vec2(
        (x_ratio - 0.5) * world_size.x,
        (0.5 - y_ratio) * world_size.y,
    )
}

pub struct Simulation {
    physics: crate::physics::PhysicsWorld,
    bodies: crate::bodies::Bodies,
    fields: crate::fields::ForceFieldState,
    mode: crate::interaction::InteractionMode,
    brush: crate::interaction::Brush,
    world_size: nalgebra_glm::Vec2,
    frame_dirty: bool,
}

impl Simulation {
    pub fn new(settings: &crate::settings::Settings, aspect_ratio: f32) -> Self {
        let world_width = settings.physics.world_width;
        let world_height = world_width / aspect_ratio.max(f32::EPSILON);

        let mut physics = crate::physics::PhysicsWorld::new(&settings.physics);
        let ground_half_height = settings.physics.ground_half_height;
        physics.add_ground(
            nalgebra_glm::vec2(0.0, -world_height / 2.0 + ground_half_height),
            world_width,
            ground_half_height,
        );

        Self {
            physics,
            bodies: crate::bodies::Bodies::new(settings.physics.circle_segments),
            fields: crate::fields::ForceFieldState::new(settings.fields.clone()),
            mode: crate::interaction::InteractionMode::Idle,
            brush: crate::interaction::Brush::new(&settings.brush),
            world_size: nalgebra_glm::vec2(world_width, world_height),
            frame_dirty: true,
        }
    }

    /// Keeps the world width fixed and derives the height from the new aspect ratio.
    /// The ground stays where it was created.
    pub fn resize(&mut self, aspect_ratio: f32) {
        self.world_size.y = self.world_size.x / aspect_ratio.max(f32::EPSILON);
        self.frame_dirty = true;
    }

    pub fn world_size(&self) -> nalgebra_glm::Vec2 {
        self.world_size
    }

    pub fn mode(&self) -> crate::interaction::InteractionMode {
        self.mode
    }

    pub fn brush(&self) -> &crate::interaction::Brush {
        &self.brush
    }

    pub fn fields(&self) -> &crate::fields::ForceFieldState {
        &self.fields
    }

    pub fn bodies(&self) -> &crate::bodies::Bodies {
        &self.bodies
    }

    pub fn physics(&self) -> &crate::physics::PhysicsWorld {
        &self.physics
    }

    pub fn body_draws(&self) -> impl Iterator<Item = crate::bodies::BodyDraw<'_>> {
        self.bodies.draws(&self.physics)
    }

    pub fn handle_intent(&mut self, intent: crate::interaction::Intent) {
        use crate::interaction::{Intent, InteractionMode};
        match intent {
            Intent::SelectShape(shape) => self.brush.shape = shape,
            Intent::GrowBrush => self.brush.grow(),
            Intent::ShrinkBrush => self.brush.shrink(),
            Intent::SetColor(color) => self.brush.color = color,
            Intent::EnterGravitySelect => {
                self.mode = InteractionMode::AwaitingGravityCenter;
                log::info!("Gravity mode: click to place the gravity center");
            }
            Intent::EnterExplosionSelect => {
                self.mode = InteractionMode::AwaitingExplosionCenter;
                self.fields.clear_gravity();
                log::info!("Explosion mode: click to apply an outward force");
            }
            Intent::Reset => {
                self.mode = InteractionMode::Idle;
                self.fields.clear_gravity();
                log::info!("Gravity center reset");
            }
            Intent::OpenScene | Intent::ClearScene => {}
        }
        self.frame_dirty = true;
    }

    pub fn click(
        &mut self,
        position: nalgebra_glm::Vec2,
        store: &mut impl crate::bodies::GeometryStore,
    ) -> crate::interaction::ClickAction {
        use crate::interaction::ClickAction;
        let (action, next_mode) = self.mode.click(position);
        match action {
            ClickAction::Spawn(position) => {
                self.bodies.spawn(
                    &mut self.physics,
                    store,
                    self.brush.shape,
                    position,
                    self.brush.half_extent,
                    self.brush.color,
                );
            }
            ClickAction::SetGravityCenter(center) => self.fields.set_gravity_center(center),
            ClickAction::ArmExplosion(center) => {
                self.fields.arm_explosion(center);
                self.fields.clear_gravity();
            }
        }
        self.mode = next_mode;
        self.frame_dirty = true;
        action
    }

    pub fn tick(&mut self) -> crate::fields::FieldReport {
        self.physics.step();
        let report = self.fields.apply(&mut self.physics, &self.bodies);
        self.frame_dirty = true;
        report
    }

    pub fn take_frame_dirty(&mut self) -> bool {
        std::mem::take(&mut self.frame_dirty)
    }

    pub fn teardown(&mut self, store: &mut impl crate::bodies::GeometryStore) -> usize {
        self.fields.clear_gravity();
        self.mode = crate::interaction::InteractionMode::Idle;
        self.bodies.teardown(&mut self.physics, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{ClickAction, Intent, InteractionMode};

    fn simulation() -> Simulation {
        Simulation::new(&crate::settings::Settings::default(), 4.0 / 3.0)
    }

    #[test]
    fn screen_corners_map_to_world_edges() {
        let screen = nalgebra_glm::vec2(800.0, 600.0);
        let world = nalgebra_glm::vec2(10.0, 7.5);
        assert_eq!(
            screen_to_world(&nalgebra_glm::vec2(400.0, 300.0), &screen, &world),
            nalgebra_glm::vec2(0.0, 0.0)
        );
        assert_eq!(
            screen_to_world(&nalgebra_glm::vec2(0.0, 0.0), &screen, &world),
            nalgebra_glm::vec2(-5.0, 3.75)
        );
        assert_eq!(
            screen_to_world(&nalgebra_glm::vec2(800.0, 600.0), &screen, &world),
            nalgebra_glm::vec2(5.0, -3.75)
        );
    }

    #[test]
    fn world_height_follows_aspect_ratio() {
        let mut simulation = simulation();
        assert!((simulation.world_size().y - 7.5).abs() < 1e-5);
        simulation.resize(2.0);
        assert!((simulation.world_size().y - 5.0).abs() < 1e-5);
    }

    #[test]
    fn gravity_select_cancels_explosion_select() {
        let mut simulation = simulation();
        simulation.handle_intent(Intent::EnterExplosionSelect);
        assert_eq!(simulation.mode(), InteractionMode::AwaitingExplosionCenter);
        simulation.handle_intent(Intent::EnterGravitySelect);
        assert_eq!(simulation.mode(), InteractionMode::AwaitingGravityCenter);
    }

    #[test]
    fn explosion_select_disables_gravity() {
        let mut simulation = simulation();
        let mut store = crate::bodies::tests::CountingStore::default();
        simulation.handle_intent(Intent::EnterGravitySelect);
        simulation.click(nalgebra_glm::vec2(0.0, 2.0), &mut store);
        assert!(simulation.fields().gravity_active());
        assert_eq!(simulation.mode(), InteractionMode::Idle);

        simulation.handle_intent(Intent::EnterExplosionSelect);
        assert!(!simulation.fields().gravity_active());
    }

    #[test]
    fn explosion_click_arms_once_and_clears_gravity() {
        let mut simulation = simulation();
        let mut store = crate::bodies::tests::CountingStore::default();
        simulation.handle_intent(Intent::EnterExplosionSelect);
        let action = simulation.click(nalgebra_glm::vec2(1.0, 1.0), &mut store);
        assert_eq!(action, ClickAction::ArmExplosion(nalgebra_glm::vec2(1.0, 1.0)));
        assert!(simulation.fields().explosion_armed());
        assert!(!simulation.fields().gravity_active());
        assert_eq!(simulation.mode(), InteractionMode::Idle);
        assert_eq!(store.uploaded, 0);

        simulation.tick();
        assert!(!simulation.fields().explosion_armed());
    }

    #[test]
    fn reset_returns_to_idle_from_any_mode() {
        let mut simulation = simulation();
        let mut store = crate::bodies::tests::CountingStore::default();
        simulation.handle_intent(Intent::EnterGravitySelect);
        simulation.click(nalgebra_glm::vec2(0.0, 0.0), &mut store);
        simulation.handle_intent(Intent::EnterGravitySelect);
        simulation.handle_intent(Intent::Reset);
        assert_eq!(simulation.mode(), InteractionMode::Idle);
        assert!(!simulation.fields().gravity_active());
        assert_eq!(simulation.fields().gravity_center(), None);
    }

    #[test]
    fn idle_clicks_spawn_with_the_brush() {
        let mut simulation = simulation();
        let mut store = crate::bodies::tests::CountingStore::default();
        simulation.handle_intent(Intent::SelectShape(crate::bodies::ShapeKind::Circle));
        simulation.handle_intent(Intent::GrowBrush);
        simulation.handle_intent(Intent::SetColor(nalgebra_glm::vec3(0.0, 0.0, 1.0)));
        let brush = simulation.brush().clone();
        assert_eq!(brush.shape, crate::bodies::ShapeKind::Circle);
        simulation.click(nalgebra_glm::vec2(0.0, 1.0), &mut store);

        assert_eq!(simulation.bodies().len(), 1);
        let body = simulation.bodies().iter().next().unwrap();
        assert_eq!(body.shape(), crate::bodies::ShapeKind::Circle);
        assert!((body.half_extent() - 0.6).abs() < 1e-6);
        assert_eq!(body.half_extent(), brush.half_extent);
        assert_eq!(body.color(), nalgebra_glm::vec3(0.0, 0.0, 1.0));
        assert_eq!(simulation.mode(), InteractionMode::Idle);
    }

    #[test]
    fn ticks_mark_the_frame_dirty() {
        let mut simulation = simulation();
        simulation.take_frame_dirty();
        assert!(!simulation.take_frame_dirty());
        simulation.tick();
        assert!(simulation.take_frame_dirty());
        assert!(!simulation.take_frame_dirty());
    }
}
