#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum InteractionMode {
    #[default]
    Idle,
    AwaitingGravityCenter,
    AwaitingExplosionCenter,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Intent {
    SelectShape(crate::bodies::ShapeKind),
    GrowBrush,
    ShrinkBrush,
    SetColor(nalgebra_glm::Vec3),
    EnterGravitySelect,
    EnterExplosionSelect,
    Reset,
    OpenScene,
    ClearScene,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ClickAction {
    Spawn(nalgebra_glm::Vec2),
    SetGravityCenter(nalgebra_glm::Vec2),
    ArmExplosion(nalgebra_glm::Vec2),
}

impl InteractionMode {
    pub fn click(self, position: nalgebra_glm::Vec2) -> (ClickAction, InteractionMode) {
        match self {
            InteractionMode::Idle => (ClickAction::Spawn(position), InteractionMode::Idle),
            InteractionMode::AwaitingGravityCenter => (
                ClickAction::SetGravityCenter(position),
                InteractionMode::Idle,
            ),
            InteractionMode::AwaitingExplosionCenter => {
                (ClickAction::ArmExplosion(position), InteractionMode::Idle)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    pub shape: crate::bodies::ShapeKind,
    pub half_extent: f32,
    pub color: nalgebra_glm::Vec3,
    min_half_extent: f32,
    step: f32,
}

impl Brush {
    pub fn new(settings: &crate::settings::BrushSettings) -> Self {
        Self {
            shape: crate::bodies::ShapeKind::Box,
            half_extent: settings.half_extent.max(settings.min_half_extent),
            color: settings.color,
            min_half_extent: settings.min_half_extent,
            step: settings.step,
        }
    }

    pub fn grow(&mut self) {
        self.half_extent += self.step;
    }

    pub fn shrink(&mut self) {
        self.half_extent = (self.half_extent - self.step).max(self.min_half_extent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_clicks_spawn_and_stay_idle() {
        let position = nalgebra_glm::vec2(1.0, -1.0);
        assert_eq!(
            InteractionMode::Idle.click(position),
            (ClickAction::Spawn(position), InteractionMode::Idle)
        );
    }

    #[test]
    fn awaiting_modes_consume_one_click() {
        let position = nalgebra_glm::vec2(0.5, 2.0);
        assert_eq!(
            InteractionMode::AwaitingGravityCenter.click(position),
            (ClickAction::SetGravityCenter(position), InteractionMode::Idle)
        );
        assert_eq!(
            InteractionMode::AwaitingExplosionCenter.click(position),
            (ClickAction::ArmExplosion(position), InteractionMode::Idle)
        );
    }

    #[test]
    fn brush_never_shrinks_below_minimum() {
        let mut brush = Brush::new(&crate::settings::BrushSettings::default());
        (0..20).for_each(|_| brush.shrink());
        assert!((brush.half_extent - 0.1).abs() < 1e-6);
        brush.grow();
        assert!((brush.half_extent - 0.2).abs() < 1e-6);
    }
}
