use crate::interaction::Intent;
use winit::keyboard::KeyCode;

#[derive(Default)]
pub struct Io {
    pub keystates: std::collections::HashMap<KeyCode, winit::event::ElementState>,
    pub mouse: Mouse,
}

impl Io {
    pub fn is_key_pressed(&self, keycode: KeyCode) -> bool {
        self.keystates.contains_key(&keycode)
            && self.keystates[&keycode] == winit::event::ElementState::Pressed
    }

    pub fn receive_event<T>(&mut self, event: &winit::event::Event<T>) {
        if let winit::event::Event::WindowEvent {
            event:
                winit::event::WindowEvent::KeyboardInput {
                    event:
                        winit::event::KeyEvent {
                            physical_key: winit::keyboard::PhysicalKey::Code(key_code),
                            state,
                            ..
                        },
                    ..
                },
            ..
        } = *event
        {
            *self.keystates.entry(key_code).or_insert(state) = state;
        }
        self.mouse.receive_event(event);
    }

    pub fn camera_motion(&self) -> crate::camera::CameraMotion {
        let axis = |positive: &[KeyCode], negative: &[KeyCode]| {
            let held = |keys: &[KeyCode]| keys.iter().any(|key| self.is_key_pressed(*key));
            held(positive) as i32 as f32 - held(negative) as i32 as f32
        };
        crate::camera::CameraMotion {
            forward: axis(&[KeyCode::KeyW], &[KeyCode::KeyS]),
            right: axis(&[KeyCode::KeyD], &[KeyCode::KeyA]),
            up: axis(
                &[KeyCode::Space],
                &[KeyCode::ControlLeft, KeyCode::ControlRight],
            ),
        }
    }
}

pub fn intent_for_key(key_code: KeyCode) -> Option<Intent> {
    let intent = match key_code {
        KeyCode::Digit1 | KeyCode::Numpad1 => Intent::SelectShape(crate::bodies::ShapeKind::Box),
        KeyCode::Digit2 | KeyCode::Numpad2 => {
            Intent::SelectShape(crate::bodies::ShapeKind::Circle)
        }
        KeyCode::Digit3 | KeyCode::Numpad3 => Intent::EnterGravitySelect,
        KeyCode::Digit4 | KeyCode::Numpad4 => Intent::EnterExplosionSelect,
        KeyCode::Equal | KeyCode::NumpadAdd => Intent::GrowBrush,
        KeyCode::Minus | KeyCode::NumpadSubtract => Intent::ShrinkBrush,
        KeyCode::KeyR => Intent::SetColor(nalgebra_glm::vec3(1.0, 0.0, 0.0)),
        KeyCode::KeyG => Intent::SetColor(nalgebra_glm::vec3(0.0, 1.0, 0.0)),
        KeyCode::KeyB => Intent::SetColor(nalgebra_glm::vec3(0.0, 0.0, 1.0)),
        KeyCode::Escape => Intent::Reset,
        KeyCode::KeyO => Intent::OpenScene,
        KeyCode::KeyC => Intent::ClearScene,
        _ => return None,
    };
    Some(intent)
}

#[derive(Default)]
pub struct Mouse {
    pub is_left_clicked: bool,
    pub is_middle_clicked: bool,
    pub is_right_clicked: bool,
    pub position: nalgebra_glm::Vec2,
    pub position_delta: nalgebra_glm::Vec2,
    pub moved: bool,
}

impl Mouse {
    pub fn receive_event<T>(&mut self, event: &winit::event::Event<T>) {
        match event {
            winit::event::Event::NewEvents { .. } => self.new_events(),
            winit::event::Event::WindowEvent { event, .. } => match *event {
                winit::event::WindowEvent::MouseInput { button, state, .. } => {
                    self.mouse_input(button, state)
                }
                winit::event::WindowEvent::CursorMoved { position, .. } => {
                    self.cursor_moved(position)
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn new_events(&mut self) {
        if !self.moved {
            self.position_delta = nalgebra_glm::vec2(0.0, 0.0);
        }
        self.moved = false;
    }

    fn cursor_moved(&mut self, position: winit::dpi::PhysicalPosition<f64>) {
        let last_position = self.position;
        let current_position = nalgebra_glm::vec2(position.x as _, position.y as _);
        self.position = current_position;
        self.position_delta = current_position - last_position;
        self.moved = true;
    }

    fn mouse_input(
        &mut self,
        button: winit::event::MouseButton,
        state: winit::event::ElementState,
    ) {
        let clicked = state == winit::event::ElementState::Pressed;
        match button {
            winit::event::MouseButton::Left => self.is_left_clicked = clicked,
            winit::event::MouseButton::Middle => self.is_middle_clicked = clicked,
            winit::event::MouseButton::Right => self.is_right_clicked = clicked,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_keys_select_shapes_and_modes() {
        assert_eq!(
            intent_for_key(KeyCode::Digit1),
            Some(Intent::SelectShape(crate::bodies::ShapeKind::Box))
        );
        assert_eq!(
            intent_for_key(KeyCode::Digit2),
            Some(Intent::SelectShape(crate::bodies::ShapeKind::Circle))
        );
        assert_eq!(intent_for_key(KeyCode::Digit3), Some(Intent::EnterGravitySelect));
        assert_eq!(intent_for_key(KeyCode::Digit4), Some(Intent::EnterExplosionSelect));
    }

    #[test]
    fn brush_and_reset_keys() {
        assert_eq!(intent_for_key(KeyCode::Equal), Some(Intent::GrowBrush));
        assert_eq!(intent_for_key(KeyCode::NumpadSubtract), Some(Intent::ShrinkBrush));
        assert_eq!(
            intent_for_key(KeyCode::KeyG),
            Some(Intent::SetColor(nalgebra_glm::vec3(0.0, 1.0, 0.0)))
        );
        assert_eq!(intent_for_key(KeyCode::Escape), Some(Intent::Reset));
        assert_eq!(intent_for_key(KeyCode::KeyO), Some(Intent::OpenScene));
        assert_eq!(intent_for_key(KeyCode::KeyC), Some(Intent::ClearScene));
        assert_eq!(intent_for_key(KeyCode::KeyW), None);
    }

    #[test]
    fn held_keys_drive_camera_motion() {
        let mut io = Io::default();
        assert!(io.camera_motion().is_still());
        io.keystates
            .insert(KeyCode::KeyW, winit::event::ElementState::Pressed);
        io.keystates
            .insert(KeyCode::KeyA, winit::event::ElementState::Pressed);
        io.keystates
            .insert(KeyCode::ControlLeft, winit::event::ElementState::Pressed);
        io.keystates
            .insert(KeyCode::KeyS, winit::event::ElementState::Released);
        let motion = io.camera_motion();
        assert_eq!(motion.forward, 1.0);
        assert_eq!(motion.right, -1.0);
        assert_eq!(motion.up, -1.0);
    }

    #[test]
    fn cursor_deltas_reset_between_event_batches() {
        let mut mouse = Mouse::default();
        mouse.cursor_moved(winit::dpi::PhysicalPosition::new(10.0, 20.0));
        mouse.cursor_moved(winit::dpi::PhysicalPosition::new(13.0, 16.0));
        assert_eq!(mouse.position_delta, nalgebra_glm::vec2(3.0, -4.0));
        mouse.new_events();
        assert_eq!(mouse.position_delta, nalgebra_glm::vec2(3.0, -4.0));
        mouse.new_events();
        assert_eq!(mouse.position_delta, nalgebra_glm::vec2(0.0, 0.0));
    }
}
