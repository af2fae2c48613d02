#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Camera {
    pub position: nalgebra_glm::Vec3,
    pub look: nalgebra_glm::Vec3,
    pub up: nalgebra_glm::Vec3,
    pub y_fov_rad: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(data: &crate::scene::CameraData, z_near: f32, z_far: f32) -> Self {
        Self {
            position: data.position,
            look: data.look.normalize(),
            up: data.up.normalize(),
            y_fov_rad: data.height_angle,
            z_near,
            z_far,
        }
    }

    pub fn view_matrix(&self) -> nalgebra_glm::Mat4 {
        nalgebra_glm::look_at(&self.position, &(self.position + self.look), &self.up)
    }

    pub fn projection_matrix(&self, aspect_ratio: f32) -> nalgebra_glm::Mat4 {
        nalgebra_glm::perspective_zo(aspect_ratio, self.y_fov_rad, self.z_near, self.z_far)
    }

    pub fn right(&self) -> nalgebra_glm::Vec3 {
        self.look.cross(&self.up).normalize()
    }

    pub fn translate(&mut self, motion: &CameraMotion, distance: f32) {
        let offset = self.look * motion.forward
            + self.right() * motion.right
            + nalgebra_glm::Vec3::y() * motion.up;
        if offset.norm_squared() > 0.0 {
            self.position += offset * distance;
        }
    }

    /// Yaw about world up, then pitch about the camera's right axis.
    pub fn rotate(&mut self, yaw: f32, pitch: f32) {
        self.rotate_about(&nalgebra_glm::Vec3::y(), yaw);
        let right = self.right();
        self.rotate_about(&right, pitch);
    }

    fn rotate_about(&mut self, axis: &nalgebra_glm::Vec3, angle: f32) {
        let rotation = nalgebra_glm::rotation(angle, axis);
        let rotate = |vector: &nalgebra_glm::Vec3| {
            (rotation * nalgebra_glm::vec4(vector.x, vector.y, vector.z, 0.0))
                .xyz()
                .normalize()
        };
        self.look = rotate(&self.look);
        self.up = rotate(&self.up);
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub struct CameraMotion {
    pub forward: f32,
    pub right: f32,
    pub up: f32,
}

impl CameraMotion {
    pub fn is_still(&self) -> bool {
        self.forward == 0.0 && self.right == 0.0 && self.up == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(&crate::scene::CameraData::default(), 0.1, 100.0)
    }

    #[test]
    fn view_matrix_moves_the_eye_to_the_origin() {
        let camera = camera();
        let eye = camera.view_matrix()
            * nalgebra_glm::vec4(camera.position.x, camera.position.y, camera.position.z, 1.0);
        assert!(eye.xyz().norm() < 1e-5);
    }

    #[test]
    fn translation_follows_look_and_right() {
        let mut camera = camera();
        let start = camera.position;
        camera.translate(
            &CameraMotion {
                forward: 1.0,
                ..Default::default()
            },
            2.0,
        );
        assert!((camera.position - (start + nalgebra_glm::vec3(0.0, 0.0, -2.0))).norm() < 1e-5);

        camera.translate(
            &CameraMotion {
                right: 1.0,
                up: -1.0,
                ..Default::default()
            },
            1.0,
        );
        assert!((camera.position - (start + nalgebra_glm::vec3(1.0, -1.0, -2.0))).norm() < 1e-5);
    }

    #[test]
    fn yaw_turns_the_look_direction_about_world_up() {
        let mut camera = camera();
        camera.rotate(std::f32::consts::FRAC_PI_2, 0.0);
        assert!((camera.look - nalgebra_glm::vec3(-1.0, 0.0, 0.0)).norm() < 1e-5);
        assert!((camera.up - nalgebra_glm::Vec3::y()).norm() < 1e-5);
    }

    #[test]
    fn pitch_keeps_look_and_up_orthonormal() {
        let mut camera = camera();
        camera.rotate(0.3, 0.4);
        assert!((camera.look.norm() - 1.0).abs() < 1e-5);
        assert!((camera.up.norm() - 1.0).abs() < 1e-5);
        assert!(camera.look.dot(&camera.up).abs() < 1e-5);
        assert!(camera.look.y > 0.0);
    }
}
