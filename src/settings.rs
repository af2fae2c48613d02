#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to read settings file '{path}'!")]
    ReadSettings {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file '{path}'!")]
    ParseSettings {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid setting '{field}': {reason}")]
    InvalidSettings {
        field: &'static str,
        reason: &'static str,
    },
}

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Default, Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub physics: PhysicsSettings,
    pub fields: FieldSettings,
    pub brush: BrushSettings,
    pub scene: SceneSettings,
}

impl Settings {
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| Error::ReadSettings {
            path: display.clone(),
            source,
        })?;
        let settings: Self =
            serde_json::from_str(&text).map_err(|source| Error::ParseSettings {
                path: display,
                source,
            })?;
        settings.validate()?;
        log::info!("Loaded settings from '{}'", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |field, reason| Err(Error::InvalidSettings { field, reason });
        let positive = |value: f32| value.is_finite() && value > 0.0;
        let physics = &self.physics;
        if std::time::Duration::try_from_secs_f32(physics.timestep).is_err()
            || !positive(physics.timestep)
        {
            return invalid("physics.timestep", "must be a finite number of seconds above zero");
        }
        if physics.circle_segments < 3 {
            return invalid("physics.circle_segments", "must be at least 3");
        }
        if !positive(physics.world_width) {
            return invalid("physics.world_width", "must be finite and above zero");
        }
        if !positive(self.brush.min_half_extent) {
            return invalid("brush.min_half_extent", "must be finite and above zero");
        }
        if !positive(self.scene.near_plane) || self.scene.far_plane <= self.scene.near_plane {
            return invalid("scene.near_plane", "must be above zero and below scene.far_plane");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Sandbox".to_string(),
            width: 1280,
            height: 960,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Width of the visible world in world units. The height follows the window aspect ratio.
    pub world_width: f32,
    pub gravity: nalgebra_glm::Vec2,
    pub timestep: f32,
    pub velocity_iterations: usize,
    pub position_iterations: usize,
    pub density: f32,
    pub friction: f32,
    pub ground_half_height: f32,
    pub circle_segments: usize,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            world_width: 10.0,
            gravity: nalgebra_glm::vec2(0.0, -9.8),
            timestep: 1.0 / 60.0,
            velocity_iterations: 6,
            position_iterations: 2,
            density: 1.0,
            friction: 0.3,
            ground_half_height: 1.0,
            circle_segments: 24,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    pub gravity_strength: f32,
    pub gravity_multiplier: f32,
    pub explosion_strength: f32,
    pub explosion_range_squared: f32,
    /// Squared distance below which a body is considered to sit on a field center.
    pub singularity_epsilon: f32,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            gravity_strength: 9.8,
            gravity_multiplier: 2.0,
            explosion_strength: 200.0,
            explosion_range_squared: 10.0,
            singularity_epsilon: 1e-4,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    pub half_extent: f32,
    pub min_half_extent: f32,
    pub step: f32,
    pub color: nalgebra_glm::Vec3,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            half_extent: 0.5,
            min_half_extent: 0.1,
            step: 0.1,
            color: nalgebra_glm::vec3(1.0, 0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub path: Option<std::path::PathBuf>,
    pub shape_parameter_1: u32,
    pub shape_parameter_2: u32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub camera_speed: f32,
    pub camera_sensitivity: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            path: None,
            shape_parameter_1: 10,
            shape_parameter_2: 10,
            near_plane: 0.1,
            far_plane: 100.0,
            camera_speed: 5.0,
            camera_sensitivity: 0.005,
        }
    }
}
