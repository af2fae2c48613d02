pub mod app;
pub mod bodies;
pub mod camera;
pub mod canvas;
pub mod clock;
pub mod fields;
pub mod gpu;
pub mod interaction;
pub mod io;
pub mod physics;
pub mod render;
pub mod scene;
pub mod scenefile;
pub mod settings;
pub mod simulation;
pub mod tessellate;
pub mod view;

pub use log;
pub use nalgebra_glm;
pub use petgraph;
pub use winit;

pub use self::{app::run, settings::Settings};
