#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to create winit event loop!")]
    CreateEventLoop(#[source] winit::error::EventLoopError),

    #[error("Failed to create winit window!")]
    CreateWindow(#[source] winit::error::OsError),

    #[error("Failed to create the renderer!")]
    CreateRenderer(#[from] crate::gpu::Error),

    #[error("Failed to execute frame!")]
    RunEventLoop(#[source] winit::error::EventLoopError),
}

type Result<T, E = Error> = std::result::Result<T, E>;

pub fn run(settings: crate::settings::Settings) -> Result<()> {
    env_logger::init();
    pollster::block_on(run_async(settings))
}

pub struct Context {
    pub io: crate::io::Io,
    pub simulation: crate::simulation::Simulation,
    pub clock: crate::clock::Clock,
    pub camera: crate::camera::Camera,
    pub scene: Option<crate::scene::Scene>,
    pub settings: crate::settings::Settings,
}

impl Context {
    pub fn load_scene(&mut self, path: &std::path::Path, renderer: &mut crate::render::Renderer) {
        match crate::scenefile::load(path) {
            Ok(scene) => {
                renderer.load_scene(&scene);
                self.camera = crate::camera::Camera::new(
                    &scene.camera,
                    self.settings.scene.near_plane,
                    self.settings.scene.far_plane,
                );
                self.scene = Some(scene);
            }
            Err(error) => {
                log_error_chain(&error);
                log::warn!("Keeping the previously loaded scene");
            }
        }
    }

    pub fn handle_intent(
        &mut self,
        intent: crate::interaction::Intent,
        renderer: &mut crate::render::Renderer,
    ) {
        match intent {
            crate::interaction::Intent::OpenScene => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Scene description", &["json"])
                    .pick_file()
                {
                    log::info!("File picked: {path:#?}");
                    self.load_scene(&path, renderer);
                }
            }
            crate::interaction::Intent::ClearScene => {
                renderer.clear_scene();
                self.scene = None;
            }
            _ => self.simulation.handle_intent(intent),
        }
    }

    pub fn tick(&mut self) -> bool {
        self.simulation.tick();
        let motion = self.io.camera_motion();
        if motion.is_still() {
            return false;
        }
        let distance = self.settings.scene.camera_speed * self.simulation.physics().timestep();
        self.camera.translate(&motion, distance);
        true
    }
}

pub fn window_aspect_ratio(window: &winit::window::Window) -> f32 {
    let winit::dpi::PhysicalSize { width, height } = window.inner_size();
    width as f32 / height.max(1) as f32
}

fn log_error_chain(error: &dyn std::error::Error) {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    log::error!("{message}");
}

async fn run_async(settings: crate::settings::Settings) -> Result<()> {
    let event_loop = winit::event_loop::EventLoop::new().map_err(Error::CreateEventLoop)?;

    let window = winit::window::WindowBuilder::new()
        .with_title(&settings.window.title)
        .with_inner_size(winit::dpi::PhysicalSize::new(
            settings.window.width,
            settings.window.height,
        ))
        .build(&event_loop)
        .map_err(Error::CreateWindow)?;
    let window = std::sync::Arc::new(window);

    let window_size = window.inner_size();
    let (width, height) = (window_size.width, window_size.height);
    let tessellation = crate::view::Tessellation {
        parameter_1: settings.scene.shape_parameter_1,
        parameter_2: settings.scene.shape_parameter_2,
    };
    let mut renderer =
        crate::render::Renderer::new(window.clone(), width, height, tessellation).await?;

    let mut context = Context {
        io: crate::io::Io::default(),
        simulation: crate::simulation::Simulation::new(&settings, window_aspect_ratio(&window)),
        clock: crate::clock::Clock::new(settings.physics.timestep, std::time::Instant::now()),
        camera: crate::camera::Camera::new(
            &crate::scene::CameraData::default(),
            settings.scene.near_plane,
            settings.scene.far_plane,
        ),
        scene: None,
        settings,
    };

    if let Some(path) = context.settings.scene.path.clone() {
        context.load_scene(&path, &mut renderer);
    }

    event_loop
        .run(move |event, elwt| {
            context.io.receive_event(&event);

            match event {
                winit::event::Event::WindowEvent { event, .. } => match event {
                    winit::event::WindowEvent::CloseRequested => {
                        let released = context.simulation.teardown(&mut renderer);
                        log::info!("Released {released} body geometries, exiting");
                        elwt.exit();
                    }

                    winit::event::WindowEvent::Resized(winit::dpi::PhysicalSize {
                        width,
                        height,
                    }) => {
                        if width > 0 && height > 0 {
                            renderer.resize(width, height);
                            context.simulation.resize(width as f32 / height as f32);
                        }
                    }

                    winit::event::WindowEvent::KeyboardInput {
                        event:
                            winit::event::KeyEvent {
                                physical_key: winit::keyboard::PhysicalKey::Code(key_code),
                                state: winit::event::ElementState::Pressed,
                                repeat: false,
                                ..
                            },
                        ..
                    } => {
                        if let Some(intent) = crate::io::intent_for_key(key_code) {
                            context.handle_intent(intent, &mut renderer);
                        }
                    }

                    winit::event::WindowEvent::MouseInput {
                        state: winit::event::ElementState::Pressed,
                        button: winit::event::MouseButton::Left,
                        ..
                    } => {
                        let window_size = window.inner_size();
                        let position = crate::simulation::screen_to_world(
                            &context.io.mouse.position,
                            &nalgebra_glm::vec2(
                                window_size.width as f32,
                                window_size.height as f32,
                            ),
                            &context.simulation.world_size(),
                        );
                        context.simulation.click(position, &mut renderer);
                    }

                    winit::event::WindowEvent::CursorMoved { .. } => {
                        if context.io.mouse.is_right_clicked {
                            let delta = context.io.mouse.position_delta
                                * context.settings.scene.camera_sensitivity;
                            context.camera.rotate(-delta.x, -delta.y);
                            window.request_redraw();
                        }
                    }

                    winit::event::WindowEvent::RedrawRequested => {
                        let draws = context.simulation.body_draws().collect::<Vec<_>>();
                        renderer.render_frame(
                            &draws,
                            &context.simulation.world_size(),
                            &context.camera,
                        );
                    }

                    _ => {}
                },

                winit::event::Event::AboutToWait => {
                    if context.clock.poll(std::time::Instant::now()) && context.tick() {
                        window.request_redraw();
                    }
                    if context.simulation.take_frame_dirty() {
                        window.request_redraw();
                    }
                    elwt.set_control_flow(winit::event_loop::ControlFlow::WaitUntil(
                        context.clock.next_tick(),
                    ));
                }

                _ => {}
            }
        })
        .map_err(Error::RunEventLoop)
}
