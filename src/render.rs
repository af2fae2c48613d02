pub struct Renderer<'window> {
    pub gpu: crate::gpu::Gpu<'window>,
    pub canvas: crate::canvas::Canvas,
    pub view: crate::view::SceneView,
    pub depth_texture_view: wgpu::TextureView,
}

impl<'window> Renderer<'window> {
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'window>>,
        width: u32,
        height: u32,
        tessellation: crate::view::Tessellation,
    ) -> Result<Self, crate::gpu::Error> {
        let gpu = crate::gpu::Gpu::new_async(window, width, height).await?;
        let depth_texture_view = gpu.create_depth_texture(width, height);
        let canvas = crate::canvas::Canvas::new(&gpu);
        let view = crate::view::SceneView::new(&gpu, tessellation);
        Ok(Self {
            gpu,
            canvas,
            view,
            depth_texture_view,
        })
    }

    pub fn load_scene(&mut self, scene: &crate::scene::Scene) {
        self.view.load_scene(&self.gpu, scene);
    }

    pub fn clear_scene(&mut self) {
        self.view.clear();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.depth_texture_view = self.gpu.create_depth_texture(width, height);
    }

    pub fn render_frame(
        &mut self,
        bodies: &[crate::bodies::BodyDraw<'_>],
        world_size: &nalgebra_glm::Vec2,
        camera: &crate::camera::Camera,
    ) {
        let surface_texture = match self.gpu.surface.get_current_texture() {
            Ok(surface_texture) => surface_texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu.reconfigure();
                return;
            }
            Err(error) => {
                log::error!("Failed to get surface texture: {error}");
                return;
            }
        };

        self.view.prepare(&self.gpu, camera);
        self.canvas.prepare(&self.gpu, bodies, world_size);

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let surface_texture_view =
            surface_texture
                .texture
                .create_view(&wgpu::TextureViewDescriptor {
                    label: wgpu::Label::default(),
                    aspect: wgpu::TextureAspect::default(),
                    format: Some(self.gpu.surface_format),
                    dimension: None,
                    base_mip_level: 0,
                    mip_level_count: None,
                    base_array_layer: 0,
                    array_layer_count: None,
                });

        encoder.insert_debug_marker("Render scene");

        // This scope around the render_pass prevents the
        // render_pass from holding a borrow to the encoder,
        // which would prevent calling `.finish()` in
        // preparation for queue submission.
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.1,
                            b: 0.1,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.view.render(&mut render_pass);
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Canvas Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.canvas.render(&mut render_pass);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));

        surface_texture.present();
    }
}

impl crate::bodies::GeometryStore for Renderer<'_> {
    fn upload(&mut self, geometry: &crate::bodies::Geometry) -> crate::bodies::GeometryHandle {
        self.canvas.upload(&self.gpu.device, geometry)
    }

    fn release(&mut self, handle: crate::bodies::GeometryHandle) {
        self.canvas.release(handle);
    }
}
