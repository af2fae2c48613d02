#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to create a rendering surface!")]
    CreateSurface(#[source] wgpu::CreateSurfaceError),

    #[error("No graphics adapter is compatible with the window surface.")]
    RequestAdapter,

    #[error("Failed to request a device!")]
    RequestDevice(#[source] wgpu::RequestDeviceError),
}

type Result<T, E = Error> = std::result::Result<T, E>;

pub struct Gpu<'window> {
    pub surface: wgpu::Surface<'window>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub surface_format: wgpu::TextureFormat,
}

impl<'window> Gpu<'window> {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn alignment(&self) -> u64 {
        self.device.limits().min_uniform_buffer_offset_alignment as wgpu::BufferAddress
    }

    pub fn uniform_stride<T>(&self) -> wgpu::BufferAddress {
        wgpu::util::align_to(std::mem::size_of::<T>() as wgpu::BufferAddress, self.alignment())
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height.max(1) as f32
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        log::info!("Resizing renderer surface to: ({width}, {height})");
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    pub fn create_depth_texture(&self, width: u32, height: u32) -> wgpu::TextureView {
        let texture = self.device.create_texture(
            &(wgpu::TextureDescriptor {
                label: Some("Depth Texture"),
                size: wgpu::Extent3d {
                    width: width.max(1),
                    height: height.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: Self::DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            }),
        );
        texture.create_view(&wgpu::TextureViewDescriptor {
            label: None,
            format: Some(Self::DEPTH_FORMAT),
            dimension: Some(wgpu::TextureViewDimension::D2),
            aspect: wgpu::TextureAspect::All,
            base_mip_level: 0,
            base_array_layer: 0,
            array_layer_count: None,
            mip_level_count: None,
        })
    }

    pub async fn new_async(
        window: impl Into<wgpu::SurfaceTarget<'window>>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::util::backend_bits_from_env().unwrap_or_else(wgpu::Backends::all),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(Error::CreateSurface)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(Error::RequestAdapter)?;

        let (device, queue) = {
            log::info!("WGPU Adapter Features: {:#?}", adapter.features());
            adapter
                .request_device(
                    &wgpu::DeviceDescriptor {
                        label: Some("Render Device"),
                        required_features: wgpu::Features::empty(),
                        required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                    },
                    None,
                )
                .await
                .map_err(Error::RequestDevice)?
        };

        let surface_capabilities = surface.get_capabilities(&adapter);

        // This assumes an sRGB surface texture
        let surface_format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };

        surface.configure(&device, &surface_config);

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            surface_format,
        })
    }
}

pub struct DynamicUniform<T> {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    layout: wgpu::BindGroupLayout,
    stride: wgpu::BufferAddress,
    capacity: usize,
    label: &'static str,
    _marker: std::marker::PhantomData<T>,
}

impl<T: bytemuck::Pod> DynamicUniform<T> {
    pub fn new(
        gpu: &Gpu,
        label: &'static str,
        visibility: wgpu::ShaderStages,
        capacity: usize,
    ) -> Self {
        let layout = gpu
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as _),
                    },
                    count: None,
                }],
                label: Some(label),
            });
        let stride = gpu.uniform_stride::<T>();
        let capacity = capacity.max(1);
        let (buffer, bind_group) = Self::allocate(gpu, &layout, label, stride, capacity);
        Self {
            buffer,
            bind_group,
            layout,
            stride,
            capacity,
            label,
            _marker: std::marker::PhantomData,
        }
    }

    fn allocate(
        gpu: &Gpu,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        stride: wgpu::BufferAddress,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity as wgpu::BufferAddress * stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<T>() as _),
                }),
            }],
            label: Some(label),
        });
        (buffer, bind_group)
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn offset(&self, index: usize) -> wgpu::DynamicOffset {
        (index as wgpu::BufferAddress * self.stride) as wgpu::DynamicOffset
    }

    pub fn write(&mut self, gpu: &Gpu, items: &[T]) {
        if items.is_empty() {
            return;
        }
        if items.len() > self.capacity {
            self.capacity = items.len().next_power_of_two();
            log::info!("Growing '{}' to {} entries", self.label, self.capacity);
            let (buffer, bind_group) =
                Self::allocate(gpu, &self.layout, self.label, self.stride, self.capacity);
            self.buffer = buffer;
            self.bind_group = bind_group;
        }
        let stride = self.stride as usize;
        let mut bytes = vec![0_u8; items.len() * stride];
        items
            .iter()
            .zip(bytes.chunks_exact_mut(stride))
            .for_each(|(item, slot)| {
                let item = bytemuck::bytes_of(item);
                slot[..item.len()].copy_from_slice(item);
            });
        gpu.queue.write_buffer(&self.buffer, 0, &bytes);
    }
}
