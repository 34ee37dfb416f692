use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    camera::{CameraUniform, Fog, OrbitCamera, OrbitController, Projection},
    config::StageConfig,
    data_structures::texture,
    pipelines::{
        basic::mk_instanced_pipeline,
        light::{LightResources, LightUniform},
    },
};

/// Camera state plus the GPU side of its uniform.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: OrbitCamera,
    pub controller: OrbitController,
    pub projection: Projection,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    /// Recomputes the view projection and uploads it.
    pub fn upload(&mut self, queue: &wgpu::Queue) {
        self.uniform
            .update_view_proj(&self.camera, &self.projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

/// Everything needed to draw: window, surface, device, camera and light.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub light: LightResources,
    pub pipeline: wgpu::RenderPipeline,
    pub clear_colour: wgpu::Color,
}

impl Context {
    /// `fov` is the initial vertical field of view in degrees.
    pub async fn new(window: Arc<Window>, stage: &StageConfig, fov: f32) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // The instance is a handle to our GPU
        // BackendBit::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
        log::debug!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::debug!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader writes linear colours, so prefer an sRGB surface.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("the surface supports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let camera = mk_camera(&device, stage, size.width, size.height, fov);

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        let light = LightResources::new(
            LightUniform::new(
                stage.light.position,
                stage.light.colour,
                stage.light.intensity,
                stage.light.ambient,
            ),
            &device,
        );

        let pipeline = mk_instanced_pipeline(
            &device,
            config.format,
            &camera.bind_group_layout,
            &light.bind_group_layout,
        );

        let [r, g, b] = stage.scene.clear_colour;
        let clear_colour = wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        };

        Ok(Self {
            surface,
            device,
            queue,
            config,
            camera,
            light,
            pipeline,
            clear_colour,
            window,
            depth_texture,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

/// Orbit camera, projection and camera uniform for a `width` x `height` surface.
pub fn mk_camera(
    device: &wgpu::Device,
    stage: &StageConfig,
    width: u32,
    height: u32,
    fov: f32,
) -> CameraResources {
    let cfg = &stage.camera;
    let camera = OrbitCamera::looking_at(cfg.eye.into(), cfg.target.into());
    let projection = Projection::new(width, height, cgmath::Deg(fov), cfg.near, cfg.far);
    let controller = OrbitController::new(cfg.rotate_speed, cfg.zoom_speed);

    let mut uniform = CameraUniform::new(Fog {
        colour: stage.scene.fog_colour,
        near: stage.scene.fog_near,
        far: stage.scene.fog_far,
    });
    uniform.update_view_proj(&camera, &projection);

    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Camera Buffer"),
        contents: bytemuck::cast_slice(&[uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("camera_bind_group_layout"),
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some("camera_bind_group"),
    });

    CameraResources {
        camera,
        controller,
        projection,
        uniform,
        buffer,
        bind_group,
        bind_group_layout,
    }
}
