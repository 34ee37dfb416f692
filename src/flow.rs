//! Application event loop.
//!
//! The loop has two phases. Setup creates the window, the GPU context and the
//! [`Stage`]; on the web this happens in a spawned future whose result comes
//! back as [`FlowEvent::Initialized`]. After that every redraw runs one frame:
//!
//! 1. advance the stage (tweens, forces, physics, transform sync)
//! 2. upload the ball instances if they changed, the light and the camera
//! 3. draw every instanced mesh with the lit pipeline
//! 4. present and request the next redraw
//!
//! Window and page callbacks never touch the simulation directly. They either
//! run between frames on the loop thread or go through the [`EventLoopProxy`].

use std::{iter, sync::Arc};

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    config::StageConfig,
    context::Context,
    data_structures::{
        batch::InstancedMesh,
        instance::Instance,
        model::{DrawModel, MeshData},
        texture::Texture,
    },
    menu::{HitboxId, MenuElement, MenuEvent, Viewport},
    render::{Instanced, Render},
    resources::{self, AssetError, shapes},
    stage::Stage,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Events delivered to the loop through its proxy.
// Native builds load synchronously and read the menu from the config, so only
// the web build sends these.
#[derive(Debug)]
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub enum FlowEvent {
    Initialized(Box<AppState>),
    Enter(HitboxId),
    Leave(HitboxId),
    Click(HitboxId),
    ModelLoaded(Result<Vec<MeshData>, AssetError>),
}

/// Everything that exists once setup has finished.
#[derive(Debug)]
pub struct AppState {
    pub(crate) ctx: Context,
    stage: Stage,
    balls: InstancedMesh,
    labels: InstancedMesh,
    model: Option<InstancedMesh>,
    cursor: Option<(f32, f32)>,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(
        window: Arc<Window>,
        config: StageConfig,
        elements: Vec<MenuElement>,
        viewport: Viewport,
    ) -> anyhow::Result<Self> {
        let stage = Stage::new(config, viewport, &elements);
        let ctx = Context::new(window, stage.config(), stage.fov()).await?;

        let field = &stage.config().field;
        let sphere = shapes::uv_sphere(field.size, field.segments, field.segments);
        let balls = InstancedMesh::new(
            &ctx.device,
            &ctx.queue,
            resources::upload_model(&ctx.device, "Ball", &[sphere]),
            &stage.field().raw_instances(),
            "Balls",
        );
        let labels = InstancedMesh::new(
            &ctx.device,
            &ctx.queue,
            resources::upload_model(&ctx.device, "Label", &[shapes::unit_slab()]),
            &stage.menu().label_instances(),
            "Labels",
        );

        Ok(Self {
            ctx,
            stage,
            balls,
            labels,
            model: None,
            cursor: None,
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );

            let logical =
                PhysicalSize::new(width, height).to_logical::<f32>(self.ctx.window.scale_factor());
            self.stage.on_resize(logical.width, logical.height);
            let projection = &mut self.ctx.camera.projection;
            projection.resize(width, height);
            projection.set_fovy(cgmath::Deg(self.stage.fov()));
        }
    }

    fn on_model_loaded(&mut self, result: Result<Vec<MeshData>, AssetError>) {
        let meshes = match result {
            Ok(meshes) => meshes,
            Err(e) => {
                self.stage.on_model_loaded(Err(e));
                return;
            }
        };
        let Some(placement) = self.stage.on_model_loaded(Ok(&meshes)) else {
            return;
        };
        let model_cfg = &self.stage.config().model;
        let instance = Instance {
            position: placement.position,
            rotation: placement.rotation,
            scale: cgmath::Vector3::new(placement.scale, placement.scale, placement.scale),
        };
        self.model = Some(InstancedMesh::new(
            &self.ctx.device,
            &self.ctx.queue,
            resources::upload_model(&self.ctx.device, &model_cfg.path, &meshes),
            &[instance.to_raw(model_cfg.colour)],
            "Model",
        ));
    }

    fn announce(&self, event: MenuEvent) {
        log::debug!("{} {}", event.name(), event.id());
        #[cfg(target_arch = "wasm32")]
        if let Err(e) = crate::dom::dispatch(event) {
            log::warn!("{e:#}");
        }
    }

    fn on_cursor_moved(&mut self, x: f32, y: f32) {
        self.cursor = Some((x, y));
        self.stage.on_pointer_move(x, y);
        // On the web the page reports enter and leave itself.
        #[cfg(not(target_arch = "wasm32"))]
        for event in self.stage.hover_at(x, y) {
            self.announce(event);
        }
    }

    fn update(&mut self, dt: f32) {
        let stats = self.stage.frame(dt);
        log::trace!("frame: {stats:?}");

        if self.stage.field_mut().take_dirty() {
            let instances = self.stage.field().raw_instances();
            self.balls
                .update(&self.ctx.device, &self.ctx.queue, &instances);
        }
        self.ctx
            .light
            .set_position(&self.ctx.queue, self.stage.light_position().into());

        let camera = &mut self.ctx.camera;
        camera.controller.update(&mut camera.camera);
        camera.upload(&self.ctx.queue);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let mut draws: Vec<Instanced> = Vec::new();
            Render::Composed(vec![
                Render::from(&self.balls),
                Render::from(&self.labels),
                Render::from(self.model.as_ref()),
            ])
            .collect(&mut draws);

            render_pass.set_pipeline(&self.ctx.pipeline);
            for instanced in draws {
                if instanced.amount == 0 {
                    continue;
                }
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_model_instanced(
                    instanced.model,
                    0..instanced.amount as u32,
                    &self.ctx.camera.bind_group,
                    &self.ctx.light.bind_group,
                );
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<FlowEvent>,
    state: Option<AppState>,
    // Taken by the first `resumed`.
    config: Option<StageConfig>,
    last_time: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, config: StageConfig) -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            state: None,
            config: Some(config),
            last_time: Instant::now(),
        })
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(config) = self.config.take() else {
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("ballpit");

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;

            let canvas = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(&config.scene.canvas_id))
                .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok());
            window_attributes = match canvas {
                Some(canvas) => window_attributes.with_canvas(Some(canvas)),
                None => {
                    log::warn!("no canvas #{}, appending one", config.scene.canvas_id);
                    window_attributes.with_append(true)
                }
            };
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("could not create a window: {e}");
                event_loop.exit();
                return;
            }
        };
        let model_path = config.model.path.clone();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let elements = MenuElement::from_items(&config.menu.items);
            let size = window.inner_size().to_logical::<f32>(window.scale_factor());
            let viewport = Viewport::new(size.width, size.height);
            let init = AppState::new(window, config, elements, viewport);
            match self.async_runtime.block_on(init) {
                Ok(mut state) => {
                    if !model_path.is_empty() {
                        let result = self
                            .async_runtime
                            .block_on(resources::load_mesh_data(&model_path));
                        state.on_model_loaded(result);
                    }
                    self.state = Some(state);
                    self.last_time = Instant::now();
                }
                Err(e) => {
                    log::error!("could not set up the scene: {e:#}");
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let elements = crate::dom::menu_elements(&config.menu, self.proxy.clone())
                .unwrap_or_else(|e| {
                    log::error!("menu unavailable: {e:#}");
                    Vec::new()
                });
            let viewport = crate::dom::viewport().unwrap_or_else(|| {
                let size = window.inner_size().to_logical::<f32>(window.scale_factor());
                Viewport::new(size.width, size.height)
            });
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let state = match AppState::new(window, config, elements, viewport).await {
                    Ok(state) => state,
                    Err(e) => {
                        log::error!("could not set up the scene: {e:#}");
                        return;
                    }
                };
                if proxy
                    .send_event(FlowEvent::Initialized(Box::new(state)))
                    .is_err()
                {
                    return;
                }
                if !model_path.is_empty() {
                    let result = resources::load_mesh_data(&model_path).await;
                    if proxy.send_event(FlowEvent::ModelLoaded(result)).is_err() {
                        log::warn!("event loop closed before the model arrived");
                    }
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: FlowEvent) {
        if let FlowEvent::Initialized(state) = event {
            // This is the message from our wasm `spawn_local`
            let state = self.state.insert(*state);
            let size = state.ctx.window.inner_size();
            state.resize(size.width, size.height);
            state.ctx.window.request_redraw();
            self.last_time = Instant::now();
            return;
        }

        let Some(state) = &mut self.state else {
            log::debug!("dropping {event:?} received before setup");
            return;
        };
        match event {
            FlowEvent::Enter(id) => {
                if let Some(event) = state.stage.on_pointer_enter(id) {
                    state.announce(event);
                }
            }
            FlowEvent::Leave(id) => {
                if let Some(event) = state.stage.on_pointer_leave(id) {
                    state.announce(event);
                }
            }
            FlowEvent::Click(id) => {
                state.stage.on_click(id);
            }
            FlowEvent::ModelLoaded(result) => state.on_model_loaded(result),
            FlowEvent::Initialized(_) => (),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        state.ctx.camera.controller.handle_window_events(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(state.ctx.window.scale_factor());
                state.on_cursor_moved(logical.x, logical.y);
            }
            WindowEvent::CursorLeft { .. } => {
                state.cursor = None;
                #[cfg(not(target_arch = "wasm32"))]
                if let Some(event) = state.stage.clear_hover() {
                    state.announce(event);
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                let hit = state
                    .cursor
                    .and_then(|(x, y)| state.stage.menu().element_at(x, y));
                if let Some(id) = hit {
                    state.stage.on_click(id);
                }
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                state.update(dt.as_secs_f32());

                match state.render() {
                    Ok(()) => (),
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Opens the scene and runs until the window closes.
pub fn run(config: StageConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info)?;
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}

/// Entry point of the web build.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    run(StageConfig::default()).map_err(|e| JsValue::from_str(&format!("{e:#}")))
}
