//! The scene orchestrator.
//!
//! [`Stage`] owns the physics world, the ball field, the menu hitboxes and the
//! pointer probe, and advances all of them once per frame. It knows nothing
//! about the GPU: the render layer reads instances, light and camera
//! parameters back from it after [`Stage::frame`].

use std::collections::BTreeSet;

use cgmath::{Quaternion, Rad, Rotation3, Vector3, Zero};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    camera::fov_for_viewport,
    config::StageConfig,
    data_structures::model::MeshData,
    field::{BallField, Bounds},
    menu::{HitboxId, Menu, MenuElement, MenuEvent, Viewport},
    physics::{BodyDescriptor, BodyHandle, Shape, World},
    resources::AssetError,
    tween::Tween,
};

/// Linear remap of `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// Exact at both ends of the input range. A degenerate input range maps
/// everything to `out_min`.
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    let span = in_max - in_min;
    if span == 0.0 || !span.is_finite() {
        return out_min;
    }
    let t = (value - in_min) / span;
    out_min * (1.0 - t) + out_max * t
}

/// Where the decorative model sits once it has loaded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelPlacement {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ModelState {
    Disabled,
    Pending,
    Loaded(ModelPlacement),
    Failed(String),
}

/// What happened during one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub sub_steps: usize,
    pub active_targets: usize,
    pub generation: u64,
}

#[derive(Debug)]
pub struct Stage {
    config: StageConfig,
    viewport: Viewport,
    world: World,
    field: BallField,
    menu: Menu,
    probe: BodyHandle,
    pointer: Tween,
    probe_tween: Tween,
    light_tween: Tween,
    targets: BTreeSet<HitboxId>,
    hovered: Option<HitboxId>,
    model: ModelState,
    frames: u64,
}

impl Stage {
    /// Sets the scene up, seeding the ball layout from `config.seed`.
    pub fn new(config: StageConfig, viewport: Viewport, elements: &[MenuElement]) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, viewport, elements, &mut rng)
    }

    pub fn with_rng(
        config: StageConfig,
        viewport: Viewport,
        elements: &[MenuElement],
        rng: &mut StdRng,
    ) -> Self {
        let mut world = World::new(config.physics.gravity.into());

        let bounds = Bounds::for_viewport(viewport.width, viewport.height, &config.field);
        let field = BallField::initialize(&mut world, &config.field, bounds, rng);
        let menu = Menu::build_from_elements(&mut world, elements, viewport, &config.menu);
        let probe = world.spawn(BodyDescriptor::fixed(
            Vector3::zero(),
            Shape::Sphere {
                radius: config.scene.probe_radius,
            },
        ));

        let light: Vector3<f32> = config.light.position.into();
        let (pointer_secs, probe_secs, ease) = (
            config.scene.pointer_tween,
            config.scene.probe_tween,
            config.scene.ease,
        );
        let model = if config.model.path.is_empty() {
            ModelState::Disabled
        } else {
            ModelState::Pending
        };

        Self {
            pointer: Tween::new(Vector3::zero(), pointer_secs, ease),
            probe_tween: Tween::new(Vector3::zero(), probe_secs, ease),
            light_tween: Tween::new(light, probe_secs, ease),
            config,
            viewport,
            world,
            field,
            menu,
            probe,
            targets: BTreeSet::new(),
            hovered: None,
            model,
            frames: 0,
        }
    }

    /// Maps a cursor position in logical pixels to the scene and eases the
    /// pointer target toward it.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        let Viewport { width, height } = self.viewport;
        let target = Vector3::new(
            map_range(x, 0.0, width, -width / 2.0, width / 2.0),
            map_range(y, height, 0.0, -height / 2.0, height / 2.0),
            0.0,
        );
        self.pointer.retarget(target);
    }

    /// Hitboxes keep the layout they were built with.
    pub fn on_resize(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            log::debug!("ignoring resize to {width}x{height}");
            return;
        }
        self.viewport = Viewport::new(width, height);
        log::debug!("viewport is now {width}x{height}, fov {:.2}", self.fov());
    }

    pub fn on_pointer_enter(&mut self, id: HitboxId) -> Option<MenuEvent> {
        let event = self.menu.on_pointer_enter(&mut self.world, id)?;
        self.on_menu_event(event);
        Some(event)
    }

    pub fn on_pointer_leave(&mut self, id: HitboxId) -> Option<MenuEvent> {
        let event = self.menu.on_pointer_leave(&mut self.world, id)?;
        self.on_menu_event(event);
        Some(event)
    }

    pub fn on_click(&self, id: HitboxId) -> bool {
        self.menu.on_click(id)
    }

    /// Keeps the active set in step with the menu.
    pub fn on_menu_event(&mut self, event: MenuEvent) {
        match event {
            MenuEvent::Enter(id) => {
                if self.targets.insert(id) {
                    log::debug!("{id} is active");
                }
            }
            MenuEvent::Leave(id) => {
                if self.targets.remove(&id) {
                    log::debug!("{id} is inactive");
                }
            }
        }
    }

    /// Turns cursor motion into enter/leave for builds without DOM events.
    pub fn hover_at(&mut self, x: f32, y: f32) -> Vec<MenuEvent> {
        let now = self.menu.element_at(x, y);
        if now == self.hovered {
            return Vec::new();
        }
        let mut events = Vec::with_capacity(2);
        if let Some(previous) = self.hovered.take() {
            events.extend(self.on_pointer_leave(previous));
        }
        if let Some(next) = now {
            events.extend(self.on_pointer_enter(next));
        }
        self.hovered = now;
        events
    }

    /// Leaves the hovered hitbox, if any. Used when the cursor leaves the window.
    pub fn clear_hover(&mut self) -> Option<MenuEvent> {
        let previous = self.hovered.take()?;
        self.on_pointer_leave(previous)
    }

    /// Advances the scene by `dt` seconds.
    pub fn frame(&mut self, dt: f32) -> FrameStats {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        let pointer = self.pointer.advance(dt);
        let probe_z = self.probe_tween.target().z;
        self.probe_tween
            .retarget(Vector3::new(pointer.x, pointer.y, probe_z));
        let probe_position = self.probe_tween.advance(dt);
        let light_z = self.light_tween.target().z;
        self.light_tween
            .retarget(Vector3::new(pointer.x, pointer.y, light_z));
        self.light_tween.advance(dt);
        self.world.set_position(self.probe, probe_position);

        for id in &self.targets {
            let target = self
                .menu
                .hitbox(*id)
                .and_then(|hitbox| self.world.position(hitbox.body));
            if let Some(target) = target {
                self.field.attract(&mut self.world, target);
            }
        }

        let physics = &self.config.physics;
        let sub_steps = self
            .world
            .step(physics.fixed_timestep, dt, physics.max_sub_steps);
        self.field.sync_transforms(&self.world);
        self.frames += 1;

        FrameStats {
            sub_steps,
            active_targets: self.targets.len(),
            generation: self.field.generation(),
        }
    }

    /// Records the outcome of the model load. The scene runs on either way.
    pub fn on_model_loaded(
        &mut self,
        result: Result<&[MeshData], AssetError>,
    ) -> Option<ModelPlacement> {
        match result {
            Ok(meshes) => {
                let vertices: usize = meshes.iter().map(|m| m.vertices.len()).sum();
                log::info!(
                    "loaded {} ({} meshes, {vertices} vertices)",
                    self.config.model.path,
                    meshes.len()
                );
                let model = &self.config.model;
                let placement = ModelPlacement {
                    position: model.position.into(),
                    rotation: Quaternion::from_angle_x(Rad(model.rotation_x)),
                    scale: model.scale,
                };
                self.model = ModelState::Loaded(placement);
                Some(placement)
            }
            Err(e) => {
                log::error!("continuing without the model: {e}");
                self.model = ModelState::Failed(e.to_string());
                None
            }
        }
    }

    /// Vertical field of view in degrees for the current viewport.
    pub fn fov(&self) -> f32 {
        fov_for_viewport(self.viewport.height, self.config.camera.perspective)
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.aspect()
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn field(&self) -> &BallField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut BallField {
        &mut self.field
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn probe(&self) -> BodyHandle {
        self.probe
    }

    pub fn probe_position(&self) -> Vector3<f32> {
        self.probe_tween.value()
    }

    pub fn light_position(&self) -> Vector3<f32> {
        self.light_tween.value()
    }

    pub fn pointer_target(&self) -> Vector3<f32> {
        self.pointer.target()
    }

    pub fn targets(&self) -> &BTreeSet<HitboxId> {
        &self.targets
    }

    pub fn is_active(&self, id: HitboxId) -> bool {
        self.targets.contains(&id)
    }

    pub fn hovered(&self) -> Option<HitboxId> {
        self.hovered
    }

    pub fn model(&self) -> &ModelState {
        &self.model
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
