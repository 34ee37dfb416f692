//! Scene configuration.
//!
//! Every constant the scene uses lives in [`StageConfig`]. The defaults
//! reproduce the stock scene; a TOML file only needs the keys it changes.
//!
//! ```toml
//! seed = 7
//!
//! [field]
//! count = 250
//!
//! [physics]
//! max_sub_steps = 4
//! ```

use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;

use crate::{physics::Material, tween::Ease};

/// `0xRRGGBB` to linear-ish floats in `[0, 1]`.
pub const fn rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

pub const fn rgba(hex: u32) -> [f32; 4] {
    let [r, g, b] = rgb(hex);
    [r, g, b, 1.0]
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Seed for the ball layout. `None` draws one from the OS.
    pub seed: Option<u64>,
    pub field: FieldConfig,
    pub menu: MenuConfig,
    pub physics: PhysicsConfig,
    pub camera: CameraConfig,
    pub light: LightConfig,
    pub scene: SceneConfig,
    pub model: ModelConfig,
}

impl StageConfig {
    pub fn from_toml_str(source: &str) -> anyhow::Result<Self> {
        let config = toml::from_str(source).context("invalid stage configuration")?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        Self::from_toml_str(&source)
    }
}

/// The ball field.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub count: usize,
    /// Base sphere radius before jitter.
    pub size: f32,
    /// The spawn box is `viewport * spread` wide and high.
    pub spread: f32,
    /// Depth of the spawn box.
    pub depth: f32,
    /// Scale factors are drawn from `[1 - jitter/2, 1 + jitter/2]`.
    pub jitter: f32,
    pub mass: f32,
    pub linear_damping: f32,
    pub material: Material,
    pub colour: [f32; 4],
    pub segments: u32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            size: 3.0,
            spread: 2.0 * 1.25,
            depth: 500.0,
            jitter: 0.9,
            mass: 0.4,
            linear_damping: 0.3,
            material: Material {
                restitution: 0.5,
                friction: 0.9,
            },
            colour: rgba(0x0adcd5),
            segments: 16,
        }
    }
}

/// A menu entry for builds without a DOM. Rects are in logical pixels.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MenuItem {
    pub label: String,
    #[serde(default)]
    pub sub: bool,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl MenuItem {
    fn primary(label: &str, left: f32, top: f32, width: f32) -> Self {
        Self {
            label: label.to_string(),
            sub: false,
            left,
            top,
            width,
            height: 96.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// CSS selector of the menu links on the web.
    pub selector: String,
    /// Element id that marks the secondary label style.
    pub sub_id: String,
    pub sub_offset: f32,
    pub primary_text_size: f32,
    pub sub_text_size: f32,
    /// Half depth of a hitbox collider along z.
    pub depth_half_extent: f32,
    /// Thickness of a rendered label slab.
    pub label_depth: f32,
    pub material: Material,
    pub label_colour: [f32; 4],
    pub items: Vec<MenuItem>,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            selector: ".mainNav__link".to_string(),
            sub_id: "sub".to_string(),
            sub_offset: 75.0,
            primary_text_size: 80.0,
            sub_text_size: 30.0,
            depth_half_extent: 300.0,
            label_depth: 1.0,
            material: Material {
                restitution: 0.1,
                friction: 0.2,
            },
            label_colour: rgba(0x70c5b2),
            items: vec![
                MenuItem::primary("Work", 120.0, 140.0, 260.0),
                MenuItem::primary("About", 120.0, 260.0, 300.0),
                MenuItem::primary("Contact", 120.0, 380.0, 390.0),
                MenuItem {
                    label: "Imprint".to_string(),
                    sub: true,
                    left: 120.0,
                    top: 440.0,
                    width: 140.0,
                    height: 36.0,
                },
            ],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: [f32; 3],
    pub fixed_timestep: f32,
    pub max_sub_steps: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [-1.0, 1.0, -1.0],
            fixed_timestep: crate::physics::FIXED_TIMESTEP,
            max_sub_steps: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Distance used to derive the field of view from the viewport height.
    pub perspective: f32,
    pub near: f32,
    pub far: f32,
    pub eye: [f32; 3],
    pub target: [f32; 3],
    /// Radians per dragged pixel.
    pub rotate_speed: f32,
    /// Relative distance change per wheel line.
    pub zoom_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            perspective: 3000.0,
            near: 10.0,
            far: 6000.0,
            eye: [-2200.0, -200.0, 2000.0],
            target: [0.0, 0.0, 0.0],
            rotate_speed: 0.005,
            zoom_speed: 0.1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub colour: [f32; 3],
    pub intensity: f32,
    pub ambient: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [200.0, 200.0, 400.0],
            colour: rgb(0xffffff),
            intensity: 0.5,
            ambient: rgb(0xeeeeee),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Id of the canvas element on the web.
    pub canvas_id: String,
    pub clear_colour: [f32; 3],
    pub fog_colour: [f32; 3],
    pub fog_near: f32,
    pub fog_far: f32,
    pub probe_radius: f32,
    /// Seconds for the pointer target to catch up with the cursor.
    pub pointer_tween: f32,
    /// Seconds for the probe and light to catch up with the pointer target.
    pub probe_tween: f32,
    pub ease: Ease,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            canvas_id: "stage".to_string(),
            clear_colour: rgb(0xf0e68c),
            fog_colour: rgb(0x202533),
            fog_near: 1.0,
            fog_far: 6000.0,
            probe_radius: 150.0,
            pointer_tween: 0.5,
            probe_tween: 0.5,
            ease: Ease::Power1Out,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path below `assets/`. An empty path disables the model.
    pub path: String,
    pub rotation_x: f32,
    pub position: [f32; 3],
    pub scale: f32,
    pub colour: [f32; 4],
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "egg/scene.gltf".to_string(),
            rotation_x: 1.333,
            position: [-100.0, -80.0, 0.0],
            scale: 1.0,
            colour: rgba(0xcc8017),
        }
    }
}
