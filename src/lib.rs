//! ballpit
//!
//! An interactive scene of physics-driven, instanced spheres. The balls drift
//! under a skewed gravity, get pushed around by a probe that follows the
//! cursor and flock toward whichever menu label the pointer is over. Menu
//! labels come from the page (web) or the configuration (native) and are
//! turned into static colliders that only exist in the simulation while
//! hovered.
//!
//! High-level modules
//! - `physics`: rapier-backed rigid bodies on a fixed timestep
//! - `field`: the ball field and its instance slots
//! - `menu`: screen rectangles mapped to scene hitboxes
//! - `stage`: per-frame orchestration of pointer, tweens, forces and physics
//! - `tween`: eased interpolation used for the pointer and the light
//! - `config`: every scene constant, loadable from TOML
//! - `camera`: orbit camera, projection and the camera uniform
//! - `context`: central GPU and window context that owns device/queue/pipeline
//! - `data_structures`: meshes, instances and the depth texture
//! - `pipelines`: the lit instanced pipeline and the light uniform
//! - `resources`: procedural meshes and glTF loading
//! - `render`: render composition for the frame loop
//! - `flow`: the winit application and the `run` entry point
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod field;
pub mod flow;
pub mod menu;
pub mod physics;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod stage;
pub mod tween;

// Re-exports commonly used types for convenience in downstream code.
pub use config::StageConfig;
pub use flow::run;
pub use menu::{HitboxId, MenuElement, MenuEvent, Viewport};
pub use stage::{FrameStats, Stage, map_range};
