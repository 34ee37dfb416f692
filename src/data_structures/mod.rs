//! Engine data structures: meshes, textures and instances.
//!
//! - `model` contains vertex layouts, CPU mesh data and uploaded GPU meshes
//! - `texture` wraps the depth attachment
//! - `instance` holds per-instance transformation and colour data
//! - `batch` pairs a model with its GPU instance buffer

pub mod batch;
pub mod instance;
pub mod model;
pub mod texture;
