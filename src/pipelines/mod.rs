//! Render pipelines.
//!
//! - `basic` builds the lit, instanced pipeline every mesh in the scene uses
//! - `light` owns the point/ambient light uniform and its bind group

pub mod basic;
pub mod light;
