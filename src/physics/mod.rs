//! Rigid-body simulation on top of rapier.
//!
//! The scene only needs dynamic spheres, static spheres and boxes, gravity,
//! linear damping and accumulated forces. Contacts, restitution and friction
//! come from rapier; this module maps the scene's bodies onto it and runs the
//! fixed-timestep loop.
//!
//! - `body` holds [`BodyDescriptor`], [`Shape`], [`Material`] and [`BodyHandle`]
//! - `world` owns the rapier sets and advances them on a fixed timestep

pub mod body;
pub mod world;

pub use body::{BodyDescriptor, BodyHandle, Material, Shape};
pub use world::World;

/// Nominal internal timestep.
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;
