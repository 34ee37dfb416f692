//! Body descriptions, collision shapes and surface materials.

use rapier3d::{
    dynamics::CoefficientCombineRule,
    prelude::{ColliderBuilder, RigidBodyBuilder, RigidBodyHandle, vector},
};

/// Handle of a body registered with a [`World`](super::World).
///
/// Handles stay valid for the lifetime of the world; removing a body from the
/// simulation only disables it, so the same handle can be re-added later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub(crate) RigidBodyHandle);

/// Collision shape attached to a body. Boxes are axis aligned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    Box { half_extents: cgmath::Vector3<f32> },
}

/// Surface properties. Contact coefficients are the product of both materials.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct Material {
    pub restitution: f32,
    pub friction: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            restitution: 0.3,
            friction: 0.3,
        }
    }
}

/// Everything needed to register a body.
///
/// A mass of `0.0` makes the body static: it takes part in collisions as an
/// immovable obstacle but is never integrated. Static bodies can still be
/// moved by setting their position (the pointer probe works this way).
/// Bodies never rotate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyDescriptor {
    pub mass: f32,
    pub position: cgmath::Vector3<f32>,
    pub shape: Shape,
    pub material: Material,
    /// Fraction of velocity lost per second, in `[0, 1]`.
    pub linear_damping: f32,
}

impl BodyDescriptor {
    pub fn new(mass: f32, position: cgmath::Vector3<f32>, shape: Shape) -> Self {
        let mass = if mass.is_finite() { mass.max(0.0) } else { 0.0 };
        Self {
            mass,
            position,
            shape,
            material: Material::default(),
            linear_damping: 0.01,
        }
    }

    /// Shorthand for a body with zero mass.
    pub fn fixed(position: cgmath::Vector3<f32>, shape: Shape) -> Self {
        Self::new(0.0, position, shape)
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = if damping.is_finite() {
            damping.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    pub fn is_static(&self) -> bool {
        self.mass == 0.0
    }

    /// Rapier damps with `v / (1 + c * dt)` per step, which tracks
    /// `v * exp(-c * t)`. Pick `c` so a second of damping removes
    /// `linear_damping` of the velocity.
    fn damping_coefficient(&self) -> f32 {
        if self.linear_damping >= 1.0 {
            return f32::MAX;
        }
        -(1.0 - self.linear_damping).ln()
    }

    pub(crate) fn rigid_body(&self, enabled: bool) -> RigidBodyBuilder {
        let p = self.position;
        let builder = if self.is_static() {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
                .linear_damping(self.damping_coefficient())
                .lock_rotations()
        };
        builder
            .translation(vector![p.x, p.y, p.z])
            .enabled(enabled)
    }

    pub(crate) fn collider(&self) -> ColliderBuilder {
        let builder = match self.shape {
            Shape::Sphere { radius } => ColliderBuilder::ball(radius.max(f32::EPSILON)),
            Shape::Box { half_extents: h } => ColliderBuilder::cuboid(
                h.x.max(f32::EPSILON),
                h.y.max(f32::EPSILON),
                h.z.max(f32::EPSILON),
            ),
        };
        let builder = builder
            .restitution(self.material.restitution)
            .friction(self.material.friction)
            .restitution_combine_rule(CoefficientCombineRule::Multiply)
            .friction_combine_rule(CoefficientCombineRule::Multiply);
        if self.is_static() {
            builder
        } else {
            builder.mass(self.mass)
        }
    }
}
