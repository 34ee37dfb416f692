//! The ball field: many dynamic spheres drawn with one instanced mesh.
//!
//! Body `i` and instance slot `i` always belong together. The field never owns
//! the bodies; it keeps their handles and reads them back from the [`World`]
//! after every physics step.

use cgmath::{Vector3, Zero};
use rand::Rng;

use crate::{
    config::FieldConfig,
    data_structures::instance::{Instance, InstanceRaw},
    physics::{BodyDescriptor, BodyHandle, Shape, World},
};

/// Extent of the box the balls are scattered in, centred on the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Bounds {
    /// Spawn box for a viewport of `width` x `height` pixels.
    pub fn for_viewport(width: f32, height: f32, config: &FieldConfig) -> Self {
        Self {
            width: width * config.spread,
            height: height * config.spread,
            depth: config.depth,
        }
    }

    pub fn contains(&self, point: Vector3<f32>) -> bool {
        point.x.abs() <= self.width / 2.0
            && point.y.abs() <= self.height / 2.0
            && point.z.abs() <= self.depth / 2.0
    }
}

#[derive(Debug)]
pub struct BallField {
    bodies: Vec<BodyHandle>,
    scales: Vec<f32>,
    instances: Vec<Instance>,
    colour: [f32; 4],
    dirty: bool,
    generation: u64,
}

/// Uniform sample in `[-extent/2, extent/2]`. Unusable extents give `0.0`.
fn spread<R: Rng>(rng: &mut R, extent: f32) -> f32 {
    if extent.is_finite() && extent > 0.0 {
        rng.gen_range(-extent / 2.0..=extent / 2.0)
    } else {
        0.0
    }
}

impl BallField {
    /// Creates `config.count` balls inside `bounds` and spawns them in `world`.
    pub fn initialize<R: Rng>(
        world: &mut World,
        config: &FieldConfig,
        bounds: Bounds,
        rng: &mut R,
    ) -> Self {
        let jitter = config.jitter.max(0.0);
        let mut bodies = Vec::with_capacity(config.count);
        let mut scales = Vec::with_capacity(config.count);
        for _ in 0..config.count {
            let position = Vector3::new(
                spread(rng, bounds.width),
                spread(rng, bounds.height),
                spread(rng, bounds.depth),
            );
            let scale = 1.0 + spread(rng, jitter);
            let body = BodyDescriptor::new(
                config.mass,
                position,
                Shape::Sphere {
                    radius: config.size * scale,
                },
            )
            .with_linear_damping(config.linear_damping)
            .with_material(config.material);
            bodies.push(world.spawn(body));
            scales.push(scale);
        }
        log::info!("spawned {} balls", bodies.len());

        let mut field = Self {
            instances: vec![Instance::new(); bodies.len()],
            bodies,
            scales,
            colour: config.colour,
            dirty: false,
            generation: 0,
        };
        field.sync_transforms(world);
        field
    }

    /// Copies every body's position and its ball's scale into the instance slot.
    ///
    /// Marks the instances dirty once per call, however many slots changed.
    pub fn sync_transforms(&mut self, world: &World) {
        let slots = self.bodies.iter().zip(&self.scales);
        for (instance, (handle, scale)) in self.instances.iter_mut().zip(slots) {
            if let Some(position) = world.position(*handle) {
                instance.position = position;
                instance.scale = Vector3::new(*scale, *scale, *scale);
            }
        }
        self.dirty = true;
        self.generation += 1;
    }

    /// Pulls every ball toward `target` with a force of `target - position`.
    pub fn attract(&self, world: &mut World, target: Vector3<f32>) {
        for handle in &self.bodies {
            if let Some(position) = world.position(*handle) {
                world.apply_force(*handle, target - position);
            }
        }
    }

    /// Returns whether the instances changed since the last call and clears
    /// the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of syncs so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn count(&self) -> usize {
        self.bodies.len()
    }

    pub fn bodies(&self) -> &[BodyHandle] {
        &self.bodies
    }

    /// Uniform scale of each ball, by slot.
    pub fn scales(&self) -> &[f32] {
        &self.scales
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn colour(&self) -> [f32; 4] {
        self.colour
    }

    pub fn raw_instances(&self) -> Vec<InstanceRaw> {
        self.instances
            .iter()
            .map(|instance| instance.to_raw(self.colour))
            .collect()
    }

    /// Mean position of the balls, or the origin for an empty field.
    pub fn centroid(&self, world: &World) -> Vector3<f32> {
        let (sum, n) = self
            .bodies
            .iter()
            .filter_map(|h| world.position(*h))
            .fold((Vector3::zero(), 0usize), |(sum, n), position| {
                (sum + position, n + 1)
            });
        if n == 0 { sum } else { sum / n as f32 }
    }
}
