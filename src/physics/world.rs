use cgmath::{Vector3, Zero};
use rapier3d::prelude::{
    CCDSolver, Collider, ColliderSet, DefaultBroadPhase, ImpulseJointSet, IntegrationParameters,
    IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline, Real, RigidBody,
    RigidBodySet, Vector, vector,
};

use crate::physics::body::{BodyDescriptor, BodyHandle, Material, Shape};

fn to_rapier(v: Vector3<f32>) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn from_rapier(v: &Vector<Real>) -> Vector3<f32> {
    Vector3::new(v.x, v.y, v.z)
}

/// The rigid-body world: a gravity field and the rapier body and collider sets.
///
/// Bodies are registered once with [`World::create_body`] and then toggled in
/// and out of the simulation with [`World::add_body`] / [`World::remove_body`],
/// which enable and disable the rapier body. Both toggles are idempotent.
pub struct World {
    pub gravity: Vector3<f32>,
    accumulator: f32,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("gravity", &self.gravity)
            .field("accumulator", &self.accumulator)
            .field("registered", &self.registered())
            .field("simulated", &self.len())
            .finish_non_exhaustive()
    }
}

impl World {
    pub fn new(gravity: Vector3<f32>) -> Self {
        Self {
            gravity,
            accumulator: 0.0,
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    fn register(&mut self, desc: &BodyDescriptor, enabled: bool) -> BodyHandle {
        let body = desc.rigid_body(enabled);
        // Without sleeping a drifting field never freezes in place.
        let body = if desc.is_static() { body } else { body.can_sleep(false) };
        let handle = self.bodies.insert(body);
        self.colliders
            .insert_with_parent(desc.collider(), handle, &mut self.bodies);
        BodyHandle(handle)
    }

    /// Registers a body without adding it to the simulation.
    pub fn create_body(&mut self, desc: BodyDescriptor) -> BodyHandle {
        self.register(&desc, false)
    }

    /// Registers a body and adds it to the simulation.
    pub fn spawn(&mut self, desc: BodyDescriptor) -> BodyHandle {
        self.register(&desc, true)
    }

    /// Adds a registered body to the simulation. Returns `false` if it already was.
    pub fn add_body(&mut self, handle: BodyHandle) -> bool {
        self.set_simulated(handle, true)
    }

    /// Takes a body out of the simulation. Returns `false` if it was not simulated.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.set_simulated(handle, false)
    }

    fn set_simulated(&mut self, handle: BodyHandle, simulated: bool) -> bool {
        match self.bodies.get_mut(handle.0) {
            Some(body) if body.is_enabled() != simulated => {
                body.set_enabled(simulated);
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.body(handle).is_some_and(RigidBody::is_enabled)
    }

    fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle.0)
    }

    pub fn position(&self, handle: BodyHandle) -> Option<Vector3<f32>> {
        self.body(handle).map(|body| from_rapier(body.translation()))
    }

    /// Moves a body. Works for static bodies too.
    pub fn set_position(&mut self, handle: BodyHandle, position: Vector3<f32>) -> bool {
        let Some(body) = self.bodies.get_mut(handle.0) else {
            return false;
        };
        body.set_translation(to_rapier(position), true);
        true
    }

    pub fn velocity(&self, handle: BodyHandle) -> Option<Vector3<f32>> {
        self.body(handle).map(|body| from_rapier(body.linvel()))
    }

    pub fn set_velocity(&mut self, handle: BodyHandle, velocity: Vector3<f32>) -> bool {
        match self.bodies.get_mut(handle.0) {
            Some(body) if body.is_dynamic() => {
                body.set_linvel(to_rapier(velocity), true);
                true
            }
            _ => false,
        }
    }

    /// Adds `force` at the centre of mass. Forces are summed until the next
    /// internal step consumes them. Static bodies ignore forces.
    pub fn apply_force(&mut self, handle: BodyHandle, force: Vector3<f32>) {
        if let Some(body) = self.bodies.get_mut(handle.0) {
            if body.is_dynamic() {
                body.add_force(to_rapier(force), true);
            }
        }
    }

    /// Force accumulated since the last internal step.
    pub fn force(&self, handle: BodyHandle) -> Option<Vector3<f32>> {
        self.body(handle).map(|body| from_rapier(&body.user_force()))
    }

    pub fn mass(&self, handle: BodyHandle) -> Option<f32> {
        self.body(handle).map(RigidBody::mass)
    }

    pub fn is_static(&self, handle: BodyHandle) -> Option<bool> {
        self.body(handle).map(RigidBody::is_fixed)
    }

    fn collider(&self, handle: BodyHandle) -> Option<&Collider> {
        self.colliders.get(*self.body(handle)?.colliders().first()?)
    }

    pub fn material(&self, handle: BodyHandle) -> Option<Material> {
        self.collider(handle).map(|collider| Material {
            restitution: collider.restitution(),
            friction: collider.friction(),
        })
    }

    /// Shape of the body's collider.
    pub fn shape(&self, handle: BodyHandle) -> Option<Shape> {
        let collider = self.collider(handle)?;
        let shape = collider.shape();
        if let Some(ball) = shape.as_ball() {
            Some(Shape::Sphere {
                radius: ball.radius,
            })
        } else {
            shape.as_cuboid().map(|cuboid| Shape::Box {
                half_extents: from_rapier(&cuboid.half_extents),
            })
        }
    }

    /// Number of bodies currently simulated.
    pub fn len(&self) -> usize {
        self.bodies.iter().filter(|(_, body)| body.is_enabled()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of registered bodies, simulated or not.
    pub fn registered(&self) -> usize {
        self.bodies.len()
    }

    /// Advances the world by `elapsed` seconds of real time in steps of `fixed_dt`.
    ///
    /// Runs at most `max_sub_steps` internal steps and returns how many ran.
    /// Time that could not be simulated within the cap is dropped instead of
    /// carried into the next call.
    pub fn step(&mut self, fixed_dt: f32, elapsed: f32, max_sub_steps: usize) -> usize {
        if !(fixed_dt.is_finite() && fixed_dt > 0.0) {
            log::warn!("refusing to step with a fixed timestep of {fixed_dt}");
            return 0;
        }
        let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
        self.accumulator += elapsed;

        let mut sub_steps = 0;
        while self.accumulator >= fixed_dt && sub_steps < max_sub_steps {
            self.internal_step(fixed_dt);
            self.accumulator -= fixed_dt;
            sub_steps += 1;
        }
        if sub_steps == max_sub_steps && self.accumulator >= fixed_dt {
            log::debug!(
                "physics fell behind by {:.3}s, dropping the backlog",
                self.accumulator
            );
            self.accumulator %= fixed_dt;
        }
        sub_steps
    }

    fn internal_step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &to_rapier(self.gravity),
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        for (_, body) in self.bodies.iter_mut() {
            if body.user_force() != Vector::zeros() {
                body.reset_forces(false);
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Vector3::zero())
    }
}
