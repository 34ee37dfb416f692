use ballpit::physics::{BodyDescriptor, FIXED_TIMESTEP, Material, Shape, World};
use cgmath::{InnerSpace, Vector3, Zero};

use crate::common::test_utils::assert_near;

mod common;

fn ball(position: Vector3<f32>) -> BodyDescriptor {
    BodyDescriptor::new(1.0, position, Shape::Sphere { radius: 1.0 }).with_linear_damping(0.0)
}

fn run(world: &mut World, steps: usize) {
    for _ in 0..steps {
        world.step(FIXED_TIMESTEP, FIXED_TIMESTEP, 1);
    }
}

#[test]
fn add_and_remove_are_idempotent() {
    let mut world = World::default();
    let handle = world.create_body(ball(Vector3::zero()));
    assert!(!world.contains(handle));
    assert_eq!(world.len(), 0);

    assert!(world.add_body(handle));
    assert!(!world.add_body(handle));
    assert_eq!(world.len(), 1);

    assert!(world.remove_body(handle));
    assert!(!world.remove_body(handle));
    assert_eq!(world.len(), 0);
    assert_eq!(world.registered(), 1);
}

#[test]
fn removed_body_is_not_simulated() {
    let mut world = World::new(Vector3::new(0.0, -10.0, 0.0));
    let handle = world.spawn(ball(Vector3::zero()));
    world.remove_body(handle);

    world.step(FIXED_TIMESTEP, 1.0, 100);
    assert_eq!(world.position(handle), Some(Vector3::zero()));
    assert_eq!(world.velocity(handle), Some(Vector3::zero()));
}

#[test]
fn sub_steps_are_capped_and_the_backlog_dropped() {
    let mut world = World::default();
    world.spawn(ball(Vector3::zero()));

    assert_eq!(world.step(0.01, 1.0, 5), 5);
    // The unsimulated remainder does not carry over.
    assert_eq!(world.step(0.01, 0.0, 5), 0);
}

#[test]
fn partial_steps_accumulate() {
    let mut world = World::default();
    assert_eq!(world.step(0.1, 0.06, 10), 0);
    assert_eq!(world.step(0.1, 0.06, 10), 1);
}

#[test]
fn invalid_elapsed_time_runs_nothing() {
    let mut world = World::default();
    assert_eq!(world.step(FIXED_TIMESTEP, f32::NAN, 10), 0);
    assert_eq!(world.step(FIXED_TIMESTEP, -1.0, 10), 0);
    assert_eq!(world.step(0.0, 1.0, 10), 0);
    assert_eq!(world.step(f32::NAN, 1.0, 10), 0);
}

#[test]
fn static_bodies_do_not_move() {
    let mut world = World::new(Vector3::new(0.0, -10.0, 0.0));
    let handle = world.spawn(BodyDescriptor::fixed(
        Vector3::new(1.0, 2.0, 3.0),
        Shape::Sphere { radius: 1.0 },
    ));
    world.apply_force(handle, Vector3::new(100.0, 0.0, 0.0));

    world.step(FIXED_TIMESTEP, 0.5, 100);
    assert_eq!(world.is_static(handle), Some(true));
    assert_eq!(world.position(handle), Some(Vector3::new(1.0, 2.0, 3.0)));
    assert_eq!(world.force(handle), Some(Vector3::zero()));
}

#[test]
fn static_bodies_can_be_moved_by_hand() {
    let mut world = World::default();
    let handle = world.spawn(BodyDescriptor::fixed(
        Vector3::zero(),
        Shape::Sphere { radius: 1.0 },
    ));
    assert!(world.set_position(handle, Vector3::new(4.0, 5.0, 6.0)));
    run(&mut world, 3);
    assert_eq!(world.position(handle), Some(Vector3::new(4.0, 5.0, 6.0)));
}

#[test]
fn forces_are_cleared_after_each_step() {
    let mut world = World::default();
    let handle = world.spawn(ball(Vector3::zero()));
    world.apply_force(handle, Vector3::new(2.0, 0.0, 0.0));
    world.apply_force(handle, Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(world.force(handle), Some(Vector3::new(3.0, 0.0, 0.0)));

    assert_eq!(world.step(0.5, 0.5, 1), 1);
    assert_eq!(world.force(handle), Some(Vector3::zero()));
    assert_near(world.velocity(handle).unwrap(), Vector3::new(1.5, 0.0, 0.0), 1e-4);

    // Without a new force the velocity stays put.
    world.step(0.5, 0.5, 1);
    assert_near(world.velocity(handle).unwrap(), Vector3::new(1.5, 0.0, 0.0), 1e-4);
}

#[test]
fn gravity_accelerates_undamped_bodies() {
    let gravity = Vector3::new(-1.0, 1.0, -1.0);
    let mut world = World::new(gravity);
    let handle = world.spawn(ball(Vector3::zero()));

    run(&mut world, 60);
    assert_near(world.velocity(handle).unwrap(), gravity, 1e-3);
    // One second of free fall covers about g / 2.
    assert_near(world.position(handle).unwrap(), gravity * 0.5, 2e-2);
}

#[test]
fn damping_removes_its_fraction_per_second() {
    let mut world = World::default();
    let handle = world.spawn(
        BodyDescriptor::new(1.0, Vector3::zero(), Shape::Sphere { radius: 1.0 })
            .with_linear_damping(0.5),
    );
    world.set_velocity(handle, Vector3::new(4.0, 0.0, 0.0));

    run(&mut world, 60);
    assert_near(world.velocity(handle).unwrap(), Vector3::new(2.0, 0.0, 0.0), 5e-2);
}

#[test]
fn damping_is_clamped() {
    let body = BodyDescriptor::new(1.0, Vector3::zero(), Shape::Sphere { radius: 1.0 });
    assert_eq!(body.with_linear_damping(3.0).linear_damping, 1.0);
    assert_eq!(body.with_linear_damping(-1.0).linear_damping, 0.0);
    assert_eq!(body.with_linear_damping(f32::NAN).linear_damping, 0.0);
}

#[test]
fn sphere_comes_to_rest_on_a_static_box() {
    let mut world = World::new(Vector3::new(0.0, -10.0, 0.0));
    let floor = world.spawn(
        BodyDescriptor::fixed(
            Vector3::zero(),
            Shape::Box {
                half_extents: Vector3::new(10.0, 1.0, 10.0),
            },
        )
        .with_material(Material {
            restitution: 0.0,
            friction: 0.5,
        }),
    );
    let ball = world.spawn(ball(Vector3::new(0.0, 3.0, 0.0)));

    run(&mut world, 300);

    let position = world.position(ball).unwrap();
    assert!(position.y > 1.5, "ball sank into the floor: {position:?}");
    assert!(position.y < 2.5, "ball never landed: {position:?}");
    assert_eq!(world.position(floor), Some(Vector3::zero()));
}

#[test]
fn rebound_speed_is_the_product_of_both_restitutions() {
    let mut world = World::default();
    world.spawn(
        BodyDescriptor::fixed(
            Vector3::new(3.0, 0.0, 0.0),
            Shape::Box {
                half_extents: Vector3::new(0.5, 5.0, 5.0),
            },
        )
        .with_material(Material {
            restitution: 0.5,
            friction: 0.0,
        }),
    );
    let ball = world.spawn(ball(Vector3::zero()).with_material(Material {
        restitution: 0.8,
        friction: 0.0,
    }));
    world.set_velocity(ball, Vector3::new(6.0, 0.0, 0.0));

    // Touches the wall after 15 steps, then flies back.
    run(&mut world, 60);

    let velocity = world.velocity(ball).unwrap();
    let expected = -6.0 * 0.8 * 0.5;
    assert!(
        (velocity.x - expected).abs() < 0.3,
        "rebounded at {velocity:?}, expected {expected}"
    );
}

#[test]
fn sliding_friction_is_the_product_of_both_frictions() {
    let g = 10.0;
    let mut world = World::new(Vector3::new(0.0, -g, 0.0));
    world.spawn(
        BodyDescriptor::fixed(
            Vector3::zero(),
            Shape::Box {
                half_extents: Vector3::new(50.0, 1.0, 50.0),
            },
        )
        .with_material(Material {
            restitution: 0.0,
            friction: 0.4,
        }),
    );
    let ball = world.spawn(ball(Vector3::new(0.0, 2.0, 0.0)).with_material(Material {
        restitution: 0.0,
        friction: 0.5,
    }));
    world.set_velocity(ball, Vector3::new(5.0, 0.0, 0.0));

    run(&mut world, 30);

    // Coulomb friction takes mu * g * t off the sliding speed.
    let mu = 0.4 * 0.5;
    let expected = 5.0 - mu * g * 0.5;
    let velocity = world.velocity(ball).unwrap();
    assert!(
        (velocity.x - expected).abs() < 0.2,
        "slid at {velocity:?}, expected {expected}"
    );
}

#[test]
fn overlapping_spheres_separate() {
    let mut world = World::default();
    let a = world.spawn(ball(Vector3::new(-0.5, 0.0, 0.0)));
    let b = world.spawn(ball(Vector3::new(0.5, 0.0, 0.0)));

    run(&mut world, 120);

    let (pa, pb) = (world.position(a).unwrap(), world.position(b).unwrap());
    assert!(pa.x < -0.5 && pb.x > 0.5);
    assert!((pb - pa).magnitude() >= 1.9, "still overlapping: {pa:?} {pb:?}");
}

#[test]
fn spheres_do_not_collide_with_removed_bodies() {
    let mut world = World::default();
    let wall = world.create_body(BodyDescriptor::fixed(
        Vector3::new(2.0, 0.0, 0.0),
        Shape::Box {
            half_extents: Vector3::new(0.5, 5.0, 5.0),
        },
    ));
    let ball = world.spawn(ball(Vector3::zero()));
    world.set_velocity(ball, Vector3::new(3.0, 0.0, 0.0));

    run(&mut world, 60);

    assert!(!world.contains(wall));
    assert_near(world.position(ball).unwrap(), Vector3::new(3.0, 0.0, 0.0), 1e-3);
}

#[test]
fn a_long_drift_keeps_every_frame_within_the_step_cap() {
    let mut world = World::new(Vector3::new(-1.0, 1.0, -1.0));
    let balls: Vec<_> = (0..64)
        .map(|i| {
            let (x, y) = ((i % 8) as f32 * 3.0, (i / 8) as f32 * 3.0);
            world.spawn(ball(Vector3::new(x, y, 0.0)))
        })
        .collect();

    // Two minutes of drift at 60 fps.
    for _ in 0..7200 {
        assert_eq!(world.step(FIXED_TIMESTEP, FIXED_TIMESTEP, 3), 1);
    }
    for handle in balls {
        let position = world.position(handle).unwrap();
        assert!(position.x < -7000.0 && position.y > 7000.0, "{position:?}");
    }
}
