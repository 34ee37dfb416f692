use ballpit::{
    HitboxId, MenuEvent, Stage, StageConfig, Viewport,
    camera::fov_for_viewport,
    map_range,
    resources::AssetError,
    stage::ModelState,
};
use cgmath::{InnerSpace, Quaternion, Rad, Rotation3, Vector3};

use crate::common::test_utils::{
    assert_near, example_element, quiet_config, rect, sub_element, viewport,
};

mod common;

fn stage(count: usize) -> Stage {
    Stage::new(
        quiet_config(count),
        viewport(),
        &[example_element(), sub_element(1, rect(400.0, 300.0, 100.0, 20.0))],
    )
}

#[test]
fn map_range_is_exact_at_the_ends() {
    assert_eq!(map_range(0.0, 0.0, 1000.0, -500.0, 500.0), -500.0);
    assert_eq!(map_range(1000.0, 0.0, 1000.0, -500.0, 500.0), 500.0);
    assert_eq!(map_range(500.0, 0.0, 1000.0, -500.0, 500.0), 0.0);
    // Inverted input range.
    assert_eq!(map_range(800.0, 800.0, 0.0, -400.0, 400.0), -400.0);
    assert_eq!(map_range(0.0, 800.0, 0.0, -400.0, 400.0), 400.0);
    // Values outside the input range extrapolate.
    assert_eq!(map_range(2.0, 0.0, 1.0, 0.0, 10.0), 20.0);
}

#[test]
fn map_range_with_an_empty_input_range_returns_out_min() {
    assert_eq!(map_range(3.0, 1.0, 1.0, 7.0, 9.0), 7.0);
    assert_eq!(map_range(3.0, 0.0, f32::INFINITY, 7.0, 9.0), 7.0);
}

#[test]
fn pointer_corners_map_to_scene_corners() {
    let mut stage = stage(0);
    stage.on_pointer_move(0.0, 0.0);
    assert_eq!(stage.pointer_target(), Vector3::new(-500.0, 400.0, 0.0));
    stage.on_pointer_move(1000.0, 800.0);
    assert_eq!(stage.pointer_target(), Vector3::new(500.0, -400.0, 0.0));
    stage.on_pointer_move(500.0, 400.0);
    assert_eq!(stage.pointer_target(), Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn fov_follows_the_viewport_height() {
    let mut stage = stage(0);
    let perspective = stage.config().camera.perspective;
    assert_eq!(stage.fov(), fov_for_viewport(800.0, perspective));
    assert_eq!(stage.aspect(), 1.25);

    stage.on_resize(500.0, 400.0);
    assert_eq!(stage.fov(), fov_for_viewport(400.0, perspective));
    assert_eq!(stage.viewport(), Viewport::new(500.0, 400.0));
}

#[test]
fn degenerate_resizes_are_ignored() {
    let mut stage = stage(0);
    stage.on_resize(0.0, 300.0);
    stage.on_resize(300.0, -1.0);
    assert_eq!(stage.viewport(), viewport());
}

#[test]
fn resizing_keeps_the_hitbox_layout() {
    let mut stage = stage(0);
    let before: Vec<_> = stage.menu().hitboxes().cloned().collect();
    stage.on_resize(640.0, 480.0);
    let after: Vec<_> = stage.menu().hitboxes().cloned().collect();
    assert_eq!(before, after);
}

#[test]
fn active_targets_are_a_set() {
    let mut stage = stage(0);
    assert_eq!(stage.on_pointer_enter(HitboxId(0)), Some(MenuEvent::Enter(HitboxId(0))));
    stage.on_pointer_enter(HitboxId(0));
    assert_eq!(stage.targets().len(), 1);
    assert!(stage.is_active(HitboxId(0)));

    stage.on_pointer_leave(HitboxId(0));
    stage.on_pointer_leave(HitboxId(0));
    assert!(stage.targets().is_empty());

    assert_eq!(stage.on_pointer_enter(HitboxId(9)), None);
    assert!(stage.targets().is_empty());
    assert!(stage.on_click(HitboxId(1)));
    assert!(!stage.on_click(HitboxId(9)));
}

#[test]
fn hovering_a_label_draws_the_balls_toward_it() {
    let mut stage = stage(50);
    stage.on_pointer_enter(HitboxId(0));
    let target = stage.menu().hitbox(HitboxId(0)).unwrap().centre();

    let before = (stage.field().centroid(stage.world()) - target).magnitude();
    for _ in 0..60 {
        let stats = stage.frame(1.0 / 60.0);
        assert_eq!(stats.active_targets, 1);
    }
    let after = (stage.field().centroid(stage.world()) - target).magnitude();
    assert!(after < before, "centroid went from {before} to {after}");
}

#[test]
fn idle_balls_stay_put() {
    let mut stage = stage(5);
    let before: Vec<_> = stage.field().instances().to_vec();
    stage.frame(0.5);
    assert_eq!(stage.field().instances(), before.as_slice());
}

#[test]
fn long_frames_hit_the_sub_step_cap() {
    let mut stage = stage(3);
    let stats = stage.frame(10.0);
    assert_eq!(stats.sub_steps, stage.config().physics.max_sub_steps);
    assert_eq!(stage.frame(0.0).sub_steps, 0);
}

#[test]
fn every_frame_syncs_once() {
    let mut stage = stage(3);
    let start = stage.field().generation();
    for n in 1..=5 {
        let stats = stage.frame(1.0 / 60.0);
        assert_eq!(stats.generation, start + n);
    }
    assert_eq!(stage.frames(), 5);
    // Even a frame with no physics step refreshes the instances.
    assert_eq!(stage.frame(0.0).generation, start + 6);
}

#[test]
fn probe_and_light_catch_up_with_the_pointer() {
    let mut stage = stage(0);
    let light_z = stage.light_position().z;
    stage.on_pointer_move(1000.0, 0.0);

    for _ in 0..30 {
        stage.frame(0.05);
    }

    assert_eq!(stage.probe_position(), Vector3::new(500.0, 400.0, 0.0));
    assert_eq!(stage.light_position(), Vector3::new(500.0, 400.0, light_z));
    let world = stage.world();
    assert_eq!(world.is_static(stage.probe()), Some(true));
    assert_eq!(world.position(stage.probe()), Some(stage.probe_position()));
}

#[test]
fn probe_trails_the_pointer_mid_tween() {
    let mut stage = stage(0);
    stage.on_pointer_move(1000.0, 400.0);
    stage.frame(0.1);
    let probe = stage.probe_position();
    assert!(probe.x > 0.0 && probe.x < 500.0, "probe at {probe:?}");
    assert_near(Vector3::new(0.0, probe.y, probe.z), Vector3::new(0.0, 0.0, 0.0), 1e-4);
}

#[test]
fn model_state_follows_the_load() {
    let config = StageConfig {
        seed: Some(1),
        ..Default::default()
    };
    let mut stage = Stage::new(config.clone(), viewport(), &[]);
    assert_eq!(stage.model(), &ModelState::Pending);

    let placement = stage.on_model_loaded(Ok(&[])).unwrap();
    assert_eq!(placement.position, Vector3::from(config.model.position));
    assert_eq!(
        placement.rotation,
        Quaternion::from_angle_x(Rad(config.model.rotation_x))
    );
    assert_eq!(stage.model(), &ModelState::Loaded(placement));

    let failed = stage.on_model_loaded(Err(AssetError::Empty {
        path: "egg/scene.gltf".to_string(),
    }));
    assert!(failed.is_none());
    assert!(matches!(stage.model(), ModelState::Failed(reason) if reason.contains("egg/scene.gltf")));

    // The scene keeps running without the model.
    stage.frame(1.0 / 60.0);
}

#[test]
fn empty_model_path_disables_the_model() {
    assert_eq!(stage(0).model(), &ModelState::Disabled);
}

#[test]
fn hover_emits_leave_before_enter() {
    let mut stage = stage(0);
    assert_eq!(stage.hover_at(500.0, 125.0), vec![MenuEvent::Enter(HitboxId(0))]);
    assert!(stage.hover_at(510.0, 130.0).is_empty());
    assert_eq!(
        stage.hover_at(450.0, 310.0),
        vec![MenuEvent::Leave(HitboxId(0)), MenuEvent::Enter(HitboxId(1))]
    );
    assert_eq!(stage.hovered(), Some(HitboxId(1)));
    assert!(stage.is_active(HitboxId(1)));
    assert!(!stage.is_active(HitboxId(0)));

    assert_eq!(stage.hover_at(5.0, 5.0), vec![MenuEvent::Leave(HitboxId(1))]);
    assert!(stage.targets().is_empty());
    assert_eq!(stage.clear_hover(), None);

    stage.hover_at(500.0, 125.0);
    assert_eq!(stage.clear_hover(), Some(MenuEvent::Leave(HitboxId(0))));
    assert_eq!(stage.hovered(), None);
}

#[test]
fn seeded_stages_evolve_identically() {
    let (mut a, mut b) = (stage(40), stage(40));
    assert_eq!(a.field().instances(), b.field().instances());

    for stage in [&mut a, &mut b] {
        stage.on_pointer_enter(HitboxId(0));
        stage.on_pointer_move(300.0, 200.0);
        for _ in 0..20 {
            stage.frame(1.0 / 30.0);
        }
    }
    assert_eq!(a.field().instances(), b.field().instances());
}

#[test]
fn stage_sets_up_every_body() {
    let stage = stage(12);
    // Balls plus the probe are simulated; hitbox colliders wait for a hover.
    assert_eq!(stage.world().len(), 13);
    assert_eq!(stage.world().registered(), 15);
    assert_eq!(stage.menu().len(), 2);
}
