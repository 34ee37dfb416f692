#![allow(dead_code)]

use ballpit::{
    StageConfig,
    config::FieldConfig,
    menu::{ElementRect, HitboxId, LabelStyle, MenuElement, Viewport},
};
use cgmath::Vector3;
use rand::{SeedableRng, rngs::StdRng};

pub(crate) const SEED: u64 = 0xba11_5eed;

pub(crate) fn rng() -> StdRng {
    StdRng::seed_from_u64(SEED)
}

/// The viewport used by the hitbox examples: 1000 x 800 logical pixels.
pub(crate) fn viewport() -> Viewport {
    Viewport::new(1000.0, 800.0)
}

pub(crate) fn field_config(count: usize) -> FieldConfig {
    FieldConfig {
        count,
        ..Default::default()
    }
}

/// A small, seeded scene without gravity or model so tests only see the
/// forces they apply.
pub(crate) fn quiet_config(count: usize) -> StageConfig {
    let mut config = StageConfig {
        seed: Some(SEED),
        ..Default::default()
    };
    config.field.count = count;
    config.physics.gravity = [0.0, 0.0, 0.0];
    config.scene.probe_radius = 1.0;
    config.model.path.clear();
    config
}

pub(crate) fn rect(left: f32, top: f32, width: f32, height: f32) -> ElementRect {
    ElementRect {
        left,
        top,
        width,
        height,
    }
}

pub(crate) fn element(id: u32, rect: ElementRect) -> MenuElement {
    MenuElement {
        id: HitboxId(id),
        label: format!("label {id}"),
        style: LabelStyle::Primary,
        rect: Some(rect),
    }
}

pub(crate) fn sub_element(id: u32, rect: ElementRect) -> MenuElement {
    MenuElement {
        style: LabelStyle::Sub,
        ..element(id, rect)
    }
}

pub(crate) fn detached_element(id: u32) -> MenuElement {
    MenuElement {
        rect: None,
        ..element(id, rect(0.0, 0.0, 0.0, 0.0))
    }
}

/// The example element: `{left: 400, top: 100, width: 200, height: 50}`.
pub(crate) fn example_element() -> MenuElement {
    element(0, rect(400.0, 100.0, 200.0, 50.0))
}

#[track_caller]
pub(crate) fn assert_near(actual: Vector3<f32>, expected: Vector3<f32>, eps: f32) {
    let diff = actual - expected;
    assert!(
        diff.x.abs() <= eps && diff.y.abs() <= eps && diff.z.abs() <= eps,
        "{actual:?} is not within {eps} of {expected:?}"
    );
}
