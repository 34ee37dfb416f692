//! Time-based interpolation of vectors.
//!
//! A [`Tween`] moves a value from where it currently is toward a target over a
//! fixed duration. Retargeting starts a new leg from the current value, so a
//! stream of pointer updates produces smooth motion instead of jumps.

use cgmath::Vector3;

/// Easing curve applied to the normalised progress `t` in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    /// Quadratic ease out: `1 - (1 - t)^2`.
    #[default]
    Power1Out,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1Out => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tween {
    from: Vector3<f32>,
    to: Vector3<f32>,
    value: Vector3<f32>,
    duration: f32,
    elapsed: f32,
    ease: Ease,
}

impl Tween {
    /// A tween resting at `value`.
    pub fn new(value: Vector3<f32>, duration: f32, ease: Ease) -> Self {
        Self {
            from: value,
            to: value,
            value,
            duration: duration.max(0.0),
            elapsed: 0.0,
            ease,
        }
    }

    pub fn value(&self) -> Vector3<f32> {
        self.value
    }

    pub fn target(&self) -> Vector3<f32> {
        self.to
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Starts a new leg from the current value toward `target`.
    ///
    /// Returns `false` and leaves the running leg untouched when `target` is
    /// already the destination.
    pub fn retarget(&mut self, target: Vector3<f32>) -> bool {
        if target == self.to {
            return false;
        }
        self.from = self.value;
        self.to = target;
        self.elapsed = 0.0;
        true
    }

    /// Moves the value to `target` immediately.
    pub fn snap(&mut self, target: Vector3<f32>) {
        self.from = target;
        self.to = target;
        self.value = target;
        self.elapsed = self.duration;
    }

    /// Advances the clock by `dt` seconds and returns the new value.
    pub fn advance(&mut self, dt: f32) -> Vector3<f32> {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed = (self.elapsed + dt).min(self.duration);
        }
        self.value = if self.duration <= 0.0 || self.elapsed >= self.duration {
            self.to
        } else {
            let t = self.ease.apply(self.elapsed / self.duration);
            self.from + (self.to - self.from) * t
        };
        self.value
    }
}
