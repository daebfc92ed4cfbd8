//! Projectile lead-point prediction.
//!
//! Given a shooter, a projectile speed and a target that may still be accelerating toward its
//! top speed, find where to aim so the projectile and the target arrive together. The target's
//! motion is modelled in the shooter's frame: constant acceleration until it reaches
//! `max_speed`, constant velocity afterwards.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

use ai_nav::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Returned by [`time_to_max_speed`] when the target never reaches its top speed.
pub const NEVER: f32 = 100_000.0;
/// Longest flight time searched, in seconds.
pub const SEARCH_HORIZON: f32 = 4096.0;
/// Convergence tolerance in world units.
pub const TOLERANCE: f32 = 1.0;
pub const MAX_ITERATIONS: u32 = 64;

/// The shooting side.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Shooter {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Target kinematics.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TargetMotion {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub max_speed: f32,
}

impl TargetMotion {
    /// A target holding its current velocity.
    pub fn coasting(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            acceleration: Vec2::ZERO,
            max_speed: f32::INFINITY,
        }
    }
}

/// Seconds until `|velocity + acceleration * t|` reaches `max_speed`.
///
/// Takes the smallest non-negative root; returns [`NEVER`] when there is none (no
/// acceleration, unreachable speed, or non-finite input).
pub fn time_to_max_speed(velocity: Vec2, acceleration: Vec2, max_speed: f32) -> f32 {
    let a = acceleration.length_squared();
    let b = 2.0 * acceleration.dot(velocity);
    let c = velocity.length_squared() - max_speed * max_speed;
    if a <= f32::EPSILON || !a.is_finite() || !c.is_finite() {
        return NEVER;
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 || discriminant.is_nan() {
        return NEVER;
    }
    let root = discriminant.sqrt();
    let t0 = (-b - root) / (2.0 * a);
    let t1 = (-b + root) / (2.0 * a);
    [t0, t1]
        .into_iter()
        .filter(|t| t.is_finite() && *t >= 0.0)
        .fold(None, |best: Option<f32>, t| Some(best.map_or(t, |b| b.min(t))))
        .unwrap_or(NEVER)
}

/// Relative target motion in the shooter's frame.
#[derive(Debug, Clone, Copy)]
struct Relative {
    position: Vec2,
    velocity: Vec2,
    acceleration: Vec2,
    time_to_max: f32,
}

impl Relative {
    fn new(shooter: &Shooter, target: &TargetMotion) -> Self {
        let velocity = target.velocity - shooter.velocity;
        Self {
            position: target.position - shooter.position,
            velocity,
            acceleration: target.acceleration,
            time_to_max: time_to_max_speed(target.velocity, target.acceleration, target.max_speed),
        }
    }

    fn position_at(&self, t: f32) -> Vec2 {
        let ramp = t.min(self.time_to_max);
        let mut p = self.position + self.velocity * ramp + self.acceleration * (0.5 * ramp * ramp);
        if t > self.time_to_max {
            let top = self.velocity + self.acceleration * self.time_to_max;
            p += top * (t - self.time_to_max);
        }
        p
    }

    /// Compares how far the target has moved when a projectile aimed at its `t` position
    /// lands against how far it had moved at `t`. Negative means the aim undershoots.
    fn test(&self, t: f32, projectile_speed: f32) -> (f32, Vec2) {
        let aim = self.position_at(t);
        let flight = aim.length() / projectile_speed;
        let landing = self.position_at(flight);
        let aimed_offset = (aim - self.position).length();
        let landing_offset = (landing - self.position).length();
        (aimed_offset - landing_offset, landing)
    }
}

/// World position to aim at so a projectile of `projectile_speed` meets the target, or
/// `None` if no meeting point exists within [`SEARCH_HORIZON`].
pub fn predict_target_position(
    shooter: Shooter,
    projectile_speed: f32,
    target: TargetMotion,
) -> Option<Vec2> {
    if !(projectile_speed > 0.0) || !projectile_speed.is_finite() {
        return None;
    }

    let rel = Relative::new(&shooter, &target);
    let (at_horizon, _) = rel.test(SEARCH_HORIZON, projectile_speed);
    if !(at_horizon >= 0.0) {
        return None;
    }

    let (mut lo, mut hi) = (0.0f32, SEARCH_HORIZON);
    for _ in 0..MAX_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        let (difference, at) = rel.test(mid, projectile_speed);
        if difference.abs() < TOLERANCE {
            let predicted = shooter.position + at;
            return predicted.is_finite().then_some(predicted);
        }
        if difference < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    None
}
