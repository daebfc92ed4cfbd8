use std::f32::consts::TAU;
use std::sync::Arc;
use std::time::Duration;

use ai_core::rng::{streams, DeterministicRng};
use ai_core::TickContext;
use ai_intercept::{Shooter, TargetMotion};
use ai_nav::Vec2;

use super::misc::{applied, body_gap, turn_to_face};
use super::{AimingMethod, TaskStatus};
use crate::{AgentWorld, AiController, Behavior};

/// Projectile speed assumed for weapons that report none.
pub const DEFAULT_MUZZLE_SPEED: f32 = 10.0;

/// Shooters moving slower than this (squared) hold still while aiming.
const DRIFT_SPEED_SQ: f32 = 0.001;

const SPRAY_SWEEPING: i32 = 1;

pub(super) fn shoot_at_target<W: AgentWorld>(
    ctx: &TickContext,
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    aiming: AimingMethod,
) -> TaskStatus {
    let agent = ai.agent();
    let Some(target) = world.resolve(ai.target()) else {
        return TaskStatus::Failure;
    };
    let (Some(weapon), Some(pos), Some(target_pos)) = (
        world.weapon(agent),
        world.position(agent),
        world.position(target),
    ) else {
        return TaskStatus::Failure;
    };

    let aim = match aiming {
        AimingMethod::Forward => {
            world.try_use_weapon(agent);
            return TaskStatus::Success;
        }
        AimingMethod::Random => *ai.scratch_mut().aim.get_or_insert_with(|| {
            let mut rng = ctx.rng_for_agent(agent, streams::AIM);
            Vec2::from_angle(rng.next_f32_unit() * TAU)
        }),
        AimingMethod::FaceTarget => (target_pos - pos).normalize_or_zero(),
        AimingMethod::LeadTarget => {
            let speed = if weapon.muzzle_speed > 0.0 {
                weapon.muzzle_speed
            } else {
                DEFAULT_MUZZLE_SPEED
            };
            let shooter = Shooter {
                position: pos,
                velocity: world.velocity(agent).unwrap_or(Vec2::ZERO),
            };
            let motion = TargetMotion {
                position: target_pos,
                velocity: world.velocity(target).unwrap_or(Vec2::ZERO),
                acceleration: world.acceleration(target).unwrap_or(Vec2::ZERO),
                max_speed: world.max_speed(target).unwrap_or(f32::INFINITY),
            };
            match ai_intercept::predict_target_position(shooter, speed, motion) {
                Some(lead) => (lead - pos).normalize_or_zero(),
                None => return TaskStatus::Failure,
            }
        }
    };

    let facing = turn_to_face(ctx, agent, aim, world);
    if world
        .velocity(agent)
        .is_some_and(|v| v.length_squared() > DRIFT_SPEED_SQ)
    {
        if let Some(forward) = world.forward(agent) {
            world.accelerate(agent, forward);
        }
    }
    if !facing {
        return TaskStatus::Continue;
    }
    world.try_use_weapon(agent);
    TaskStatus::Success
}

/// Swings to one edge of the arc around the target, then sweeps to the other edge firing
/// every tick.
pub(super) fn spray_target<W: AgentWorld>(
    ctx: &TickContext,
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    spray_angle_degrees: f32,
) -> TaskStatus {
    let agent = ai.agent();
    let Some(target) = world.resolve(ai.target()) else {
        return TaskStatus::Failure;
    };
    let (Some(pos), Some(target_pos)) = (world.position(agent), world.position(target)) else {
        return TaskStatus::Failure;
    };
    if world.weapon(agent).is_none() {
        return TaskStatus::Failure;
    }

    let to_target = (target_pos - pos).normalize_or_zero();
    let half = (spray_angle_degrees * 0.5).to_radians();
    if ai.task_state() != SPRAY_SWEEPING {
        if turn_to_face(ctx, agent, to_target.rotated(-half), world) {
            ai.set_task_state(SPRAY_SWEEPING);
        }
        return TaskStatus::Continue;
    }

    let done = turn_to_face(ctx, agent, to_target.rotated(half), world);
    world.try_use_weapon(agent);
    if done {
        TaskStatus::Success
    } else {
        TaskStatus::Continue
    }
}

pub(super) fn suicide<W: AgentWorld>(
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    effect: Option<&str>,
) -> TaskStatus {
    let agent = ai.agent();
    let pos = world.position(agent);
    world.kill(agent);
    if let (Some(effect), Some(pos)) = (effect, pos) {
        world.spawn_effect(pos, effect);
    }
    TaskStatus::Success
}

pub(super) fn condition_on_self<W: AgentWorld>(
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    condition: &str,
    duration: Duration,
) -> TaskStatus {
    applied(world.apply_condition(ai.agent(), condition, duration))
}

pub(super) fn condition_on_target<W: AgentWorld>(
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    condition: &str,
    duration: Duration,
    range: f32,
) -> TaskStatus {
    let agent = ai.agent();
    let Some(target) = world.resolve(ai.target()) else {
        return TaskStatus::Failure;
    };
    if !body_gap(world, agent, target).is_some_and(|gap| gap <= range) {
        return TaskStatus::Failure;
    }
    applied(world.apply_condition(target, condition, duration))
}

pub(super) fn set_target_behavior<W: AgentWorld>(
    ctx: &TickContext,
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    behavior: Option<&Arc<Behavior>>,
) -> TaskStatus {
    let Some(target) = world.resolve(ai.target()) else {
        return TaskStatus::Failure;
    };
    let Some(controller) = world.controller_mut(target) else {
        return TaskStatus::Failure;
    };
    controller.set_behavior(ctx, behavior.cloned());
    TaskStatus::Success
}
