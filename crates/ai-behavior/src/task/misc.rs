use std::time::Duration;

use ai_core::TickContext;
use ai_nav::Vec2;

use super::{TaskStatus, FACING_DOT};
use crate::{AgentWorld, AiController, Factions, SetOperation};

/// Gap between the two bodies.
pub(super) fn body_gap<W: AgentWorld>(world: &W, a: W::Agent, b: W::Agent) -> Option<f32> {
    let dist = world.position(a)?.distance(world.position(b)?);
    Some(dist - world.radius(a).unwrap_or(0.0) - world.radius(b).unwrap_or(0.0))
}

pub(super) fn wait<A: ai_core::AgentId>(
    ctx: &TickContext,
    ai: &mut AiController<A>,
    duration: Duration,
    interrupt_locomotion: bool,
) -> TaskStatus {
    if interrupt_locomotion {
        ai.interrupt_locomotion();
    }
    if ctx.since(ai.task_started_at()) >= duration {
        TaskStatus::Success
    } else {
        TaskStatus::Continue
    }
}

/// Turns toward `aim`; true once facing it.
pub(super) fn turn_to_face<W: AgentWorld>(
    ctx: &TickContext,
    agent: W::Agent,
    aim: Vec2,
    world: &mut W,
) -> bool {
    if aim == Vec2::ZERO {
        return true;
    }
    world.turn_towards(agent, aim, ctx.dt_seconds);
    world
        .forward(agent)
        .is_some_and(|forward| forward.dot(aim) >= FACING_DOT)
}

pub(super) fn face_target<W: AgentWorld>(
    ctx: &TickContext,
    ai: &mut AiController<W::Agent>,
    world: &mut W,
) -> TaskStatus {
    let agent = ai.agent();
    let Some(target) = world.resolve(ai.target()) else {
        return TaskStatus::Failure;
    };
    let (Some(pos), Some(target_pos)) = (world.position(agent), world.position(target)) else {
        return TaskStatus::Failure;
    };
    if turn_to_face(ctx, agent, (target_pos - pos).normalize_or_zero(), world) {
        TaskStatus::Success
    } else {
        TaskStatus::Continue
    }
}

pub(super) fn attach_to_target<W: AgentWorld>(
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    range: f32,
) -> TaskStatus {
    ai.interrupt_locomotion();
    let agent = ai.agent();
    let Some(target) = world.resolve(ai.target()) else {
        return TaskStatus::Failure;
    };
    if world.parent(target) == Some(agent) {
        return TaskStatus::Failure;
    }
    if world.parent(agent) == Some(target) {
        return TaskStatus::Success;
    }
    let in_reach = body_gap(world, agent, target).is_some_and(|gap| gap <= range);
    if in_reach && world.attach(agent, target) {
        TaskStatus::Success
    } else {
        TaskStatus::Failure
    }
}

pub(super) fn clone_self<W: AgentWorld>(
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    relative_direction: Vec2,
) -> TaskStatus {
    let agent = ai.agent();
    let (Some(pos), Some(forward)) = (world.position(agent), world.forward(agent)) else {
        return TaskStatus::Failure;
    };
    let radius = world.radius(agent).unwrap_or(0.0);
    let direction = (forward * relative_direction.x + forward.perp() * relative_direction.y)
        .normalize_or_zero();
    let spot = pos + direction * (radius * 2.0 + 10.0);

    if !world.is_inside_map(spot) {
        return TaskStatus::Failure;
    }
    match world.clone_actor(agent, spot) {
        Some(_) => TaskStatus::Success,
        None => TaskStatus::Failure,
    }
}

pub(super) fn heal<W: AgentWorld>(
    ctx: &TickContext,
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    patient: Option<W::Agent>,
    health_per_second: f32,
    duration: Duration,
    can_revive: bool,
) -> TaskStatus {
    let Some(patient) = world.resolve(patient) else {
        return TaskStatus::Failure;
    };
    if ctx.since(ai.task_started_at()) >= duration {
        return TaskStatus::Success;
    }
    let Some(health) = world.health(patient) else {
        return TaskStatus::Failure;
    };

    if !world.is_alive(patient) {
        if !can_revive {
            return TaskStatus::Failure;
        }
        world.resurrect(patient);
    }
    let healed = (health.current + health_per_second * ctx.dt_seconds).min(health.max);
    world.set_health(patient, healed);
    TaskStatus::Continue
}

pub(super) fn set_factions<W: AgentWorld>(
    world: &mut W,
    who: Option<W::Agent>,
    factions: Factions,
    operation: SetOperation,
) -> TaskStatus {
    let Some(who) = world.resolve(who) else {
        return TaskStatus::Failure;
    };
    let current = world.factions(who).unwrap_or_default();
    world.set_factions(who, operation.apply(current, factions));
    TaskStatus::Success
}

pub(super) fn applied(ok: bool) -> TaskStatus {
    if ok {
        TaskStatus::Success
    } else {
        TaskStatus::Failure
    }
}

pub(super) fn set_class<W: AgentWorld>(
    world: &mut W,
    who: Option<W::Agent>,
    class: &str,
) -> TaskStatus {
    match world.resolve(who) {
        Some(who) => applied(world.set_class(who, class)),
        None => TaskStatus::Failure,
    }
}

pub(super) fn set_weapon<W: AgentWorld>(
    world: &mut W,
    who: Option<W::Agent>,
    weapon: &str,
) -> TaskStatus {
    match world.resolve(who) {
        Some(who) => applied(world.set_weapon(who, weapon)),
        None => TaskStatus::Failure,
    }
}

pub(super) fn play_effect<W: AgentWorld>(
    ctx: &TickContext,
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    effect: &str,
    duration: Duration,
) -> TaskStatus {
    let Some(pos) = world.position(ai.agent()) else {
        return TaskStatus::Failure;
    };
    world.spawn_effect(pos, effect);
    if ctx.since(ai.task_started_at()) >= duration {
        TaskStatus::Success
    } else {
        TaskStatus::Continue
    }
}

pub(super) fn play_animation<W: AgentWorld>(
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    animation: &str,
) -> TaskStatus {
    applied(world.play_animation(ai.agent(), animation))
}
