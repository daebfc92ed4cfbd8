//! Steering routines shared by locomotors and the navigation tasks.
//!
//! Each routine performs one tick of motion and reports a [`Motion`]; callers decide whether
//! arrival ends them or not.

use ai_core::TickContext;
use ai_nav::{ComparisonMethod, FlowSource, GradientMemory, NavWorldMut, Vec2};

/// Blend weight toward the tangent when strafing around an orbit target.
const ORBIT_STRAFE_BLEND: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// The goal is met this tick.
    Arrived,
    Moving,
    /// The target is gone.
    Lost,
}

fn target_position<W: NavWorldMut>(world: &W, target: Option<W::Agent>) -> Option<Vec2> {
    world.resolve(target).and_then(|t| world.position(t))
}

/// Closes in on `target` until the gap between the two bodies is at most `distance`.
pub fn approach<W: NavWorldMut>(
    ctx: &TickContext,
    agent: W::Agent,
    target: Option<W::Agent>,
    distance: f32,
    world: &mut W,
) -> Motion {
    let (Some(pos), Some(target_pos)) = (world.position(agent), target_position(world, target))
    else {
        return Motion::Lost;
    };
    let r1 = world.radius(agent).unwrap_or(0.0);
    let r2 = target.and_then(|t| world.radius(t)).unwrap_or(0.0);

    let diff = target_pos - pos;
    if diff.length_squared() <= distance * distance + r1 * r1 + r2 * r2 {
        return Motion::Arrived;
    }

    world.turn_towards(agent, diff.normalize_or_zero(), ctx.dt_seconds);
    if let Some(forward) = world.forward(agent) {
        world.accelerate(agent, forward);
    }
    Motion::Moving
}

/// Follows the flow field until `condition` holds between the value under the actor and
/// `target_value`.
///
/// Standing off the field, or having no better neighbor, counts as arrival.
pub fn navigate_to_value<W: NavWorldMut>(
    ctx: &TickContext,
    agent: W::Agent,
    target_value: u32,
    condition: ComparisonMethod,
    memory: &mut GradientMemory,
    world: &mut W,
) -> Motion {
    let Some(current) = ai_nav::gradient_value(world, agent) else {
        return Motion::Arrived;
    };
    if condition.is_satisfied(current, target_value) {
        return Motion::Arrived;
    }
    if ai_nav::navigate_gradient(ctx, agent, world, target_value, memory) {
        Motion::Moving
    } else {
        Motion::Arrived
    }
}

/// Follows the flow field toward the value under `target`'s position.
pub fn navigate_to_actor<W: NavWorldMut>(
    ctx: &TickContext,
    agent: W::Agent,
    target: Option<W::Agent>,
    memory: &mut GradientMemory,
    world: &mut W,
) -> Motion {
    let Some(target_pos) = target_position(world, target) else {
        return Motion::Lost;
    };
    let Some(target_value) = world.flow_field().value_at(target_pos) else {
        return Motion::Arrived;
    };
    navigate_to_value(ctx, agent, target_value, ComparisonMethod::Equal, memory, world)
}

/// Climbs the flow field away from `target` until the local value reaches `safe_value`.
pub fn flee<W: NavWorldMut>(
    ctx: &TickContext,
    agent: W::Agent,
    target: Option<W::Agent>,
    safe_value: u32,
    memory: &mut GradientMemory,
    world: &mut W,
) -> Motion {
    if world.resolve(target).is_none() {
        return Motion::Lost;
    }
    navigate_to_value(
        ctx,
        agent,
        safe_value,
        ComparisonMethod::GreaterOrEqual,
        memory,
        world,
    )
}

/// Circles `target` at `radius`. Outside the circle the actor heads for the tangent point;
/// inside it keeps its heading. Never arrives.
pub fn orbit<W: NavWorldMut>(
    ctx: &TickContext,
    agent: W::Agent,
    target: Option<W::Agent>,
    radius: f32,
    face_target: bool,
    world: &mut W,
) -> Motion {
    let (Some(pos), Some(forward), Some(target_pos)) = (
        world.position(agent),
        world.forward(agent),
        target_position(world, target),
    ) else {
        return Motion::Lost;
    };

    let diff = target_pos - pos;
    let dist = diff.length();
    let to_target = diff.normalize_or_zero();
    if face_target {
        world.turn_towards(agent, to_target, ctx.dt_seconds);
    }

    if dist > radius.max(0.0) {
        let tangent_offset = (radius.max(0.0) / dist).asin();
        let side = if forward.cross(diff) >= 0.0 { 1.0 } else { -1.0 };
        let desired = Vec2::from_angle(diff.angle() - tangent_offset * side);
        if face_target {
            let strafe = forward.perp();
            let heading = strafe + (desired - strafe) * ORBIT_STRAFE_BLEND;
            world.accelerate(agent, heading.normalize_or_zero());
        } else {
            world.turn_towards(agent, desired, ctx.dt_seconds);
            if let Some(forward) = world.forward(agent) {
                world.accelerate(agent, forward);
            }
        }
    } else if face_target {
        let heading = world.velocity(agent).unwrap_or(Vec2::ZERO).normalize_or_zero();
        world.accelerate(agent, heading);
    } else {
        world.accelerate(agent, forward);
    }
    Motion::Moving
}
