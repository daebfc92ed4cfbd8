use ai_core::TickContext;

use crate::gradient::{self, GradientMemory};
use crate::{NavWorldMut, NavWorldView, Vec2};

/// One gradient step for `agent`: sample ahead, turn toward the best neighbor and accelerate
/// forward. Returns whether a candidate neighbor was found.
pub fn navigate_gradient<W: NavWorldMut>(
    ctx: &TickContext,
    agent: W::Agent,
    world: &mut W,
    target: u32,
    memory: &mut GradientMemory,
) -> bool {
    let (Some(position), Some(forward)) = (world.position(agent), world.forward(agent)) else {
        return false;
    };
    let radius = world.radius(agent).unwrap_or(0.0);

    let step = {
        let field = world.flow_field();
        let probe = gradient::probe_point(position, forward, radius);
        gradient::probe_tile(field, position, probe)
            .and_then(|from| gradient::choose_step(field, from, target, memory))
    };
    let Some(step) = step else {
        return false;
    };

    world.turn_towards(agent, step.direction, ctx.dt_seconds);
    if let Some(forward) = world.forward(agent) {
        world.accelerate(agent, forward);
    }
    true
}

/// Flow value of the tile the actor stands on. `None` off the field.
pub fn gradient_value<W: NavWorldView>(world: &W, agent: W::Agent) -> Option<u32> {
    let position = world.position(agent)?;
    world.flow_field().value_at(position)
}

/// Steers along `points`, advancing `next_index` past every waypoint within
/// `arrival_distance`. Returns `true` once the last waypoint is reached.
pub fn follow_path<W: NavWorldMut>(
    ctx: &TickContext,
    agent: W::Agent,
    world: &mut W,
    points: &[Vec2],
    arrival_distance: f32,
    next_index: &mut usize,
) -> bool {
    let Some(pos) = world.position(agent) else {
        return true;
    };

    while let Some(&waypoint) = points.get(*next_index) {
        let to_waypoint = waypoint - pos;
        if to_waypoint.length() > arrival_distance.max(0.0) {
            let dir = to_waypoint.normalize_or_zero();
            world.turn_towards(agent, dir, ctx.dt_seconds);
            world.accelerate(agent, dir);
            return false;
        }
        *next_index += 1;
    }
    true
}
