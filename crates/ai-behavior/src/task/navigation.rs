//! Navigation tasks run the locomotor routines directly, one step per tick, and end when the
//! routine arrives.

use ai_core::TickContext;
use ai_nav::ComparisonMethod;

use super::TaskStatus;
use crate::motion::{self, Motion};
use crate::{AgentWorld, AiController};

/// Flow value a fleeing actor considers far enough away.
pub const DEFAULT_SAFE_VALUE: u32 = 50;

fn status(motion: Motion, permanent: bool) -> TaskStatus {
    match motion {
        Motion::Arrived if permanent => TaskStatus::Continue,
        Motion::Arrived => TaskStatus::Success,
        Motion::Moving => TaskStatus::Continue,
        Motion::Lost => TaskStatus::Failure,
    }
}

pub(super) fn move_to_target<W: AgentWorld>(
    ctx: &TickContext,
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    distance: f32,
    permanent: bool,
) -> TaskStatus {
    let motion = motion::approach(ctx, ai.agent(), ai.target(), distance, world);
    status(motion, permanent)
}

pub(super) fn navigate_gradient<W: AgentWorld>(
    ctx: &TickContext,
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    target_value: u32,
    condition: ComparisonMethod,
) -> TaskStatus {
    let mut memory = ai.scratch_mut().gradient;
    let motion =
        motion::navigate_to_value(ctx, ai.agent(), target_value, condition, &mut memory, world);
    ai.scratch_mut().gradient = memory;
    status(motion, false)
}

pub(super) fn navigate_to_target<W: AgentWorld>(
    ctx: &TickContext,
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    permanent: bool,
) -> TaskStatus {
    let mut memory = ai.scratch_mut().gradient;
    let motion = motion::navigate_to_actor(ctx, ai.agent(), ai.target(), &mut memory, world);
    ai.scratch_mut().gradient = memory;
    status(motion, permanent)
}

pub(super) fn flee_from_target<W: AgentWorld>(
    ctx: &TickContext,
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    safe_value: u32,
) -> TaskStatus {
    let mut memory = ai.scratch_mut().gradient;
    let motion = motion::flee(ctx, ai.agent(), ai.target(), safe_value, &mut memory, world);
    ai.scratch_mut().gradient = memory;
    status(motion, false)
}

pub(super) fn orbit_target<W: AgentWorld>(
    ctx: &TickContext,
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    radius: f32,
    face_target: bool,
) -> TaskStatus {
    let motion = motion::orbit(ctx, ai.agent(), ai.target(), radius, face_target, world);
    status(motion, false)
}
