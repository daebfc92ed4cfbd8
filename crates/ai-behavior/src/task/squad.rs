use std::sync::Arc;

use ai_core::TickContext;
use ai_squad::SquadId;

use super::TaskStatus;
use crate::{AgentWorld, AiController, Behavior};

/// The actor's squad id, provided the actor leads it.
fn led_squad<W: AgentWorld>(agent: W::Agent, world: &W) -> Option<SquadId> {
    let id = world.squad_of(agent)?;
    world.squad(id)?.is_leader(agent).then_some(id)
}

/// Members other than `agent`.
fn other_units<W: AgentWorld>(agent: W::Agent, id: SquadId, world: &W) -> Vec<W::Agent> {
    world.squad(id).map_or_else(Vec::new, |squad| {
        squad
            .units()
            .iter()
            .copied()
            .filter(|u| *u != agent)
            .collect()
    })
}

pub(super) fn spawn_squad_units<W: AgentWorld>(
    ctx: &TickContext,
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    must_be_leader: bool,
) -> TaskStatus {
    let agent = ai.agent();
    let Some((id, is_leader)) = world
        .squad_of(agent)
        .and_then(|id| Some((id, world.squad(id)?.is_leader(agent))))
    else {
        return TaskStatus::Failure;
    };
    if must_be_leader && !is_leader {
        return TaskStatus::Failure;
    }
    world.spawn_squad_units(ctx, id);
    TaskStatus::Success
}

pub(super) fn kill_squad_units<W: AgentWorld>(
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    include_self: bool,
) -> TaskStatus {
    let agent = ai.agent();
    let Some(id) = led_squad(agent, world) else {
        return TaskStatus::Failure;
    };
    let keep = (!include_self).then_some(agent);
    world.kill_squad_units(id, keep);
    TaskStatus::Success
}

pub(super) fn inherit_leaders_target<W: AgentWorld>(
    ai: &mut AiController<W::Agent>,
    world: &mut W,
) -> TaskStatus {
    let Some(leader) = world
        .squad_of(ai.agent())
        .and_then(|id| world.squad(id))
        .and_then(|squad| squad.leader())
        .filter(|l| world.is_alive(*l))
    else {
        return TaskStatus::Failure;
    };
    match world.controller(leader) {
        Some(controller) => {
            let target = controller.target();
            ai.set_target(target);
            TaskStatus::Success
        }
        None => TaskStatus::Failure,
    }
}

pub(super) fn share_target_if_leader<W: AgentWorld>(
    ai: &mut AiController<W::Agent>,
    world: &mut W,
) -> TaskStatus {
    let agent = ai.agent();
    let Some(id) = led_squad(agent, world) else {
        return TaskStatus::Failure;
    };
    let target = ai.target();
    for unit in other_units(agent, id, world) {
        if let Some(controller) = world.controller_mut(unit) {
            controller.set_target(target);
        }
    }
    TaskStatus::Success
}

pub(super) fn set_unit_behavior_if_leader<W: AgentWorld>(
    ctx: &TickContext,
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    behavior: Option<&Arc<Behavior>>,
) -> TaskStatus {
    let agent = ai.agent();
    let Some(id) = led_squad(agent, world) else {
        return TaskStatus::Failure;
    };
    for unit in other_units(agent, id, world) {
        if let Some(controller) = world.controller_mut(unit) {
            controller.set_behavior(ctx, behavior.cloned());
        }
    }
    TaskStatus::Success
}
