use ai_core::{sort_agents, AgentId};

use super::TaskStatus;
use crate::{AgentWorld, AiController};

pub(super) fn forget_target<A: AgentId>(ai: &mut AiController<A>) -> TaskStatus {
    ai.set_target(None);
    TaskStatus::Success
}

/// Targets the live actor in sight range that lies most directly ahead, filtered by
/// allegiance and class. Keeps looking (`Continue`) while nothing matches.
pub(super) fn find_closest_actor<W: AgentWorld>(
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    is_ally: bool,
    is_same_class: bool,
) -> TaskStatus {
    let agent = ai.agent();
    let (Some(pos), Some(forward)) = (world.position(agent), world.forward(agent)) else {
        return TaskStatus::Failure;
    };
    let factions = world.factions(agent).unwrap_or_default();
    let class = world.class(agent).map(str::to_owned);

    let mut nearby = Vec::new();
    world.agents_in_radius(pos, ai.profile().perception.sight_range, &mut nearby);
    sort_agents(&mut nearby);

    let best = nearby
        .into_iter()
        .filter(|&other| other != agent && world.is_alive(other))
        .filter(|&other| {
            let allied = world
                .factions(other)
                .is_some_and(|theirs| factions.is_allied_with(theirs));
            let same_class = world.class(other).is_some() && world.class(other) == class.as_deref();
            allied == is_ally && same_class == is_same_class
        })
        .filter_map(|other| {
            let diff = world.position(other)? - pos;
            Some((forward.dot(diff.normalize_or_zero()), diff.length(), other))
        })
        .max_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then_with(|| b.1.total_cmp(&a.1))
                .then_with(|| b.2.cmp(&a.2))
        })
        .map(|(_, _, other)| other);

    ai.set_target(best);
    if best.is_some() {
        TaskStatus::Success
    } else {
        TaskStatus::Continue
    }
}

pub(super) fn target_aggressor<W: AgentWorld>(
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    include_allies: bool,
) -> TaskStatus {
    let agent = ai.agent();
    let Some(aggressor) = world.resolve_alive(world.last_aggressor(agent)) else {
        return TaskStatus::Failure;
    };
    let allied = match (world.factions(agent), world.factions(aggressor)) {
        (Some(mine), Some(theirs)) => mine.is_allied_with(theirs),
        _ => false,
    };
    if allied && !include_allies {
        return TaskStatus::Failure;
    }
    ai.set_target(Some(aggressor));
    TaskStatus::Success
}

/// Copies the squad leader's target. A squad without a live, AI-driven leader is not an
/// error here.
pub(super) fn inherit_squad_leaders_target<W: AgentWorld>(
    ai: &mut AiController<W::Agent>,
    world: &mut W,
    inherit_even_if_none: bool,
) -> TaskStatus {
    let Some(squad) = world.squad_of(ai.agent()).and_then(|id| world.squad(id)) else {
        return TaskStatus::Failure;
    };
    let Some(leader) = squad.leader() else {
        return TaskStatus::Success;
    };
    let Some(leaders_target) = world.controller(leader).map(|c| c.target()) else {
        return TaskStatus::Success;
    };
    if inherit_even_if_none || leaders_target.is_some() {
        ai.set_target(leaders_target);
    }
    TaskStatus::Success
}
