use core::fmt::Debug;

/// Stable identifier for an actor.
///
/// Actors are referenced by handle only; a handle may outlive the actor it names, so every
/// lookup through a world returns `Option` and callers check liveness before acting.
///
/// Deterministic simulation requires:
/// - stable ordering (`Ord`)
/// - a stable numeric ID (`stable_id`) for seeding and logs
pub trait AgentId: Copy + Ord + Eq + Debug {
    fn stable_id(self) -> u64;
}

impl AgentId for u64 {
    fn stable_id(self) -> u64 {
        self
    }
}

impl AgentId for u32 {
    fn stable_id(self) -> u64 {
        self as u64
    }
}

impl AgentId for usize {
    fn stable_id(self) -> u64 {
        self as u64
    }
}

/// Sorts and dedups a handle list into the deterministic host iteration order.
pub fn sort_agents<A: AgentId>(agents: &mut Vec<A>) {
    agents.sort_by_key(|a| (a.stable_id(), *a));
    agents.dedup();
}
