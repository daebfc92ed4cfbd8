use crate::AgentId;

/// Read-only world access.
///
/// The core crate only prescribes handle resolution. Subsystems (navigation, squads, the
/// behavior engine) define extension traits for the queries they need.
pub trait WorldView {
    type Agent: AgentId;

    /// Whether the handle still names an actor in the simulation.
    fn exists(&self, agent: Self::Agent) -> bool;

    /// Whether the actor exists and has not been killed.
    fn is_alive(&self, agent: Self::Agent) -> bool;

    /// Resolves a handle, dropping it if the actor left the simulation.
    fn resolve(&self, agent: Option<Self::Agent>) -> Option<Self::Agent> {
        agent.filter(|a| self.exists(*a))
    }

    /// Resolves a handle, dropping it if the actor is dead or gone.
    fn resolve_alive(&self, agent: Option<Self::Agent>) -> Option<Self::Agent> {
        agent.filter(|a| self.is_alive(*a))
    }
}

/// Write access / effect sink.
pub trait WorldMut: WorldView {}
