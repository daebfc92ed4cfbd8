//! Capability traits the decision engine needs from the host simulation.
//!
//! The engine never owns actors. Everything it knows or changes goes through these traits,
//! keyed by handle; a stale handle simply resolves to `None`/`false`.

use std::time::Duration;

use ai_core::{TickContext, WorldView};
use ai_nav::{NavWorldMut, NavWorldView, Vec2};
use ai_squad::{Squad, SquadId};

use crate::{AiController, Factions};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(current: f32, max: f32) -> Self {
        Self { current, max }
    }

    /// `current / max`, or 0 for a non-positive maximum.
    pub fn ratio(self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponInfo {
    /// Projectile launch speed in world units per second.
    pub muzzle_speed: f32,
    /// Rounds left; `None` for unlimited.
    pub ammo: Option<u32>,
}

impl WeaponInfo {
    pub fn has_ammo(self) -> bool {
        self.ammo.is_none_or(|n| n > 0)
    }
}

/// Read access to actor state beyond kinematics.
pub trait ActorView: NavWorldView {
    fn acceleration(&self, agent: Self::Agent) -> Option<Vec2>;
    fn max_speed(&self, agent: Self::Agent) -> Option<f32>;
    fn factions(&self, agent: Self::Agent) -> Option<Factions>;
    fn health(&self, agent: Self::Agent) -> Option<Health>;
    fn class(&self, agent: Self::Agent) -> Option<&str>;
    fn weapon(&self, agent: Self::Agent) -> Option<WeaponInfo>;
    /// Whoever damaged `agent` most recently.
    fn last_aggressor(&self, agent: Self::Agent) -> Option<Self::Agent>;
    /// The actor `agent` is attached to.
    fn parent(&self, agent: Self::Agent) -> Option<Self::Agent>;

    fn is_inside_map(&self, point: Vec2) -> bool {
        self.flow_field().contains(point)
    }
}

/// Effects on actors. Each returns whether the host applied it.
pub trait ActorMut: NavWorldMut + ActorView {
    fn set_health(&mut self, agent: Self::Agent, health: f32);
    fn kill(&mut self, agent: Self::Agent);
    fn resurrect(&mut self, agent: Self::Agent);
    fn set_factions(&mut self, agent: Self::Agent, factions: Factions);
    fn set_class(&mut self, agent: Self::Agent, class: &str) -> bool;
    fn set_weapon(&mut self, agent: Self::Agent, weapon: &str) -> bool;
    /// Fires if the weapon is ready. Returns whether a shot went off.
    fn try_use_weapon(&mut self, agent: Self::Agent) -> bool;
    fn apply_condition(&mut self, agent: Self::Agent, condition: &str, duration: Duration)
        -> bool;
    fn play_animation(&mut self, agent: Self::Agent, animation: &str) -> bool;
    fn spawn_effect(&mut self, at: Vec2, effect: &str);
    /// Copies `agent` (class, state, AI) to `position`.
    fn clone_actor(&mut self, agent: Self::Agent, position: Vec2) -> Option<Self::Agent>;
    fn attach(&mut self, child: Self::Agent, parent: Self::Agent) -> bool;
}

/// Spatial index queries. Results are appended to `out` in ascending handle order.
pub trait SpatialQuery: WorldView {
    fn agents_in_radius(&self, center: Vec2, radius: f32, out: &mut Vec<Self::Agent>);

    /// Actors whose bodies touch the strip `half_width` either side of the ray.
    fn agents_along_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        distance: f32,
        half_width: f32,
        out: &mut Vec<Self::Agent>,
    );
}

/// Squad membership and coordination.
pub trait SquadAccess: WorldView {
    fn squad_of(&self, agent: Self::Agent) -> Option<SquadId>;
    fn squad(&self, id: SquadId) -> Option<&Squad<Self::Agent>>;
    /// Runs the squad's initial spawn. Returns the number of actors created.
    fn spawn_squad_units(&mut self, ctx: &TickContext, id: SquadId) -> usize;
    /// Kills every member except `keep`. Returns the number killed.
    fn kill_squad_units(&mut self, id: SquadId, keep: Option<Self::Agent>) -> usize;
}

/// Access to other actors' controllers.
///
/// Hosts remove the thinking controller from storage for the duration of its own `think`, so
/// looking up the thinking actor here yields `None`.
pub trait ControllerAccess: WorldView {
    fn controller(&self, agent: Self::Agent) -> Option<&AiController<Self::Agent>>;
    fn controller_mut(&mut self, agent: Self::Agent) -> Option<&mut AiController<Self::Agent>>;
}

/// Everything a controller needs.
pub trait AgentWorld: ActorMut + SpatialQuery + SquadAccess + ControllerAccess {}

impl<W> AgentWorld for W where W: ActorMut + SpatialQuery + SquadAccess + ControllerAccess {}
