use ai_core::{WorldMut, WorldView};

use crate::{FlowSource, Vec2};

/// Kinematic state and the map's flow field, as seen by navigation.
pub trait NavWorldView: WorldView {
    fn position(&self, agent: Self::Agent) -> Option<Vec2>;
    /// Unit facing direction.
    fn forward(&self, agent: Self::Agent) -> Option<Vec2>;
    fn velocity(&self, agent: Self::Agent) -> Option<Vec2>;
    fn radius(&self, agent: Self::Agent) -> Option<f32>;
    fn flow_field(&self) -> &dyn FlowSource;
}

/// Motion requests. Integration of velocity and position stays with the host.
pub trait NavWorldMut: WorldMut + NavWorldView {
    /// Rotates toward `direction` at the actor's own turn rate.
    fn turn_towards(&mut self, agent: Self::Agent, direction: Vec2, dt_seconds: f32);
    /// Snaps the facing direction.
    fn set_forward(&mut self, agent: Self::Agent, direction: Vec2);
    /// Requests acceleration along `direction` (unit or zero) for this tick.
    fn accelerate(&mut self, agent: Self::Agent, direction: Vec2);
}
