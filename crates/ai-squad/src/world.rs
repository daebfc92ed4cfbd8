use ai_core::WorldMut;
use ai_nav::Vec2;

use crate::SquadId;

/// Actor lifecycle operations a squad needs from the host.
pub trait SquadWorld: WorldMut {
    /// Whether a circle of `radius` at `center` overlaps no existing entity.
    fn is_area_free(&self, center: Vec2, radius: f32) -> bool;

    /// Collision radius of actors of `class`, if the class is known.
    fn class_radius(&self, class: &str) -> Option<f32>;

    /// Creates an actor of `class` at `position` as a member of `squad`.
    fn spawn(&mut self, class: &str, position: Vec2, squad: SquadId) -> Option<Self::Agent>;

    fn kill(&mut self, agent: Self::Agent);
}
