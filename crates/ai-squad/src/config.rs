use std::time::Duration;

use ai_nav::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A unit class and how many of it an initial spawn creates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnitTemplate {
    pub class: String,
    #[cfg_attr(feature = "serde", serde(default = "default_count"))]
    pub min_count: u32,
    #[cfg_attr(feature = "serde", serde(default = "default_count"))]
    pub max_count: u32,
}

impl UnitTemplate {
    pub fn new(class: impl Into<String>, min_count: u32, max_count: u32) -> Self {
        Self {
            class: class.into(),
            min_count,
            max_count,
        }
    }
}

/// Authored squad definition. Live-count bounds exclude the leader.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SquadConfig {
    pub name: String,
    /// One of these is picked for the leader. Empty means a leaderless squad.
    pub leader_templates: Vec<String>,
    pub unit_templates: Vec<UnitTemplate>,
    pub spawn_position: Vec2,
    pub spawn_radius: f32,
    pub spawn_automatically: bool,
    /// Topped up immediately whenever fewer units are alive.
    pub min_live_count: u32,
    /// Topped up toward after `spawn_delay`.
    pub max_live_count: u32,
    /// Lifetime spawn cap; 0 means unlimited.
    pub max_spawn_count: u32,
    #[cfg_attr(feature = "serde", serde(with = "ai_core::time::serde_secs"))]
    pub spawn_delay: Duration,
    /// Once every unit is dead and the spawn cap is used up, restart after this long.
    #[cfg_attr(feature = "serde", serde(with = "ai_core::time::serde_secs_opt"))]
    pub reset_delay: Option<Duration>,
    pub suspend_while_leader_dead: bool,
}

impl Default for SquadConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            leader_templates: Vec::new(),
            unit_templates: Vec::new(),
            spawn_position: Vec2::ZERO,
            spawn_radius: 0.0,
            spawn_automatically: true,
            min_live_count: 0,
            max_live_count: 1,
            max_spawn_count: 0,
            spawn_delay: Duration::ZERO,
            reset_delay: None,
            suspend_while_leader_dead: false,
        }
    }
}

impl SquadConfig {
    pub fn has_leader(&self) -> bool {
        !self.leader_templates.is_empty()
    }
}

#[cfg(feature = "serde")]
fn default_count() -> u32 {
    1
}
