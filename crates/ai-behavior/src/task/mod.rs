//! The task library.
//!
//! A [`Task`] is immutable authored data. Anything a task needs to remember between ticks
//! lives on the controller ([`TaskScratch`] and the cursor's `state` counter), so one
//! `Behavior` can be shared by any number of actors.

mod misc;
mod movement;
mod navigation;
mod offensive;
mod squad;
mod targeting;

use std::sync::Arc;
use std::time::Duration;

use ai_core::TickContext;
use ai_nav::{ComparisonMethod, GradientMemory, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{AgentWorld, AiController, Behavior, Factions, Locomotor, SetOperation};

/// Result of one `think` of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Continue,
    Success,
    Failure,
}

/// How [`Task::ShootAtTarget`] picks its firing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AimingMethod {
    /// Fire straight ahead without turning.
    Forward,
    /// Pick a random direction once per task run and fire along it.
    Random,
    /// Aim at the target's current position.
    #[default]
    FaceTarget,
    /// Aim where the target will be when the projectile arrives.
    LeadTarget,
}

/// Per-task scratch, reset whenever the running task changes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TaskScratch {
    pub gradient: GradientMemory,
    pub aim: Option<Vec2>,
}

/// Default reach for touch-range tasks (attach, conditions on the target).
pub const TOUCH_RANGE: f32 = 20.0;

/// `dot(forward, aim)` at or above this counts as facing.
pub const FACING_DOT: f32 = 0.99;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum Task {
    // Miscellaneous
    Wait {
        #[cfg_attr(feature = "serde", serde(with = "ai_core::time::serde_secs"))]
        duration: Duration,
        #[cfg_attr(feature = "serde", serde(default))]
        interrupt_locomotion: bool,
    },
    FaceTarget,
    AttachToTarget {
        #[cfg_attr(feature = "serde", serde(default = "default_touch_range"))]
        range: f32,
    },
    CloneSelf {
        /// Offset direction in the actor's frame (+X forward, +Y left).
        relative_direction: Vec2,
    },
    HealSelf {
        health_per_second: f32,
        #[cfg_attr(feature = "serde", serde(with = "ai_core::time::serde_secs"))]
        duration: Duration,
        #[cfg_attr(feature = "serde", serde(default))]
        can_revive: bool,
    },
    HealTarget {
        health_per_second: f32,
        #[cfg_attr(feature = "serde", serde(with = "ai_core::time::serde_secs"))]
        duration: Duration,
        #[cfg_attr(feature = "serde", serde(default))]
        can_revive: bool,
    },
    SetOwnFactions {
        factions: Factions,
        #[cfg_attr(feature = "serde", serde(default))]
        operation: SetOperation,
    },
    SetTargetFactions {
        factions: Factions,
        #[cfg_attr(feature = "serde", serde(default))]
        operation: SetOperation,
    },
    SetOwnClass {
        class: String,
    },
    SetTargetClass {
        class: String,
    },
    SetOwnWeapon {
        weapon: String,
    },
    SetTargetWeapon {
        weapon: String,
    },
    PlayEffect {
        effect: String,
        #[cfg_attr(feature = "serde", serde(with = "ai_core::time::serde_secs", default))]
        duration: Duration,
    },
    PlayAnimation {
        animation: String,
    },

    // Movement
    SetLocomotor {
        locomotor: Locomotor,
    },
    WaitForLocomotor,
    StopLocomotor,

    // Navigation
    MoveToTarget {
        /// Gap to keep beyond both radii.
        distance: f32,
        #[cfg_attr(feature = "serde", serde(default))]
        permanent: bool,
    },
    NavigateGradient {
        target_value: u32,
        #[cfg_attr(feature = "serde", serde(default))]
        condition: ComparisonMethod,
    },
    NavigateToTarget {
        #[cfg_attr(feature = "serde", serde(default))]
        permanent: bool,
    },
    FleeFromTarget {
        #[cfg_attr(feature = "serde", serde(default = "default_safe_value"))]
        safe_value: u32,
    },
    OrbitTarget {
        radius: f32,
        #[cfg_attr(feature = "serde", serde(default))]
        face_target: bool,
    },

    // Offensive
    ShootAtTarget {
        #[cfg_attr(feature = "serde", serde(default))]
        aiming: AimingMethod,
    },
    SprayTarget {
        /// Total sweep, centred on the target.
        spray_angle_degrees: f32,
    },
    Suicide {
        #[cfg_attr(feature = "serde", serde(default))]
        effect: Option<String>,
    },
    SetConditionOnSelf {
        condition: String,
        #[cfg_attr(feature = "serde", serde(with = "ai_core::time::serde_secs"))]
        duration: Duration,
    },
    SetConditionOnTarget {
        condition: String,
        #[cfg_attr(feature = "serde", serde(with = "ai_core::time::serde_secs"))]
        duration: Duration,
        #[cfg_attr(feature = "serde", serde(default = "default_touch_range"))]
        range: f32,
    },
    /// Replaces the target's behavior; `None` leaves it idle.
    SetTargetBehavior {
        #[cfg_attr(feature = "serde", serde(default))]
        behavior: Option<Arc<Behavior>>,
    },

    // Targeting
    ForgetTarget,
    FindClosestActor {
        #[cfg_attr(feature = "serde", serde(default))]
        is_ally: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        is_same_class: bool,
    },
    TargetAggressor {
        #[cfg_attr(feature = "serde", serde(default))]
        include_allies: bool,
    },
    InheritSquadLeadersTarget {
        #[cfg_attr(feature = "serde", serde(default))]
        inherit_even_if_none: bool,
    },

    // Squad
    SpawnSquadUnits {
        #[cfg_attr(feature = "serde", serde(default))]
        must_be_leader: bool,
    },
    KillSquadUnits {
        #[cfg_attr(feature = "serde", serde(default))]
        include_self: bool,
    },
    InheritLeadersTarget,
    ShareTargetIfLeader,
    SetUnitBehaviorIfLeader {
        #[cfg_attr(feature = "serde", serde(default))]
        behavior: Option<Arc<Behavior>>,
    },
}

impl Task {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Wait { .. } => "Wait",
            Self::FaceTarget => "FaceTarget",
            Self::AttachToTarget { .. } => "AttachToTarget",
            Self::CloneSelf { .. } => "CloneSelf",
            Self::HealSelf { .. } => "HealSelf",
            Self::HealTarget { .. } => "HealTarget",
            Self::SetOwnFactions { .. } => "SetOwnFactions",
            Self::SetTargetFactions { .. } => "SetTargetFactions",
            Self::SetOwnClass { .. } => "SetOwnClass",
            Self::SetTargetClass { .. } => "SetTargetClass",
            Self::SetOwnWeapon { .. } => "SetOwnWeapon",
            Self::SetTargetWeapon { .. } => "SetTargetWeapon",
            Self::PlayEffect { .. } => "PlayEffect",
            Self::PlayAnimation { .. } => "PlayAnimation",
            Self::SetLocomotor { .. } => "SetLocomotor",
            Self::WaitForLocomotor => "WaitForLocomotor",
            Self::StopLocomotor => "StopLocomotor",
            Self::MoveToTarget { .. } => "MoveToTarget",
            Self::NavigateGradient { .. } => "NavigateGradient",
            Self::NavigateToTarget { .. } => "NavigateToTarget",
            Self::FleeFromTarget { .. } => "FleeFromTarget",
            Self::OrbitTarget { .. } => "OrbitTarget",
            Self::ShootAtTarget { .. } => "ShootAtTarget",
            Self::SprayTarget { .. } => "SprayTarget",
            Self::Suicide { .. } => "Suicide",
            Self::SetConditionOnSelf { .. } => "SetConditionOnSelf",
            Self::SetConditionOnTarget { .. } => "SetConditionOnTarget",
            Self::SetTargetBehavior { .. } => "SetTargetBehavior",
            Self::ForgetTarget => "ForgetTarget",
            Self::FindClosestActor { .. } => "FindClosestActor",
            Self::TargetAggressor { .. } => "TargetAggressor",
            Self::InheritSquadLeadersTarget { .. } => "InheritSquadLeadersTarget",
            Self::SpawnSquadUnits { .. } => "SpawnSquadUnits",
            Self::KillSquadUnits { .. } => "KillSquadUnits",
            Self::InheritLeadersTarget => "InheritLeadersTarget",
            Self::ShareTargetIfLeader => "ShareTargetIfLeader",
            Self::SetUnitBehaviorIfLeader { .. } => "SetUnitBehaviorIfLeader",
        }
    }

    /// Runs one tick of this task for the controller's actor.
    pub fn think<W: AgentWorld>(
        &self,
        ctx: &TickContext,
        ai: &mut AiController<W::Agent>,
        world: &mut W,
    ) -> TaskStatus {
        match self {
            Self::Wait {
                duration,
                interrupt_locomotion,
            } => misc::wait(ctx, ai, *duration, *interrupt_locomotion),
            Self::FaceTarget => misc::face_target(ctx, ai, world),
            Self::AttachToTarget { range } => misc::attach_to_target(ai, world, *range),
            Self::CloneSelf { relative_direction } => {
                misc::clone_self(ai, world, *relative_direction)
            }
            Self::HealSelf {
                health_per_second,
                duration,
                can_revive,
            } => {
                let agent = ai.agent();
                misc::heal(ctx, ai, world, Some(agent), *health_per_second, *duration, *can_revive)
            }
            Self::HealTarget {
                health_per_second,
                duration,
                can_revive,
            } => {
                let target = ai.target();
                misc::heal(ctx, ai, world, target, *health_per_second, *duration, *can_revive)
            }
            Self::SetOwnFactions {
                factions,
                operation,
            } => misc::set_factions(world, Some(ai.agent()), *factions, *operation),
            Self::SetTargetFactions {
                factions,
                operation,
            } => misc::set_factions(world, ai.target(), *factions, *operation),
            Self::SetOwnClass { class } => misc::set_class(world, Some(ai.agent()), class),
            Self::SetTargetClass { class } => misc::set_class(world, ai.target(), class),
            Self::SetOwnWeapon { weapon } => misc::set_weapon(world, Some(ai.agent()), weapon),
            Self::SetTargetWeapon { weapon } => misc::set_weapon(world, ai.target(), weapon),
            Self::PlayEffect { effect, duration } => {
                misc::play_effect(ctx, ai, world, effect, *duration)
            }
            Self::PlayAnimation { animation } => misc::play_animation(ai, world, animation),

            Self::SetLocomotor { locomotor } => movement::set_locomotor(ai, locomotor),
            Self::WaitForLocomotor => movement::wait_for_locomotor(ai),
            Self::StopLocomotor => movement::stop_locomotor(ai),

            Self::MoveToTarget {
                distance,
                permanent,
            } => navigation::move_to_target(ctx, ai, world, *distance, *permanent),
            Self::NavigateGradient {
                target_value,
                condition,
            } => navigation::navigate_gradient(ctx, ai, world, *target_value, *condition),
            Self::NavigateToTarget { permanent } => {
                navigation::navigate_to_target(ctx, ai, world, *permanent)
            }
            Self::FleeFromTarget { safe_value } => {
                navigation::flee_from_target(ctx, ai, world, *safe_value)
            }
            Self::OrbitTarget {
                radius,
                face_target,
            } => navigation::orbit_target(ctx, ai, world, *radius, *face_target),

            Self::ShootAtTarget { aiming } => offensive::shoot_at_target(ctx, ai, world, *aiming),
            Self::SprayTarget {
                spray_angle_degrees,
            } => offensive::spray_target(ctx, ai, world, *spray_angle_degrees),
            Self::Suicide { effect } => offensive::suicide(ai, world, effect.as_deref()),
            Self::SetConditionOnSelf {
                condition,
                duration,
            } => offensive::condition_on_self(ai, world, condition, *duration),
            Self::SetConditionOnTarget {
                condition,
                duration,
                range,
            } => offensive::condition_on_target(ai, world, condition, *duration, *range),
            Self::SetTargetBehavior { behavior } => {
                offensive::set_target_behavior(ctx, ai, world, behavior.as_ref())
            }

            Self::ForgetTarget => targeting::forget_target(ai),
            Self::FindClosestActor {
                is_ally,
                is_same_class,
            } => targeting::find_closest_actor(ai, world, *is_ally, *is_same_class),
            Self::TargetAggressor { include_allies } => {
                targeting::target_aggressor(ai, world, *include_allies)
            }
            Self::InheritSquadLeadersTarget {
                inherit_even_if_none,
            } => targeting::inherit_squad_leaders_target(ai, world, *inherit_even_if_none),

            Self::SpawnSquadUnits { must_be_leader } => {
                squad::spawn_squad_units(ctx, ai, world, *must_be_leader)
            }
            Self::KillSquadUnits { include_self } => {
                squad::kill_squad_units(ai, world, *include_self)
            }
            Self::InheritLeadersTarget => squad::inherit_leaders_target(ai, world),
            Self::ShareTargetIfLeader => squad::share_target_if_leader(ai, world),
            Self::SetUnitBehaviorIfLeader { behavior } => {
                squad::set_unit_behavior_if_leader(ctx, ai, world, behavior.as_ref())
            }
        }
    }
}

#[cfg(feature = "serde")]
fn default_touch_range() -> f32 {
    TOUCH_RANGE
}

#[cfg(feature = "serde")]
fn default_safe_value() -> u32 {
    navigation::DEFAULT_SAFE_VALUE
}
