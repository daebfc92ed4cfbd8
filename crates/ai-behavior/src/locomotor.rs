use ai_core::TickContext;
use ai_nav::{ComparisonMethod, GradientMemory, NavWorldMut, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::motion::{self, Motion};

/// A movement strategy that runs every tick alongside the current task.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum Locomotor {
    MoveToTarget {
        distance: f32,
        /// Keep following after arriving.
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
        safe_value: u32,
    },
    OrbitTarget {
        radius: f32,
        #[cfg_attr(feature = "serde", serde(default))]
        face_target: bool,
    },
    FollowPath {
        points: Vec<Vec2>,
        arrival_distance: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocomotorStatus {
    Continue,
    Finished,
}

/// Progress of the active locomotor; reset whenever the locomotor is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocomotorScratch {
    pub gradient: GradientMemory,
    pub path_index: usize,
}

impl Locomotor {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MoveToTarget { .. } => "MoveToTarget",
            Self::NavigateGradient { .. } => "NavigateGradient",
            Self::NavigateToTarget { .. } => "NavigateToTarget",
            Self::FleeFromTarget { .. } => "FleeFromTarget",
            Self::OrbitTarget { .. } => "OrbitTarget",
            Self::FollowPath { .. } => "FollowPath",
        }
    }

    pub fn step<W: NavWorldMut>(
        &self,
        ctx: &TickContext,
        agent: W::Agent,
        target: Option<W::Agent>,
        scratch: &mut LocomotorScratch,
        world: &mut W,
    ) -> LocomotorStatus {
        let (result, permanent) = match self {
            Self::MoveToTarget {
                distance,
                permanent,
            } => (motion::approach(ctx, agent, target, *distance, world), *permanent),
            Self::NavigateGradient {
                target_value,
                condition,
            } => (
                motion::navigate_to_value(
                    ctx,
                    agent,
                    *target_value,
                    *condition,
                    &mut scratch.gradient,
                    world,
                ),
                false,
            ),
            Self::NavigateToTarget { permanent } => (
                motion::navigate_to_actor(ctx, agent, target, &mut scratch.gradient, world),
                *permanent,
            ),
            Self::FleeFromTarget { safe_value } => (
                motion::flee(ctx, agent, target, *safe_value, &mut scratch.gradient, world),
                false,
            ),
            Self::OrbitTarget {
                radius,
                face_target,
            } => (
                motion::orbit(ctx, agent, target, *radius, *face_target, world),
                false,
            ),
            Self::FollowPath {
                points,
                arrival_distance,
            } => {
                let done = ai_nav::follow_path(
                    ctx,
                    agent,
                    world,
                    points,
                    *arrival_distance,
                    &mut scratch.path_index,
                );
                let result = if done { Motion::Arrived } else { Motion::Moving };
                (result, false)
            }
        };

        match result {
            Motion::Moving => LocomotorStatus::Continue,
            Motion::Arrived if permanent => LocomotorStatus::Continue,
            Motion::Arrived | Motion::Lost => LocomotorStatus::Finished,
        }
    }
}
