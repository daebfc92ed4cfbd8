//! Sense-gated behavior selection for autonomous actors.
//!
//! Each AI-driven actor owns an [`AiController`]. Every tick the controller
//! - samples one of its profile's *preemptive* behaviors on a cooldown and switches to it when
//!   the required [`Senses`] hold and a chance roll passes,
//! - falls back to the last qualifying *default* behavior when idle,
//! - runs the current [`Task`] of its [`Behavior`] and advances through the task list
//!   according to the result and the behavior's [`TaskFailurePolicy`],
//! - steps its active [`Locomotor`].
//!
//! The controller never owns world state. Hosts implement the traits in [`world`] and hand
//! their world to [`AiController::think`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod behavior;
pub mod controller;
pub mod cursor;
pub mod factions;
pub mod locomotor;
pub mod motion;
pub mod senses;
pub mod task;
pub mod world;

pub use behavior::{AiProfile, Behavior, TaskFailurePolicy, DEFAULT_PREEMPT_INTERVAL};
pub use controller::AiController;
pub use cursor::{CursorStep, TaskCursor};
pub use factions::{Factions, SetOperation};
pub use locomotor::{Locomotor, LocomotorScratch, LocomotorStatus};
pub use senses::{Perception, SenseMemory, SenseProbe, Senses};
pub use task::{AimingMethod, Task, TaskScratch, TaskStatus};
pub use world::{
    ActorMut, ActorView, AgentWorld, ControllerAccess, Health, SpatialQuery, SquadAccess,
    WeaponInfo,
};
