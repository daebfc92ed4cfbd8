//! Headless reference host for the decision engine.
//!
//! Loads a YAML [`Scenario`], places its actors in a [`SandboxWorld`] and steps every
//! controller once per tick in ascending actor id, followed by squad upkeep and physics.

#![forbid(unsafe_code)]

pub mod scenario;
pub mod sim;
pub mod world;

pub use scenario::{Scenario, ScenarioError, ScenarioFile};
pub use sim::{SimOptions, Simulation, Summary};
pub use world::{ActorId, Body, SandboxWorld, Stats};
