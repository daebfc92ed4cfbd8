//! Deterministic, engine-agnostic AI kernel primitives.
//!
//! Handles, the per-tick context (simulation clock and seed), deterministic random streams
//! and the minimal world trait every subsystem extends.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod rng;
pub mod tick;
pub mod time;
pub mod world;

pub use agent::{sort_agents, AgentId};
pub use rng::{DeterministicRng, SplitMix64};
pub use tick::TickContext;
pub use time::Deadline;
pub use world::{WorldMut, WorldView};
