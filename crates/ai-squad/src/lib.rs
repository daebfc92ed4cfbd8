//! Squads: a leader plus units, kept alive by templated spawning rules.
//!
//! A [`Squad`] only holds handles. Actors are created and destroyed through [`SquadWorld`], and
//! dead or departed members are pruned on every [`Squad::update`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod config;
pub mod squad;
pub mod world;

pub use config::{SquadConfig, UnitTemplate};
pub use squad::{Squad, SquadId, MAX_PLACEMENT_ATTEMPTS};
pub use world::SquadWorld;
