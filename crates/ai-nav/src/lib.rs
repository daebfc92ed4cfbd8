//! Navigation primitives: vector math, precomputed flow fields and gradient steering.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod flow;
pub mod gradient;
pub mod math;
pub mod steering;
pub mod world;

pub use flow::{FlowField, FlowSource, TileCoord};
pub use gradient::{ComparisonMethod, GradientMemory, GradientStep};
pub use math::Vec2;
pub use steering::{follow_path, gradient_value, navigate_gradient};
pub use world::{NavWorldMut, NavWorldView};
