//! Tooling primitives for deterministic game AI.
//!
//! This crate is lightweight and engine-agnostic: trace events recorded during simulation
//! and sinks to collect them. Rendering them (HUD overlays, inspectors) is up to the host.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{tags, NullTraceSink, TraceEvent, TraceLog, TraceSink, Tracer, VecTraceSink};
