//! Umbrella crate that re-exports the `ai-*` building blocks.
//!
//! `behavior` is the decision engine proper; the other crates are the primitives it is built
//! on and can be used on their own.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use ai_core as core;

#[cfg(feature = "tools")]
#[cfg_attr(docsrs, doc(cfg(feature = "tools")))]
pub use ai_tools as tools;

#[cfg(feature = "nav")]
#[cfg_attr(docsrs, doc(cfg(feature = "nav")))]
pub use ai_nav as nav;

#[cfg(feature = "intercept")]
#[cfg_attr(docsrs, doc(cfg(feature = "intercept")))]
pub use ai_intercept as intercept;

#[cfg(feature = "squad")]
#[cfg_attr(docsrs, doc(cfg(feature = "squad")))]
pub use ai_squad as squad;

#[cfg(feature = "behavior")]
#[cfg_attr(docsrs, doc(cfg(feature = "behavior")))]
pub use ai_behavior as behavior;
