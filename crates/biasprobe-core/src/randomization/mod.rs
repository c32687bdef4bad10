//! Probe randomization and order-effect prevention.
//!
//! # Module layout
//!
//! - [`combinatorics`]: `generate_latin_square`, `build_counterbalance_queue`, `stable_hash`
//! - [`config`]: `RandomizationConfig`, `RandomizationStrategy`, `OrderEffectPrevention`
//! - [`session`]: `SessionContext`, `SessionRegistry`, `SessionSummary`
//! - [`selector`]: `ProbeRandomizer`

pub mod combinatorics;
pub mod config;
pub mod selector;
pub mod session;

pub use combinatorics::{
    build_counterbalance_queue, build_order_queue, generate_latin_square, stable_hash,
    LatinSquare, COUNTERBALANCE_REPETITIONS,
};
pub use config::{OrderEffectPrevention, RandomizationConfig, RandomizationStrategy};
pub use selector::ProbeRandomizer;
pub use session::{SessionContext, SessionId, SessionRegistry, SessionSummary};
