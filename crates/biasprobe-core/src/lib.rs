//! biasprobe core library
//!
//! Randomized probe selection, order-effect prevention and concurrent
//! battery execution for cognitive-bias diagnostics of language models.

pub mod battery;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod fakes;
pub mod metrics;
pub mod obs;
pub mod probe;
pub mod randomization;
pub mod telemetry;

pub use battery::{
    run_battery, BatterySummary, ExecutionOptions, ExportFormat, ExportOutput, OverallStatistics,
    TestBattery,
};

pub use catalog::{load_catalog, parse_catalog, CatalogProbe};

pub use config::HarnessConfig;

pub use domain::{
    BatteryItem, ExecutionResult, HarnessError, Metadata, ProbeRequest, ProbeType, ProbeVariant,
    ResponseFormat, Result,
};

pub use probe::{
    execute_probe, ExecutionMetadata, GenerationRequest, ModelResponse, ProbeProvider,
    ProbeRegistry, Responder, ScoreOutcome,
};

pub use randomization::{
    generate_latin_square, LatinSquare, OrderEffectPrevention, ProbeRandomizer,
    RandomizationConfig, RandomizationStrategy, SessionContext, SessionId, SessionRegistry,
    SessionSummary,
};

/// biasprobe version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
