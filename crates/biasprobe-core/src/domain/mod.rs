//! Domain models for the probe harness.
//!
//! - `ProbeType` / `ResponseFormat`: closed enumerations
//! - `ProbeVariant`: a concrete prompt instance owned by a probe provider
//! - `BatteryItem`, `ProbeRequest`, `ExecutionResult`: the execution worklist and its outcomes
//! - `HarnessError`: error taxonomy

pub mod error;
pub mod probe_type;
pub mod result;
pub mod variant;

pub use error::{HarnessError, Result};
pub use probe_type::{ProbeType, ResponseFormat};
pub use result::{BatteryItem, ExecutionResult, ProbeRequest};
pub use variant::{Metadata, ProbeVariant};
