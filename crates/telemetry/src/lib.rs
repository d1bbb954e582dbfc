//! Internal telemetry for the heatmap engine.
//!
//! Metrics are kept in-process and exposed as a JSON snapshot; there is no
//! external metrics backend.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
