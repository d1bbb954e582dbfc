//! Core types, query model, and aggregators for the click heatmap engine.

pub mod aggregator;
pub mod error;
pub mod events;
pub mod filter;
pub mod heatmap;
pub mod limits;
pub mod query;
pub mod store;
pub mod viewport;

pub use aggregator::{AggregatorConfig, HeatmapAggregator};
pub use error::{Error, QueryErrorCode, Result, ValidationErrorCode};
pub use events::*;
pub use filter::*;
pub use heatmap::*;
pub use query::*;
pub use store::ClickStore;
pub use viewport::*;
