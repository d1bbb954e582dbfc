//! Application state shared across handlers.

use heatmap_core::{AggregatorConfig, ClickStore, HeatmapAggregator};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Heatmap and page ranking aggregator
    pub aggregator: HeatmapAggregator,
}

impl AppState {
    /// Create state over any click store (ClickHouse in production, in-memory in tests).
    pub fn new(store: Arc<dyn ClickStore>, config: AggregatorConfig) -> Self {
        Self {
            aggregator: HeatmapAggregator::new(store, config),
        }
    }
}
