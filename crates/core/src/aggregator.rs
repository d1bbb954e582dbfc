//! Heatmap and page ranking aggregators.
//!
//! Both are stateless wrappers around a [`ClickStore`]: they validate the
//! request, build the typed queries and execute them. A heatmap issues the
//! points and stats queries concurrently; if either fails the other is
//! dropped and the whole request fails.

use crate::error::{Error, Result};
use crate::heatmap::{ClickHeatmapResult, HeatmapPage, HeatmapRequest, PagesRequest};
use crate::limits::MAX_HEATMAP_POINTS;
use crate::query::{pages_query, points_query, stats_query};
use crate::store::ClickStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use telemetry::metrics;
use tracing::debug;

/// Aggregation behaviour switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Apply the coordinate-sanity gate to the stats query as well.
    ///
    /// Off by default: totals include clicks recorded outside their
    /// viewport, which the point list excludes.
    #[serde(default)]
    pub stats_coordinate_guard: bool,
}

/// Executes heatmap and page ranking requests against a store.
#[derive(Clone)]
pub struct HeatmapAggregator {
    store: Arc<dyn ClickStore>,
    config: AggregatorConfig,
}

impl HeatmapAggregator {
    pub fn new(store: Arc<dyn ClickStore>, config: AggregatorConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Compute the click heatmap for one page.
    pub async fn click_heatmap(&self, request: &HeatmapRequest) -> Result<ClickHeatmapResult> {
        request.check()?;
        let time = request.filters.time_predicate()?;

        let points_query = points_query(request, time.clone());
        let stats_query = stats_query(request, time, &self.config);

        metrics().heatmap_requests.inc();
        let in_flight = metrics().in_flight_queries.track();
        let start = Instant::now();

        let outcome = tokio::try_join!(
            self.store.heatmap_points(&points_query),
            self.store.heatmap_stats(&stats_query),
        );

        drop(in_flight);
        metrics()
            .heatmap_latency_ms
            .observe(start.elapsed().as_millis() as u64);

        let (mut points, stats) = outcome.map_err(|e| {
            metrics().heatmap_failures.inc();
            Error::aggregation("click heatmap", e)
        })?;

        if points.len() > MAX_HEATMAP_POINTS {
            points.truncate(MAX_HEATMAP_POINTS);
            metrics().capped_heatmaps.inc();
        }
        metrics().points_returned.inc_by(points.len() as u64);

        debug!(
            site_id = request.site_id,
            pathname = %request.clean_pathname(),
            viewport = %request.viewport,
            grid_resolution = request.grid_resolution,
            points = points.len(),
            total_clicks = stats.total_clicks,
            "Computed click heatmap"
        );

        Ok(ClickHeatmapResult::new(points, stats))
    }

    /// List pages with click data, busiest first.
    pub async fn heatmap_pages(&self, request: &PagesRequest) -> Result<Vec<HeatmapPage>> {
        request.check()?;
        let time = request.filters.time_predicate()?;
        let query = pages_query(request, time);

        metrics().page_requests.inc();
        let in_flight = metrics().in_flight_queries.track();
        let start = Instant::now();

        let outcome = self.store.heatmap_pages(&query).await;

        drop(in_flight);
        metrics()
            .pages_latency_ms
            .observe(start.elapsed().as_millis() as u64);

        let mut pages = outcome.map_err(|e| {
            metrics().page_failures.inc();
            Error::aggregation("heatmap pages", e)
        })?;
        pages.truncate(query.limit as usize);

        debug!(
            site_id = request.site_id,
            limit = request.limit,
            pages = pages.len(),
            "Ranked heatmap pages"
        );

        Ok(pages)
    }
}
