//! Analytics store abstraction.

use crate::error::Result;
use crate::heatmap::{HeatmapDataPoint, HeatmapPage, HeatmapStats};
use crate::query::{PagesQuery, PointsQuery, StatsQuery};
use async_trait::async_trait;

/// Read-only access to stored clicks joined with session metadata.
///
/// Implementations join clicks to metadata on `(site_id, session_id)` and
/// apply every predicate of the query as a conjunction.
#[async_trait]
pub trait ClickStore: Send + Sync {
    /// Bucketed click counts ordered by `value` descending, then `x`, then
    /// `y` ascending, limited to `query.limit` rows with `value >= query.min_value`.
    async fn heatmap_points(&self, query: &PointsQuery) -> Result<Vec<HeatmapDataPoint>>;

    /// Row count and distinct session count. An empty match yields zeros.
    async fn heatmap_stats(&self, query: &StatsQuery) -> Result<HeatmapStats>;

    /// Clicks per page path ordered by click count descending, then
    /// pathname ascending.
    async fn heatmap_pages(&self, query: &PagesQuery) -> Result<Vec<HeatmapPage>>;
}
