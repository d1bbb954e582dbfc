//! [`ClickStore`] implementation over ClickHouse.

use crate::client::ClickHouseClient;
use crate::sql::{pages_sql, points_sql, stats_sql};
use async_trait::async_trait;
use clickhouse::Row;
use heatmap_core::{
    ClickStore, HeatmapDataPoint, HeatmapPage, HeatmapStats, PagesQuery, PointsQuery, Result,
    StatsQuery,
};
use serde::Deserialize;

/// One bucket from the points query.
#[derive(Debug, Clone, Row, Deserialize)]
pub struct PointRow {
    pub bucket_x: u32,
    pub bucket_y: u32,
    pub value: u64,
}

impl From<PointRow> for HeatmapDataPoint {
    fn from(row: PointRow) -> Self {
        Self {
            x: row.bucket_x,
            y: row.bucket_y,
            value: row.value,
        }
    }
}

/// Totals from the stats query.
#[derive(Debug, Clone, Row, Deserialize)]
pub struct StatsRow {
    pub total_clicks: u64,
    pub unique_sessions: u64,
}

impl From<StatsRow> for HeatmapStats {
    fn from(row: StatsRow) -> Self {
        Self {
            total_clicks: row.total_clicks,
            unique_sessions: row.unique_sessions,
        }
    }
}

/// One page from the ranking query.
#[derive(Debug, Clone, Row, Deserialize)]
pub struct PageRow {
    pub pathname: String,
    pub click_count: u64,
    pub session_count: u64,
}

impl From<PageRow> for HeatmapPage {
    fn from(row: PageRow) -> Self {
        Self {
            pathname: row.pathname,
            click_count: row.click_count,
            session_count: row.session_count,
        }
    }
}

#[async_trait]
impl ClickStore for ClickHouseClient {
    async fn heatmap_points(&self, query: &PointsQuery) -> Result<Vec<HeatmapDataPoint>> {
        let rows: Vec<PointRow> = self.fetch_rows("heatmap points", points_sql(query)).await?;
        Ok(rows.into_iter().map(HeatmapDataPoint::from).collect())
    }

    async fn heatmap_stats(&self, query: &StatsQuery) -> Result<HeatmapStats> {
        let rows: Vec<StatsRow> = self.fetch_rows("heatmap stats", stats_sql(query)).await?;
        Ok(rows
            .into_iter()
            .next()
            .map(HeatmapStats::from)
            .unwrap_or_default())
    }

    async fn heatmap_pages(&self, query: &PagesQuery) -> Result<Vec<HeatmapPage>> {
        let rows: Vec<PageRow> = self.fetch_rows("heatmap pages", pages_sql(query)).await?;
        Ok(rows.into_iter().map(HeatmapPage::from).collect())
    }
}
