//! Heatmap requests and results.

use crate::error::{Error, Result};
use crate::filter::FilterParams;
use crate::limits::{DEFAULT_GRID_RESOLUTION, DEFAULT_PAGES_LIMIT};
use crate::query::PathMatch;
use crate::viewport::ViewportBreakpoint;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One populated grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeatmapDataPoint {
    /// Column in `0..=grid_resolution`
    pub x: u32,
    /// Row in `0..=grid_resolution`
    pub y: u32,
    /// Clicks in this cell
    pub value: u64,
}

/// Totals over the whole matching click population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapStats {
    pub total_clicks: u64,
    pub unique_sessions: u64,
}

/// Click heatmap for one page.
///
/// `points` is capped; the totals are not, so they can exceed the sum of the
/// point values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickHeatmapResult {
    pub points: Vec<HeatmapDataPoint>,
    pub total_clicks: u64,
    pub unique_sessions: u64,
}

impl ClickHeatmapResult {
    pub fn new(points: Vec<HeatmapDataPoint>, stats: HeatmapStats) -> Self {
        Self {
            points,
            total_clicks: stats.total_clicks,
            unique_sessions: stats.unique_sessions,
        }
    }
}

/// A page with recorded clicks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapPage {
    pub pathname: String,
    pub click_count: u64,
    pub session_count: u64,
}

/// Parameters of a click heatmap request.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct HeatmapRequest {
    #[validate(range(min = 1))]
    pub site_id: u32,
    pub pathname: String,
    pub filters: FilterParams,
    pub viewport: ViewportBreakpoint,
    #[validate(range(min = 1, max = 1000))]
    pub grid_resolution: u32,
}

impl HeatmapRequest {
    pub fn new(site_id: u32, pathname: impl Into<String>) -> Self {
        Self {
            site_id,
            pathname: pathname.into(),
            filters: FilterParams::default(),
            viewport: ViewportBreakpoint::All,
            grid_resolution: DEFAULT_GRID_RESOLUTION,
        }
    }

    pub fn with_filters(mut self, filters: FilterParams) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_viewport(mut self, viewport: ViewportBreakpoint) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_grid_resolution(mut self, grid_resolution: u32) -> Self {
        self.grid_resolution = grid_resolution;
        self
    }

    /// Validate the request before it reaches the store.
    pub fn check(&self) -> Result<()> {
        if self.pathname.trim().is_empty() {
            return Err(Error::missing_field("pathname"));
        }
        self.validate()
            .map_err(|e| Error::invalid_parameter(e.to_string()))
    }

    /// Pathname with trailing slashes removed; the root stays `/`.
    pub fn clean_pathname(&self) -> &str {
        clean_pathname(&self.pathname)
    }

    /// How stored page URLs are matched for this request.
    pub fn path_match(&self) -> PathMatch {
        path_match(&self.pathname)
    }
}

/// Parameters of a page ranking request.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct PagesRequest {
    #[validate(range(min = 1))]
    pub site_id: u32,
    pub filters: FilterParams,
    #[validate(range(min = 1, max = 10000))]
    pub limit: u32,
}

impl PagesRequest {
    pub fn new(site_id: u32) -> Self {
        Self {
            site_id,
            filters: FilterParams::default(),
            limit: DEFAULT_PAGES_LIMIT,
        }
    }

    pub fn with_filters(mut self, filters: FilterParams) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| Error::invalid_parameter(e.to_string()))
    }
}

/// Strip trailing slashes, keeping the root as `/`.
pub fn clean_pathname(pathname: &str) -> &str {
    match pathname.trim_end_matches('/') {
        "" => "/",
        cleaned => cleaned,
    }
}

/// Root matches exactly; anything else matches as a substring of the stored
/// page URL, so `/blog` also picks up `/blog?page=2` and `/blog/post-1`.
pub fn path_match(pathname: &str) -> PathMatch {
    match clean_pathname(pathname) {
        "/" => PathMatch::Exact("/".to_string()),
        cleaned => PathMatch::Contains(cleaned.to_string()),
    }
}
