//! Heatmap endpoints.
//!
//! Both handlers are thin: they read parameters, delegate to the
//! aggregator, and hide store failures behind a fixed message.

use axum::{extract::State, Json};
use heatmap_core::{
    limits::{DEFAULT_GRID_RESOLUTION, DEFAULT_PAGES_LIMIT},
    FilterParams, HeatmapRequest, PagesRequest, ViewportBreakpoint,
};
use serde::Deserialize;
use tracing::{error, info};
use validator::Validate;

use crate::extractors::{SiteId, ValidatedQuery};
use crate::response::{engine_error, ApiError, ClickHeatmapResponse, HeatmapPagesResponse};
use crate::state::AppState;

const HEATMAP_FAILURE: &str = "Failed to fetch click heatmap data";
const PAGES_FAILURE: &str = "Failed to fetch heatmap pages";

/// Display options of a click heatmap request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClickHeatmapQuery {
    pub pathname: Option<String>,
    /// `mobile`, `tablet`, `desktop` or `all`; anything else means `all`
    pub viewport_breakpoint: Option<String>,
    #[validate(range(min = 1, max = 1000))]
    pub grid_resolution: Option<u32>,
}

/// Options of a page ranking request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapPagesQuery {
    #[validate(range(min = 1, max = 10000))]
    pub limit: Option<u32>,
}

/// GET /sites/:site_id/heatmap/clicks
pub async fn click_heatmap_handler(
    State(state): State<AppState>,
    SiteId(site_id): SiteId,
    ValidatedQuery(query): ValidatedQuery<ClickHeatmapQuery>,
    ValidatedQuery(filters): ValidatedQuery<FilterParams>,
) -> Result<Json<ClickHeatmapResponse>, ApiError> {
    let pathname = match query.pathname {
        Some(pathname) if !pathname.trim().is_empty() => pathname,
        _ => return Err(ApiError::missing_field("pathname")),
    };

    let request = HeatmapRequest::new(site_id, pathname.clone())
        .with_filters(filters)
        .with_viewport(ViewportBreakpoint::from_param(
            query.viewport_breakpoint.as_deref(),
        ))
        .with_grid_resolution(query.grid_resolution.unwrap_or(DEFAULT_GRID_RESOLUTION));

    let data = state
        .aggregator
        .click_heatmap(&request)
        .await
        .map_err(|e| {
            if !e.is_validation() {
                error!(site_id = site_id, pathname = %pathname, error = %e, "Error fetching click heatmap");
            }
            engine_error(e, HEATMAP_FAILURE)
        })?;

    info!(
        site_id = site_id,
        pathname = %pathname,
        viewport = %request.viewport,
        points = data.points.len(),
        "Served click heatmap"
    );

    Ok(Json(ClickHeatmapResponse { data, pathname }))
}

/// GET /sites/:site_id/heatmap/pages
pub async fn heatmap_pages_handler(
    State(state): State<AppState>,
    SiteId(site_id): SiteId,
    ValidatedQuery(query): ValidatedQuery<HeatmapPagesQuery>,
    ValidatedQuery(filters): ValidatedQuery<FilterParams>,
) -> Result<Json<HeatmapPagesResponse>, ApiError> {
    let request = PagesRequest::new(site_id)
        .with_filters(filters)
        .with_limit(query.limit.unwrap_or(DEFAULT_PAGES_LIMIT));

    let data = state
        .aggregator
        .heatmap_pages(&request)
        .await
        .map_err(|e| {
            if !e.is_validation() {
                error!(site_id = site_id, error = %e, "Error fetching heatmap pages");
            }
            engine_error(e, PAGES_FAILURE)
        })?;

    info!(site_id = site_id, pages = data.len(), "Served heatmap pages");

    Ok(Json(HeatmapPagesResponse { data }))
}
