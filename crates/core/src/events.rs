//! Stored click and session records, as read from the analytics store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// A single recorded click (fact table row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub site_id: u32,
    pub session_id: String,
    /// Horizontal position in CSS pixels from the viewport's left edge
    pub x: f64,
    /// Vertical position in CSS pixels from the viewport's top edge
    pub y: f64,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub timestamp: DateTime<Utc>,
}

impl ClickEvent {
    /// Check that the viewport has a usable size.
    pub fn has_viewport(&self) -> bool {
        self.viewport_width > 0 && self.viewport_height > 0
    }

    /// Check that the click can be placed in percentage space.
    ///
    /// Boundaries are inclusive: a click at exactly `x == viewport_width`
    /// is kept.
    pub fn is_within_viewport(&self) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.x <= f64::from(self.viewport_width)
            && self.y <= f64::from(self.viewport_height)
    }

    /// Grid cell of this click at the given resolution.
    pub fn bucket(&self, grid_resolution: u32) -> (u32, u32) {
        (
            bucket_coordinate(self.x, self.viewport_width, grid_resolution),
            bucket_coordinate(self.y, self.viewport_height, grid_resolution),
        )
    }
}

/// Session-level page metadata (dimension table row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub site_id: u32,
    pub session_id: String,
    pub page_url: String,
    pub timestamp: DateTime<Utc>,
}

impl SessionMetadata {
    /// Check whether this metadata row joins with a click.
    pub fn joins(&self, click: &ClickEvent) -> bool {
        self.site_id == click.site_id && self.session_id == click.session_id
    }
}

/// Map a pixel position onto a `0..=grid_resolution` grid.
///
/// Rounds half to even, matching ClickHouse `round()` on floats. Callers
/// must ensure `extent > 0`; for `0 <= position <= extent` the result is
/// within `[0, grid_resolution]`.
pub fn bucket_coordinate(position: f64, extent: u32, grid_resolution: u32) -> u32 {
    let scaled = position / f64::from(extent) * f64::from(grid_resolution);
    scaled.round_ties_even().clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Extract the path segment of a page URL.
///
/// Absolute URLs lose scheme, host, query and fragment. Bare paths
/// (`/pricing?ref=x`) lose only query and fragment.
pub fn extract_path(page_url: &str) -> String {
    if let Ok(url) = Url::parse(page_url) {
        if url.has_host() {
            return url.path().to_string();
        }
    }

    let end = page_url
        .find(|c| c == '?' || c == '#')
        .unwrap_or(page_url.len());
    page_url[..end].to_string()
}
