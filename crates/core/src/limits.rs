//! Fixed limits and defaults for heatmap aggregation.
//!
//! Dashboards depend on these exact values. The `#[validate]` derive macro
//! requires literal values in attributes, so the parameter ranges are
//! duplicated on the API query structs. Keep both in sync when modifying.

// === Heatmap ===

/// Maximum number of buckets returned by a click heatmap query.
pub const MAX_HEATMAP_POINTS: usize = 10_000;

/// Buckets with fewer clicks than this are dropped from the point list.
pub const MIN_BUCKET_VALUE: u64 = 1;

/// Grid resolution used when the caller does not ask for one (1% cells).
pub const DEFAULT_GRID_RESOLUTION: u32 = 100;

/// Upper bound accepted for the grid resolution.
pub const MAX_GRID_RESOLUTION: u32 = 1_000;

// === Page ranking ===

/// Page count returned by the ranking query when no limit is given.
pub const DEFAULT_PAGES_LIMIT: u32 = 100;

/// Upper bound accepted for the ranking limit.
pub const MAX_PAGES_LIMIT: u32 = 10_000;
