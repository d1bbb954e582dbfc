//! Store-agnostic description of the heatmap queries.
//!
//! Queries are built as typed predicate sets. Stores render them into their
//! own query language with every user-supplied value passed as a bound
//! parameter, never spliced into query text.
//!
//! The points query and the stats query share [`base_predicates`]. Only the
//! points query adds [`Predicate::WithinViewport`]; stats count clicks that
//! fall outside their recorded viewport unless
//! [`AggregatorConfig::stats_coordinate_guard`] is set.

use crate::aggregator::AggregatorConfig;
use crate::filter::TimePredicate;
use crate::heatmap::{HeatmapRequest, PagesRequest};
use crate::limits::{MAX_HEATMAP_POINTS, MIN_BUCKET_VALUE};
use crate::viewport::WidthRange;
use std::fmt;

/// Tables taking part in heatmap queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableAlias {
    /// Click fact table
    Clicks,
    /// Session metadata table
    Metadata,
}

impl TableAlias {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clicks => "src",
            Self::Metadata => "srm",
        }
    }
}

/// A column, optionally qualified by table alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    table: Option<TableAlias>,
    name: &'static str,
}

impl ColumnRef {
    pub const fn bare(name: &'static str) -> Self {
        Self { table: None, name }
    }

    pub const fn qualified(table: TableAlias, name: &'static str) -> Self {
        Self {
            table: Some(table),
            name,
        }
    }

    pub fn table(&self) -> Option<TableAlias> {
        self.table
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.table {
            Some(table) => write!(f, "{}.{}", table.as_str(), self.name),
            None => f.write_str(self.name),
        }
    }
}

/// Timestamp column of the click table; time predicates are rebound here.
pub const CLICK_TIMESTAMP: ColumnRef = ColumnRef::qualified(TableAlias::Clicks, "timestamp");

/// How the session's page URL is matched against the requested pathname.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathMatch {
    /// Page URL equals the value.
    Exact(String),
    /// Page URL contains the value anywhere.
    Contains(String),
}

impl PathMatch {
    pub fn matches(&self, page_url: &str) -> bool {
        match self {
            Self::Exact(path) => page_url == path,
            Self::Contains(fragment) => page_url.contains(fragment.as_str()),
        }
    }
}

/// A single conjunct of a query's filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `src.site_id = ?`
    Site(u32),
    /// `src.viewport_width > 0 AND src.viewport_height > 0`
    PositiveViewport,
    /// Click coordinates inside `[0, viewport]` on both axes.
    WithinViewport,
    /// Breakpoint restriction on `src.viewport_width`.
    ViewportWidth(WidthRange),
    /// Match on `srm.page_url`.
    PageUrl(PathMatch),
    /// Time window on a timestamp column.
    Time(TimePredicate),
}

/// Grid-bucketed click counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointsQuery {
    pub predicates: Vec<Predicate>,
    pub grid_resolution: u32,
    pub min_value: u64,
    pub limit: usize,
}

/// Total clicks and distinct sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsQuery {
    pub predicates: Vec<Predicate>,
}

/// Click volume per page path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagesQuery {
    pub predicates: Vec<Predicate>,
    pub limit: u32,
}

/// Filters shared by the points and stats queries.
pub fn base_predicates(request: &HeatmapRequest, time: Option<TimePredicate>) -> Vec<Predicate> {
    let mut predicates = vec![Predicate::Site(request.site_id), Predicate::PositiveViewport];

    if let Some(range) = request.viewport.width_range() {
        predicates.push(Predicate::ViewportWidth(range));
    }

    predicates.push(Predicate::PageUrl(request.path_match()));

    if let Some(time) = time {
        predicates.push(Predicate::Time(time.rebind(CLICK_TIMESTAMP)));
    }

    predicates
}

/// Query for the bucketed point list.
pub fn points_query(request: &HeatmapRequest, time: Option<TimePredicate>) -> PointsQuery {
    let mut predicates = base_predicates(request, time);
    predicates.push(Predicate::WithinViewport);

    PointsQuery {
        predicates,
        grid_resolution: request.grid_resolution,
        min_value: MIN_BUCKET_VALUE,
        // One row past the cap so the aggregator can tell a full page from a cut one.
        limit: MAX_HEATMAP_POINTS + 1,
    }
}

/// Query for the unbucketed totals.
pub fn stats_query(
    request: &HeatmapRequest,
    time: Option<TimePredicate>,
    config: &AggregatorConfig,
) -> StatsQuery {
    let mut predicates = base_predicates(request, time);
    if config.stats_coordinate_guard {
        predicates.push(Predicate::WithinViewport);
    }

    StatsQuery { predicates }
}

/// Query for the page ranking. No viewport or pathname restriction.
pub fn pages_query(request: &PagesRequest, time: Option<TimePredicate>) -> PagesQuery {
    let mut predicates = vec![Predicate::Site(request.site_id)];

    if let Some(time) = time {
        predicates.push(Predicate::Time(time.rebind(CLICK_TIMESTAMP)));
    }

    PagesQuery {
        predicates,
        limit: request.limit,
    }
}
