//! In-memory click store for testing.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use heatmap_core::{
    extract_path, ClickEvent, ClickStore, Error, HeatmapDataPoint, HeatmapPage, HeatmapStats,
    PagesQuery, PointsQuery, Predicate, Result, SessionMetadata, StatsQuery,
};
use parking_lot::Mutex;

/// Mock store that answers queries from seeded clicks and metadata.
///
/// Implements the same `ClickStore` trait as the ClickHouse client by
/// evaluating each typed predicate over the inner join of clicks and
/// metadata on `(site_id, session_id)`.
#[derive(Clone)]
pub struct MockStore {
    clicks: Arc<Mutex<Vec<ClickEvent>>>,
    metadata: Arc<Mutex<Vec<SessionMetadata>>>,
    /// Simulate failures if set.
    should_fail: Arc<Mutex<bool>>,
    queries: Arc<Mutex<usize>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            clicks: Arc::new(Mutex::new(Vec::new())),
            metadata: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
            queries: Arc::new(Mutex::new(0)),
        }
    }

    pub fn add_clicks(&self, clicks: impl IntoIterator<Item = ClickEvent>) {
        self.clicks.lock().extend(clicks);
    }

    pub fn add_metadata(&self, metadata: impl IntoIterator<Item = SessionMetadata>) {
        self.metadata.lock().extend(metadata);
    }

    /// Remove all seeded rows.
    pub fn clear(&self) {
        self.clicks.lock().clear();
        self.metadata.lock().clear();
    }

    /// Set failure mode for testing error handling.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }

    /// Number of store queries answered or failed so far.
    pub fn query_count(&self) -> usize {
        *self.queries.lock()
    }

    /// Joined rows that satisfy every predicate, one per (click, metadata) pair.
    fn matching_rows(&self, predicates: &[Predicate]) -> Result<Vec<(ClickEvent, SessionMetadata)>> {
        *self.queries.lock() += 1;
        if *self.should_fail.lock() {
            return Err(Error::query(
                "Code: 241. DB::Exception: Memory limit (total) exceeded",
            ));
        }

        let now = Utc::now();
        let clicks = self.clicks.lock();
        let metadata = self.metadata.lock();

        let mut rows = Vec::new();
        for click in clicks.iter() {
            for meta in metadata.iter().filter(|m| m.joins(click)) {
                if all_match(predicates, click, meta, now)? {
                    rows.push((click.clone(), meta.clone()));
                }
            }
        }
        Ok(rows)
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

fn all_match(
    predicates: &[Predicate],
    click: &ClickEvent,
    meta: &SessionMetadata,
    now: DateTime<Utc>,
) -> Result<bool> {
    for predicate in predicates {
        let matched = match predicate {
            Predicate::Site(site_id) => click.site_id == *site_id,
            Predicate::PositiveViewport => click.has_viewport(),
            Predicate::WithinViewport => click.is_within_viewport(),
            Predicate::ViewportWidth(range) => range.contains(click.viewport_width),
            Predicate::PageUrl(path) => path.matches(&meta.page_url),
            Predicate::Time(time) => time.window().contains(click.timestamp, now)?,
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

#[async_trait]
impl ClickStore for MockStore {
    async fn heatmap_points(&self, query: &PointsQuery) -> Result<Vec<HeatmapDataPoint>> {
        let rows = self.matching_rows(&query.predicates)?;

        let mut buckets: BTreeMap<(u32, u32), u64> = BTreeMap::new();
        for (click, _) in &rows {
            *buckets.entry(click.bucket(query.grid_resolution)).or_default() += 1;
        }

        let mut points: Vec<HeatmapDataPoint> = buckets
            .into_iter()
            .filter(|(_, value)| *value >= query.min_value)
            .map(|((x, y), value)| HeatmapDataPoint { x, y, value })
            .collect();
        points.sort_by(|a, b| b.value.cmp(&a.value).then(a.x.cmp(&b.x)).then(a.y.cmp(&b.y)));
        points.truncate(query.limit);

        Ok(points)
    }

    async fn heatmap_stats(&self, query: &StatsQuery) -> Result<HeatmapStats> {
        let rows = self.matching_rows(&query.predicates)?;
        let sessions: HashSet<&str> = rows.iter().map(|(c, _)| c.session_id.as_str()).collect();

        Ok(HeatmapStats {
            total_clicks: rows.len() as u64,
            unique_sessions: sessions.len() as u64,
        })
    }

    async fn heatmap_pages(&self, query: &PagesQuery) -> Result<Vec<HeatmapPage>> {
        let rows = self.matching_rows(&query.predicates)?;

        let mut by_path: HashMap<String, (u64, HashSet<String>)> = HashMap::new();
        for (click, meta) in rows {
            let mut pathname = extract_path(&meta.page_url);
            if pathname.is_empty() {
                pathname = "/".to_string();
            }
            let entry = by_path.entry(pathname).or_default();
            entry.0 += 1;
            entry.1.insert(click.session_id);
        }

        let mut pages: Vec<HeatmapPage> = by_path
            .into_iter()
            .map(|(pathname, (clicks, sessions))| HeatmapPage {
                pathname,
                click_count: clicks,
                session_count: sessions.len() as u64,
            })
            .collect();
        pages.sort_by(|a, b| {
            b.click_count
                .cmp(&a.click_count)
                .then_with(|| a.pathname.cmp(&b.pathname))
        });
        pages.truncate(query.limit as usize);

        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use heatmap_core::{points_query, AggregatorConfig, HeatmapRequest};

    #[tokio::test]
    async fn test_mock_store_joins_and_buckets() {
        let store = MockStore::new();
        store.add_clicks(vec![fixtures::click(1, "s1", 250.0, 250.0, 1000, 1000)]);
        store.add_metadata(vec![fixtures::metadata(1, "s1", "/pricing")]);

        let request = HeatmapRequest::new(1, "/pricing").with_grid_resolution(100);
        let points = store
            .heatmap_points(&points_query(&request, None))
            .await
            .unwrap();

        assert_eq!(points, vec![HeatmapDataPoint { x: 25, y: 25, value: 1 }]);
    }

    #[tokio::test]
    async fn test_mock_store_unjoined_clicks_are_dropped() {
        let store = MockStore::new();
        store.add_clicks(vec![fixtures::click(1, "orphan", 10.0, 10.0, 100, 100)]);

        let request = HeatmapRequest::new(1, "/");
        let stats = store
            .heatmap_stats(&heatmap_core::stats_query(
                &request,
                None,
                &AggregatorConfig::default(),
            ))
            .await
            .unwrap();

        assert_eq!(stats, HeatmapStats::default());
    }

    #[tokio::test]
    async fn test_mock_store_failure_mode() {
        let store = MockStore::new();
        store.set_should_fail(true);

        let request = HeatmapRequest::new(1, "/");
        let result = store.heatmap_points(&points_query(&request, None)).await;

        assert!(result.is_err());
        assert_eq!(store.query_count(), 1);
    }
}
