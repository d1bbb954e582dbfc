//! End-to-end tests against a real ClickHouse.
//!
//! Requires Docker to be running for testcontainers, or
//! `HEATMAP_TEST_CLICKHOUSE_URL` pointing at a server. Run with
//! `--ignored`.

use axum_test::TestServer;
use heatmap_core::{ClickHeatmapResult, HeatmapDataPoint, HeatmapPage};
use integration_tests::{fixtures, setup::ClickHouseContext};
use serde_json::Value;

/// Single click through the real store
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_clickhouse_single_click() {
    let ctx = ClickHouseContext::new().await;
    let site_id = fixtures::site_id();
    let session = fixtures::session_id();

    ctx.seed(
        &[fixtures::click(site_id, &session, 250.0, 250.0, 1000, 1000)],
        &[fixtures::metadata(site_id, &session, "https://example.com/pricing")],
    )
    .await
    .expect("Failed to seed ClickHouse");

    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    let response = server
        .get(&format!("/sites/{}/heatmap/clicks", site_id))
        .add_query_param("pathname", "/pricing")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let data: ClickHeatmapResult = serde_json::from_value(body["data"].clone()).unwrap();

    assert_eq!(data.points, vec![HeatmapDataPoint { x: 25, y: 25, value: 1 }]);
    assert_eq!(data.total_clicks, 1);
    assert_eq!(data.unique_sessions, 1);
}

/// Out-of-viewport clicks, breakpoints and half-even rounding in SQL
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_clickhouse_viewport_rules() {
    let ctx = ClickHouseContext::new().await;
    let site_id = fixtures::site_id();
    let session = fixtures::session_id();

    ctx.seed(
        &[
            fixtures::click(site_id, &session, 100.0, 100.0, 500, 800),
            fixtures::click(site_id, &session, 1001.0, 10.0, 1000, 800),
            fixtures::click(site_id, &session, 10.0, 10.0, 1200, 800),
        ],
        &[fixtures::metadata(site_id, &session, "/landing")],
    )
    .await
    .expect("Failed to seed ClickHouse");

    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .get(&format!("/sites/{}/heatmap/clicks", site_id))
        .add_query_param("pathname", "/landing")
        .add_query_param("viewportBreakpoint", "mobile")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let mobile: ClickHeatmapResult = serde_json::from_value(body["data"].clone()).unwrap();
    assert_eq!(mobile.points, vec![HeatmapDataPoint { x: 20, y: 12, value: 1 }]);

    let response = server
        .get(&format!("/sites/{}/heatmap/clicks", site_id))
        .add_query_param("pathname", "/landing")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let all: ClickHeatmapResult = serde_json::from_value(body["data"].clone()).unwrap();

    // The 1001px click is outside its 1000px viewport.
    assert_eq!(all.points.iter().map(|p| p.value).sum::<u64>(), 2);
    assert_eq!(all.total_clicks, 3);
}

/// Page ranking through the real store, URL paths extracted in SQL
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_clickhouse_pages_ranking() {
    let ctx = ClickHouseContext::new().await;
    let site_id = fixtures::site_id();
    let pricing: Vec<String> = (0..3).map(|_| fixtures::session_id()).collect();
    let about = vec![fixtures::session_id()];

    let mut clicks = fixtures::clicks_in_sessions(site_id, &pricing, 150, 1280, 720);
    clicks.extend(fixtures::clicks_in_sessions(site_id, &about, 50, 375, 667));
    let mut metadata: Vec<_> = pricing
        .iter()
        .map(|s| fixtures::metadata(site_id, s, "https://example.com/pricing?plan=pro"))
        .collect();
    metadata.push(fixtures::metadata(site_id, &about[0], "/about"));

    ctx.seed(&clicks, &metadata)
        .await
        .expect("Failed to seed ClickHouse");

    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    let response = server
        .get(&format!("/sites/{}/heatmap/pages", site_id))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let pages: Vec<HeatmapPage> = serde_json::from_value(body["data"].clone()).unwrap();

    assert_eq!(
        pages,
        vec![
            HeatmapPage {
                pathname: "/pricing".to_string(),
                click_count: 150,
                session_count: 3,
            },
            HeatmapPage {
                pathname: "/about".to_string(),
                click_count: 50,
                session_count: 1,
            },
        ]
    );
}

/// The health check sees the container
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_clickhouse_connection_check() {
    let ctx = ClickHouseContext::new().await;

    assert!(clickhouse_client::health::check_connection(&ctx.clickhouse).await);
    assert!(!ctx.clickhouse_url().is_empty());
}

/// URLs with no path segment rank under `/`, as with the in-memory store
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_clickhouse_empty_paths_rank_as_root() {
    let ctx = ClickHouseContext::new().await;
    let site_id = fixtures::site_id();
    let sessions: Vec<String> = (0..4).map(|_| fixtures::session_id()).collect();

    let clicks: Vec<_> = sessions
        .iter()
        .map(|s| fixtures::click(site_id, s, 1.0, 1.0, 100, 100))
        .collect();
    let metadata: Vec<_> = sessions
        .iter()
        .zip(["#top", "?ref=mail", "", "https://example.com"])
        .map(|(s, url)| fixtures::metadata(site_id, s, url))
        .collect();
    ctx.seed(&clicks, &metadata)
        .await
        .expect("Failed to seed ClickHouse");

    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    let response = server
        .get(&format!("/sites/{}/heatmap/pages", site_id))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let pages: Vec<HeatmapPage> = serde_json::from_value(body["data"].clone()).unwrap();
    assert_eq!(
        pages,
        vec![HeatmapPage {
            pathname: "/".to_string(),
            click_count: 4,
            session_count: 4,
        }]
    );
}
