//! Common test setup functions.

use std::sync::Arc;

use api::{router, AppState};
use axum::Router;
use clickhouse_client::{
    health::init_schema,
    insert::{insert_clicks, insert_metadata},
    ClickHouseClient,
};
use heatmap_core::{AggregatorConfig, ClickEvent, ClickStore, Result, SessionMetadata};

use crate::containers::TestContainers;
use crate::mocks::MockStore;

/// Test context over the in-memory store.
///
/// Uses the real Axum router with all layers; only the store is replaced.
pub struct TestContext {
    pub store: Arc<MockStore>,
    pub router: Router,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(AggregatorConfig::default())
    }

    pub fn with_config(config: AggregatorConfig) -> Self {
        let store = Arc::new(MockStore::new());
        let state = AppState::new(store.clone() as Arc<dyn ClickStore>, config);

        Self {
            store,
            router: router(state),
        }
    }

    /// Seed clicks and the metadata rows they join with.
    pub fn seed(&self, clicks: Vec<ClickEvent>, metadata: Vec<SessionMetadata>) {
        self.store.add_clicks(clicks);
        self.store.add_metadata(metadata);
    }

    /// Set the store to fail (for error testing).
    pub fn set_store_failure(&self, should_fail: bool) {
        self.store.set_should_fail(should_fail);
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Test context with a real ClickHouse testcontainer.
pub struct ClickHouseContext {
    pub containers: TestContainers,
    pub clickhouse: Arc<ClickHouseClient>,
    pub router: Router,
}

impl ClickHouseContext {
    /// Start ClickHouse, create the schema, and build the router over it.
    pub async fn new() -> Self {
        let containers = TestContainers::start().await;

        let clickhouse = Arc::new(
            ClickHouseClient::new(containers.clickhouse_config())
                .expect("Failed to create ClickHouse client"),
        );

        init_schema(&clickhouse)
            .await
            .expect("Failed to initialize schema");

        let state = AppState::new(
            clickhouse.clone() as Arc<dyn ClickStore>,
            AggregatorConfig::default(),
        );
        let router = router(state);

        Self {
            containers,
            clickhouse,
            router,
        }
    }

    /// Insert clicks and metadata into the store.
    pub async fn seed(&self, clicks: &[ClickEvent], metadata: &[SessionMetadata]) -> Result<()> {
        insert_clicks(&self.clickhouse, clicks).await?;
        insert_metadata(&self.clickhouse, metadata).await?;
        Ok(())
    }

    /// Get the ClickHouse URL.
    pub fn clickhouse_url(&self) -> &str {
        &self.containers.clickhouse_url
    }
}
