//! ClickHouse client wrapper.

use crate::config::ClickHouseConfig;
use crate::sql::SqlQuery;
use clickhouse::{Client, Row};
use heatmap_core::{Error, Result};
use serde::Deserialize;
use std::time::Instant;
use telemetry::metrics;
use tracing::{debug, error, info};

/// ClickHouse client wrapper.
#[derive(Clone)]
pub struct ClickHouseClient {
    inner: Client,
    config: ClickHouseConfig,
}

impl ClickHouseClient {
    /// Creates a new ClickHouse client.
    pub fn new(config: ClickHouseConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(Error::internal("ClickHouse URL is empty"));
        }

        let mut client = Client::default()
            .with_url(&config.url)
            .with_database(&config.database)
            .with_option("max_execution_time", config.timeout_secs.to_string());

        if let Some(ref user) = config.username {
            client = client.with_user(user);
        }

        if let Some(ref pass) = config.password {
            client = client.with_password(pass);
        }

        info!(
            url = %config.url,
            database = %config.database,
            timeout_secs = config.timeout_secs,
            "Created ClickHouse client"
        );

        Ok(Self {
            inner: client,
            config,
        })
    }

    /// Returns the inner clickhouse client.
    pub fn inner(&self) -> &Client {
        &self.inner
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClickHouseConfig {
        &self.config
    }

    /// Run a rendered query and collect its rows.
    ///
    /// Failures are logged with the query text here; the returned error
    /// carries the server message only.
    pub async fn fetch_rows<T>(&self, label: &'static str, query: SqlQuery) -> Result<Vec<T>>
    where
        T: Row + for<'b> Deserialize<'b>,
    {
        debug!(query = label, sql = %query.sql(), params = query.params().len(), "Running query");

        let sql = query.sql().to_string();
        let start = Instant::now();
        let outcome = query.bind_to(&self.inner).fetch_all::<T>().await;
        metrics()
            .store_query_latency_ms
            .observe(start.elapsed().as_millis() as u64);

        outcome.map_err(|e| {
            metrics().store_query_errors.inc();
            error!(query = label, sql = %sql, error = %e, "ClickHouse query failed");
            Error::query(format!("{}: {}", label, e))
        })
    }
}
