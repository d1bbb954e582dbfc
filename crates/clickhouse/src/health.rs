//! ClickHouse health checks.

use crate::client::ClickHouseClient;
use heatmap_core::{Error, Result};
use telemetry::health;
use tracing::{debug, error};

/// Check ClickHouse connection health and record it in the registry.
pub async fn check_connection(client: &ClickHouseClient) -> bool {
    match client.inner().query("SELECT 1").fetch_one::<u8>().await {
        Ok(_) => {
            debug!("ClickHouse connection healthy");
            health().clickhouse.set_healthy();
            true
        }
        Err(e) => {
            error!("ClickHouse health check failed: {}", e);
            health().clickhouse.set_unhealthy(e.to_string());
            false
        }
    }
}

/// Create the click and metadata tables if they do not exist.
pub async fn init_schema(client: &ClickHouseClient) -> Result<()> {
    use crate::schema::all_tables;

    for ddl in all_tables() {
        client
            .inner()
            .query(ddl)
            .execute()
            .await
            .map_err(|e| Error::internal(format!("Failed to execute DDL: {}", e)))?;
    }

    debug!("ClickHouse schema initialized");
    Ok(())
}
