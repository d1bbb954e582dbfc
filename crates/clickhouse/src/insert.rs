//! Insert helpers for seeding click data (local setups and tests).

use crate::client::ClickHouseClient;
use crate::schema::{CLICKS_TABLE, METADATA_TABLE};
use clickhouse::Row;
use heatmap_core::{ClickEvent, Error, Result, SessionMetadata};
use serde::Serialize;
use tracing::debug;

/// Click row for ClickHouse insertion.
#[derive(Debug, Clone, Row, Serialize)]
pub struct ClickRow {
    pub site_id: u32,
    pub session_id: String,
    pub x: f64,
    pub y: f64,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub timestamp: i64, // milliseconds since epoch
}

impl From<&ClickEvent> for ClickRow {
    fn from(click: &ClickEvent) -> Self {
        Self {
            site_id: click.site_id,
            session_id: click.session_id.clone(),
            x: click.x,
            y: click.y,
            viewport_width: click.viewport_width,
            viewport_height: click.viewport_height,
            timestamp: click.timestamp.timestamp_millis(),
        }
    }
}

/// Session metadata row for ClickHouse insertion.
#[derive(Debug, Clone, Row, Serialize)]
pub struct MetadataRow {
    pub site_id: u32,
    pub session_id: String,
    pub page_url: String,
    pub timestamp: i64, // milliseconds since epoch
}

impl From<&SessionMetadata> for MetadataRow {
    fn from(meta: &SessionMetadata) -> Self {
        Self {
            site_id: meta.site_id,
            session_id: meta.session_id.clone(),
            page_url: meta.page_url.clone(),
            timestamp: meta.timestamp.timestamp_millis(),
        }
    }
}

/// Insert clicks in a single batch.
pub async fn insert_clicks(client: &ClickHouseClient, clicks: &[ClickEvent]) -> Result<usize> {
    let rows: Vec<ClickRow> = clicks.iter().map(ClickRow::from).collect();
    write_rows(client, CLICKS_TABLE, &rows).await
}

/// Insert session metadata in a single batch.
pub async fn insert_metadata(
    client: &ClickHouseClient,
    metadata: &[SessionMetadata],
) -> Result<usize> {
    let rows: Vec<MetadataRow> = metadata.iter().map(MetadataRow::from).collect();
    write_rows(client, METADATA_TABLE, &rows).await
}

async fn write_rows<T>(client: &ClickHouseClient, table: &str, rows: &[T]) -> Result<usize>
where
    T: Row + Serialize,
{
    if rows.is_empty() {
        return Ok(0);
    }

    let mut insert = client
        .inner()
        .insert(table)
        .map_err(|e| Error::internal(format!("Insert error: {}", e)))?;

    for row in rows {
        insert
            .write(row)
            .await
            .map_err(|e| Error::internal(format!("Write error: {}", e)))?;
    }

    insert
        .end()
        .await
        .map_err(|e| Error::internal(format!("End error: {}", e)))?;

    debug!(table = table, rows = rows.len(), "Inserted rows");
    Ok(rows.len())
}
