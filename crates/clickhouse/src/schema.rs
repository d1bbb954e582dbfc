//! ClickHouse table schemas.
//!
//! The production tables are owned by the ingestion side; these definitions
//! cover the columns the heatmap queries read and are used for local and
//! test databases.

/// Click fact table.
pub const CLICKS_TABLE: &str = "session_replay_clicks";

/// Session metadata dimension table.
pub const METADATA_TABLE: &str = "session_replay_metadata";

/// SQL for creating the clicks table.
pub const CREATE_CLICKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS session_replay_clicks (
    site_id UInt32,
    session_id String,
    x Float64,
    y Float64,
    viewport_width UInt32,
    viewport_height UInt32,
    timestamp DateTime64(3)
)
ENGINE = MergeTree()
PARTITION BY toYYYYMM(timestamp)
ORDER BY (site_id, timestamp, session_id)
SETTINGS index_granularity = 8192
"#;

/// SQL for creating the session metadata table.
///
/// Plain MergeTree: several rows per session survive and each one joins.
pub const CREATE_METADATA_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS session_replay_metadata (
    site_id UInt32,
    session_id String,
    page_url String,
    timestamp DateTime64(3)
)
ENGINE = MergeTree()
PARTITION BY toYYYYMM(timestamp)
ORDER BY (site_id, session_id)
SETTINGS index_granularity = 8192
"#;

/// Returns all DDL statements in order.
pub fn all_tables() -> Vec<&'static str> {
    vec![CREATE_CLICKS_TABLE, CREATE_METADATA_TABLE]
}
