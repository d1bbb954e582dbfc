//! Click Heatmap Engine
//!
//! Read-side analytics service for session replay clicks:
//! - Viewport segmentation into mobile, tablet and desktop breakpoints
//! - Grid-bucketed click heatmaps with total click and session counts
//! - Page ranking by click volume
//! - ClickHouse as the analytics store

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use api::{router, AppState};
use clickhouse_client::{ClickHouseClient, ClickHouseConfig};
use heatmap_core::AggregatorConfig;
use telemetry::init_tracing_from_env;

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    /// Create the click and metadata tables on startup if missing
    #[serde(default = "default_init_schema")]
    init_schema: bool,

    #[serde(default)]
    clickhouse: ClickHouseConfig,

    #[serde(default)]
    heatmap: AggregatorConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_init_schema() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            init_schema: default_init_schema(),
            clickhouse: ClickHouseConfig::default(),
            heatmap: AggregatorConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env().context("Failed to initialize tracing")?;

    info!("Starting Click Heatmap Engine v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;

    info!(
        url = %config.clickhouse.url,
        database = %config.clickhouse.database,
        stats_coordinate_guard = config.heatmap.stats_coordinate_guard,
        "Loaded configuration"
    );

    let clickhouse = Arc::new(
        ClickHouseClient::new(config.clickhouse.clone())
            .context("Failed to create ClickHouse client")?,
    );

    if config.init_schema {
        if let Err(e) = clickhouse_client::health::init_schema(&clickhouse).await {
            // Tables may already exist under a role without DDL rights
            error!("Failed to initialize ClickHouse schema: {}", e);
        }
    }

    if clickhouse_client::health::check_connection(&clickhouse).await {
        info!("ClickHouse connection: healthy");
    } else {
        warn!("ClickHouse connection: unhealthy, serving anyway");
    }

    let state = AppState::new(clickhouse, config.heatmap.clone());
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        .add_source(config::Config::try_from(&Config::default())?)
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("HEATMAP")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Flat overrides for the nested ClickHouse section
    if let Ok(url) = std::env::var("HEATMAP_CLICKHOUSE_URL") {
        config.clickhouse.url = url;
    }
    if let Ok(database) = std::env::var("HEATMAP_CLICKHOUSE_DATABASE") {
        config.clickhouse.database = database;
    }
    if let Ok(username) = std::env::var("HEATMAP_CLICKHOUSE_USERNAME") {
        config.clickhouse.username = Some(username);
    }
    if let Ok(password) = std::env::var("HEATMAP_CLICKHOUSE_PASSWORD") {
        config.clickhouse.password = Some(password);
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
