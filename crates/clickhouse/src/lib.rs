//! ClickHouse-backed click store for the heatmap engine.

pub mod client;
pub mod config;
pub mod health;
pub mod insert;
pub mod query;
pub mod schema;
pub mod sql;

pub use client::*;
pub use config::*;
pub use query::*;
