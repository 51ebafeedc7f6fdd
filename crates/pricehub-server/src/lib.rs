//! Pricehub Server Library
//!
//! HTTP service that ingests zip archives of CSV price lists into PostgreSQL and
//! exports the stored dataset back as a zip archive.
//!
//! # Architecture
//!
//! - [`ingest`]: synchronous pipeline from archive bytes to validated records,
//!   behind the `ArchiveSource` and `RowSource` capability traits
//! - [`features`]: vertical slices with commands (writes), queries (reads) and
//!   routes
//! - [`api`]: top-level router, health and error response types
//! - [`db`]: pool construction, migrations and health probing
//! - [`config`]: environment-based configuration
//! - [`middleware`]: CORS and request tracing layers
//!
//! Ingestion is idempotent: records are keyed by their client-supplied
//! `external_id` and a batch is persisted in a single transaction, so either
//! every record of an upload is applied or none is.
//!
//! # Example
//!
//! ```no_run
//! use pricehub_server::{api, config::Config, db};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     db::run_migrations(&pool).await?;
//!
//!     let app = api::create_router(api::AppState { db: pool }, &config);
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod features;
pub mod ingest;
pub mod middleware;
