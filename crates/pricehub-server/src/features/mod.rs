//! Feature slices of the Pricehub API
//!
//! Each feature is a vertical slice with its own commands (writes), queries
//! (reads) and route definitions:
//!
//! - `commands/` - Write operations, one handler per command
//! - `queries/` - Read operations, one handler per query
//! - `routes.rs` - HTTP route definitions and error-to-response mapping
//!
//! Handlers are plain async functions taking the connection pool and a command
//! or query value, so they can be exercised directly in tests.

pub mod prices;

use axum::Router;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// PostgreSQL connection pool for database operations
    pub db: sqlx::PgPool,
}

/// Creates the feature router with every slice mounted.
///
/// The price routes are served both at `/prices` and at the versioned
/// `/api/v0/prices` path used by existing clients.
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/prices", prices::prices_routes().with_state(state.db.clone()))
        .nest("/api/v0/prices", prices::prices_routes().with_state(state.db))
}
