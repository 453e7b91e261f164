//! Shared application state passed to the ops handlers and used to build
//! the domain routers.

/// Cloned per handler; the connection is a pooled handle.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// PostgreSQL database connection pool
    pub db: database::postgres::DatabaseConnection,
}
