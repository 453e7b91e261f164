//! Readiness and bootstrap handlers backed by the database.

use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use database::postgres::{check_health, check_table_exists, run_migrations};
use domain_items::{ItemError, TextError};
use migration::{ITEMS_TABLE, Migrator};

/// Ready when the database answers and the items table exists.
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
        (
            "database",
            Box::pin(async { check_health(&state.db).await.map_err(|e| e.to_string()) }),
        ),
        (
            "items_table",
            Box::pin(async {
                check_table_exists(&state.db, ITEMS_TABLE)
                    .await
                    .map_err(|e| e.to_string())
            }),
        ),
    ];

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}

/// Create the items table if missing. Replies `ok: table ready`.
pub async fn init_handler(State(state): State<AppState>) -> Result<&'static str, TextError> {
    run_migrations::<Migrator>(&state.db, state.config.app.name)
        .await
        .map_err(|e| TextError(ItemError::from(e)))?;

    Ok("ok: table ready\n")
}
