use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tracing::debug;

use crate::common::DatabaseError;

/// Check PostgreSQL database health with `SELECT 1`
pub async fn check_health(db: &DatabaseConnection) -> Result<(), DatabaseError> {
    debug!("Running PostgreSQL health check");

    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1".to_owned());
    db.query_one_raw(stmt).await.map_err(|e| {
        DatabaseError::HealthCheckFailed(format!("PostgreSQL health check failed: {}", e))
    })?;

    debug!("PostgreSQL health check passed");
    Ok(())
}

/// Verify that `table` exists in the current schema
///
/// Readiness checks use this so an instance that has not run its migrations
/// yet is reported as not ready rather than failing every request.
pub async fn check_table_exists(db: &DatabaseConnection, table: &str) -> Result<(), DatabaseError> {
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        "SELECT 1 FROM information_schema.tables \
         WHERE table_schema = current_schema() AND table_name = $1",
        [table.into()],
    );

    let row = db
        .query_one_raw(stmt)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(format!("Table lookup failed: {}", e)))?;

    match row {
        Some(_) => Ok(()),
        None => Err(DatabaseError::HealthCheckFailed(format!(
            "Table '{}' does not exist",
            table
        ))),
    }
}
