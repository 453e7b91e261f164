/// Error type for connector-level operations: probing and table checks.
///
/// Repository queries keep `sea_orm::DbErr` and each domain maps it.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[cfg(feature = "postgres")]
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sea_orm::DbErr),

    /// A readiness check did not pass
    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "postgres")]
    #[test]
    fn test_db_err_converts() {
        let err: DatabaseError = sea_orm::DbErr::Custom("pool closed".into()).into();
        assert!(err.to_string().starts_with("PostgreSQL error"));
        assert!(err.to_string().contains("pool closed"));
    }

    #[test]
    fn test_health_check_message() {
        let err = DatabaseError::HealthCheckFailed("Table 'items' does not exist".into());
        assert_eq!(
            err.to_string(),
            "Health check failed: Table 'items' does not exist"
        );
    }
}
