use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::AppError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ItemError {
    /// Malformed or missing input field
    #[error("{0}")]
    Validation(String),

    #[error("item {0} not found")]
    NotFound(i64),

    /// Uniqueness constraint violated
    #[error("{0}")]
    Conflict(String),

    /// The store could not be reached or a statement failed for reasons
    /// unrelated to the input
    #[error("item store unavailable: {0}")]
    StoreUnavailable(String),
}

pub type ItemResult<T> = Result<T, ItemError>;

impl ItemError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ItemError::Validation(msg.into())
    }

    pub fn duplicate_name(name: &str) -> Self {
        ItemError::Conflict(format!("item with name '{}' already exists", name))
    }

    /// Map a failed write that carried `name`: unique violations become a
    /// conflict naming the offending item.
    pub fn from_write(err: DbErr, name: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::duplicate_name(name),
            _ => err.into(),
        }
    }

    /// Stable label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            ItemError::Validation(_) => "validation",
            ItemError::NotFound(_) => "not_found",
            ItemError::Conflict(_) => "conflict",
            ItemError::StoreUnavailable(_) => "store_unavailable",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ItemError::Validation(_) => StatusCode::BAD_REQUEST,
            ItemError::NotFound(_) => StatusCode::NOT_FOUND,
            ItemError::Conflict(_) => StatusCode::CONFLICT,
            ItemError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<DbErr> for ItemError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => ItemError::Conflict(detail),
            _ => ItemError::StoreUnavailable(err.to_string()),
        }
    }
}

/// Convert ItemError to AppError for standardized error responses
impl From<ItemError> for AppError {
    fn from(err: ItemError) -> Self {
        let message = err.to_string();
        match err {
            ItemError::Validation(_) => AppError::BadRequest(message),
            ItemError::NotFound(_) => AppError::NotFound(message),
            ItemError::Conflict(_) => AppError::Conflict(message),
            ItemError::StoreUnavailable(_) => AppError::ServiceUnavailable(message),
        }
    }
}

impl IntoResponse for ItemError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Plain-text rendering used by the text endpoints: `error: <reason>\n`
#[derive(Debug)]
pub struct TextError(pub ItemError);

impl From<ItemError> for TextError {
    fn from(err: ItemError) -> Self {
        TextError(err)
    }
}

impl IntoResponse for TextError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status.is_server_error() {
            tracing::error!(kind = self.0.kind(), error = %self.0, "Item request failed");
        }
        (status, format!("error: {}\n", self.0)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_per_kind() {
        assert_eq!(
            ItemError::validation("name required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ItemError::NotFound(1).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ItemError::duplicate_name("a").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ItemError::StoreUnavailable("down".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_validation_message_is_bare_reason() {
        assert_eq!(
            ItemError::validation("value must be non-negative").to_string(),
            "value must be non-negative"
        );
    }

    #[test]
    fn test_non_constraint_db_error_is_store_unavailable() {
        let err: ItemError = DbErr::Custom("connection refused".into()).into();
        assert_eq!(err.kind(), "store_unavailable");
    }

    #[test]
    fn test_app_error_mapping() {
        let app: AppError = ItemError::NotFound(7).into();
        assert!(matches!(app, AppError::NotFound(ref m) if m == "item 7 not found"));

        let app: AppError = ItemError::StoreUnavailable("pool timed out".into()).into();
        assert!(matches!(app, AppError::ServiceUnavailable(_)));
    }
}
