use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::errors::AppError;

/// Extracts an `i64` identifier from the `{id}` path segment.
///
/// Non-numeric ids are rejected with a 400 `INVALID_ID` JSON body instead of
/// axum's plain-text path rejection.
///
/// # Example
///
/// ```ignore
/// async fn get_item(IdPath(id): IdPath) -> impl IntoResponse {
///     // id is an i64
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPath(pub i64);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::InvalidId(e.body_text()))?;

        raw.trim()
            .parse::<i64>()
            .map(IdPath)
            .map_err(|_| AppError::InvalidId(format!("id must be an integer, got '{}'", raw)))
    }
}
