use axum::http::{HeaderValue, Method, header::InvalidHeaderValue};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Creates a CORS layer restricted to `allowed_origins`.
///
/// Allows GET, POST, PUT, PATCH, DELETE and OPTIONS with `Content-Type` and
/// `Accept` headers, cached for one hour.
///
/// # Errors
/// Returns an error if any origin is not a valid header value.
pub fn create_cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, InvalidHeaderValue> {
    let origins = allowed_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600)))
}

/// Creates a permissive CORS layer for development.
///
/// Allows any origin. Do not use in production.
pub fn create_permissive_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}
