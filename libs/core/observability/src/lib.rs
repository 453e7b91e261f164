//! Observability utilities for the items service.
//!
//! This crate provides:
//! - Prometheus recorder installation and the `/metrics` handler
//! - Axum middleware recording per-request metrics
//! - [`ItemMetrics`] for item store operations
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::{middleware, routing::get, Router};
//! use observability::{init_metrics, metrics_handler, metrics_middleware};
//!
//! init_metrics()?;
//!
//! let app = Router::new()
//!     .route("/metrics", get(metrics_handler))
//!     .layer(middleware::from_fn(metrics_middleware));
//! ```

pub mod items;
pub mod middleware;

pub use items::ItemMetrics;
pub use middleware::metrics_middleware;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the global Prometheus recorder.
///
/// Call once at startup; later calls return the already-installed handle.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;
        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();
        Ok(handle)
    })
}

/// Get the metrics handle (None until [`init_metrics`] has run)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for the /metrics endpoint
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP requests answered with 4xx or 5xx"
    );

    describe_counter!(
        "items_operations_total",
        "Item store operations by operation and outcome"
    );
    describe_histogram!(
        "items_operation_duration_seconds",
        "Item store operation duration in seconds"
    );
    describe_counter!("items_seeded_total", "Rows processed by seed loads");
}
