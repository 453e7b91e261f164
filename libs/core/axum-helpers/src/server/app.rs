use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::{method_not_allowed, not_found};
use crate::http::security::security_headers;
use axum::{Router, middleware};
use core_config::server::ServerConfig;
use std::future::Future;
use std::io;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

/// Build the application router around already-stated routes.
///
/// Sets up:
/// - OpenAPI documentation (Swagger UI at `/swagger-ui`, Scalar at `/scalar`)
/// - `apis` nested under `/api`, `root` (health, readiness, metrics) at the top level
/// - JSON 404 and 405 fallbacks
/// - Tracing, security headers, the given CORS layer and response compression,
///   applied to every route
///
/// # Example
/// ```ignore
/// let api_routes = Router::new().nest("/items", domain_items::handlers::router(service));
/// let root = health_router(app_info!());
/// let router = create_router::<ApiDoc>(api_routes, root, create_permissive_cors_layer());
/// ```
pub fn create_router<T>(apis: Router, root: Router, cors: CorsLayer) -> Router
where
    T: OpenApi + 'static,
{
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .nest("/api", apis)
        .merge(root)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(cors)
        .layer(CompressionLayer::new())
}

/// Serve `router` with coordinated shutdown and bounded cleanup.
///
/// On SIGINT/SIGTERM the server stops accepting connections and drains
/// in-flight requests; `cleanup` (closing pools and the like) then runs for at
/// most `server_config.shutdown_timeout()`.
///
/// # Example
/// ```ignore
/// let cleanup = async move {
///     if let Err(e) = db.close().await {
///         tracing::warn!(error = %e, "Failed to close database pool");
///     }
/// };
///
/// create_production_app(router, &config.server, cleanup).await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (coordinator, mut shutdown_rx) = ShutdownCoordinator::new();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!(address = %listener.local_addr()?, "Server starting");

    let signal_handle = coordinator.clone();
    tokio::spawn(async move {
        signal_handle.wait_for_signal().await;
    });

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        });

    let timeout = server_config.shutdown_timeout();
    info!(timeout_secs = timeout.as_secs(), "Running shutdown cleanup");
    match tokio::time::timeout(timeout, cleanup).await {
        Ok(()) => info!("Cleanup completed successfully"),
        Err(_) => warn!(
            timeout_secs = timeout.as_secs(),
            "Cleanup exceeded timeout, forcing shutdown"
        ),
    }

    serve_result
}
