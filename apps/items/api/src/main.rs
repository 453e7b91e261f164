use axum::middleware;
use axum_helpers::{create_cors_layer, create_permissive_cors_layer, create_production_app, health_router};
use core_config::load_dotenv;
use core_config::tracing::{init_tracing, install_color_eyre};
use migration::Migrator;
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();
    load_dotenv();

    let config = Config::from_env()?;
    init_tracing(&config.environment, config.debug);

    observability::init_metrics()
        .map_err(|e| eyre::eyre!("Failed to install metrics recorder: {}", e))?;

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    if config.run_migrations {
        database::postgres::run_migrations::<Migrator>(&db, config.app.name)
            .await
            .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;
    } else {
        info!("Skipping startup migrations; call /init to create the table");
    }

    let cors = if config.cors_origins.is_empty() {
        warn!("CORS_ALLOWED_ORIGIN not set, allowing any origin");
        create_permissive_cors_layer()
    } else {
        create_cors_layer(&config.cors_origins)?
    };

    let state = AppState { config, db };

    let api_routes = api::routes(&state);
    let root_routes = health_router(state.config.app).merge(api::ops_router(state.clone()));
    let app = axum_helpers::create_router::<openapi::ApiDoc>(api_routes, root_routes, cors)
        .layer(middleware::from_fn(observability::metrics_middleware));

    info!(
        app = state.config.app.name,
        version = state.config.app.version,
        "Starting items API"
    );

    let server = state.config.server.clone();
    create_production_app(app, &server, async move {
        info!("Shutting down: closing database connections");
        match state.db.close().await {
            Ok(_) => info!("PostgreSQL connection closed successfully"),
            Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Items API shutdown complete");
    Ok(())
}
