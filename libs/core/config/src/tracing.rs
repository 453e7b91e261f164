use crate::Environment;
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install color-eyre with a project-standard configuration.
///
/// Call this early in the main() before any fallible operations to ensure
/// colored error output. Safe to call multiple times.
///
/// Configuration:
/// - Shows file:line where errors occur
/// - Hides environment variables (less noise)
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Initialize tracing with environment-aware configuration and error span capture.
///
/// - **Production** (`APP_ENV=production`): JSON lines, module targets hidden,
///   `info` by default with SeaORM statement logging held at `warn`.
/// - **Development** (default): pretty output, `info` by default or `debug`
///   when the application debug flag is on.
///
/// `RUST_LOG` always overrides the default filter. Both layouts include
/// `tracing_error::ErrorLayer` so `eyre` reports carry span traces.
///
/// Safe to call more than once; later calls are no-ops (common in tests).
///
/// # Example with instrumentation
///
/// ```ignore
/// use tracing::instrument;
/// use eyre::{Result, WrapErr};
///
/// #[instrument(skip(db), fields(item_id = id))]
/// async fn load(db: &DatabaseConnection, id: i64) -> Result<Option<Model>> {
///     Entity::find_by_id(id).one(db).await.wrap_err("Failed to load item")
/// }
/// ```
pub fn init_tracing(environment: &Environment, debug: bool) {
    let is_production = environment.is_production();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if is_production {
            EnvFilter::new("info,tower_http=info,sea_orm=warn,sqlx=warn")
        } else if debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info,tower_http=debug")
        }
    });

    let result = if is_production {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false) // Hide module paths in production
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(debug)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(_) => {
            let debug_enabled = debug;
            info!(
                debug_enabled,
                "Tracing initialized with ErrorLayer. Environment: {:?}", environment
            );
        }
        Err(_) => {
            debug!("Tracing already initialized, skipping re-initialization");
        }
    }
}
