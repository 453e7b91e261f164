use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_flag, server::ServerConfig};
use database::postgres::PostgresConfig;
use std::env;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// `APP_DEBUG`: verbose logs and SQL statement logging
    pub debug: bool,
    /// `ITEMS_RUN_MIGRATIONS`: apply pending migrations before serving
    pub run_migrations: bool,
    /// `CORS_ALLOWED_ORIGIN`, comma-separated; empty means permissive
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let debug = env_flag("APP_DEBUG", false);
        let database = PostgresConfig::from_env()?.with_statement_logging(debug);
        let server = ServerConfig::from_env()?;

        let cors_origins = parse_origins(env::var("CORS_ALLOWED_ORIGIN").ok().as_deref());
        if cors_origins.is_empty() && environment.is_production() {
            return Err(ConfigError::MissingEnvVar("CORS_ALLOWED_ORIGIN".to_string()));
        }

        Ok(Self {
            app: app_info!(),
            database,
            server,
            environment,
            debug,
            run_migrations: env_flag("ITEMS_RUN_MIGRATIONS", true),
            cors_origins,
        })
    }
}

fn parse_origins(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
