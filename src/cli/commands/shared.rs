//! Shared components for CLI commands
//!
//! This module contains the logging setup, configuration loading and report
//! output used by every subcommand.

use crate::app::services::catalog::CatalogStore;
use crate::cli::args::{GlobalArgs, OutputFormat};
use crate::config::{Config, default_config_path};
use crate::{Error, Result};
use serde::Serialize;
use tracing::{debug, info};

/// Set up structured logging
///
/// `RUST_LOG` wins when set; otherwise the level comes from -v/-q or the
/// configuration.
pub fn setup_logging(global: &GlobalArgs, config: &Config) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = global.get_log_level(&config.logging.level);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("stationtool={}", log_level)));

    if global.quiet || config.logging.structured {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Load configuration using layered approach (file -> env -> args)
pub fn load_configuration(global: &GlobalArgs) -> Result<Config> {
    let config_file = global.config_file.as_deref();
    let config = Config::load_layered(config_file, &global.config_overrides())?;

    if config.display.color {
        colored::control::unset_override();
    } else {
        colored::control::set_override(false);
    }

    Ok(config)
}

/// Log where the configuration came from, once logging is up
pub fn log_configuration(global: &GlobalArgs, config: &Config) {
    match (&global.config_file, default_config_path()) {
        (Some(path), _) => info!("Using config file: {}", path.display()),
        (None, Some(path)) if path.is_file() => info!("Using config file: {}", path.display()),
        _ => info!("No config file found, using defaults and environment variables"),
    }
    debug!("Effective configuration: {:?}", config);
}

/// Catalog handle for commands that need an existing catalog
pub fn open_catalog(config: &Config) -> Result<CatalogStore> {
    let store = CatalogStore::from_config(&config.catalog);
    if !store.exists() {
        return Err(Error::configuration(format!(
            "Catalog does not exist: {} (run `stationtool init` first)",
            store.path().display()
        )));
    }
    Ok(store)
}

/// Serialize a JSON report
pub fn to_json<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| Error::serialization(format!("Failed to serialize {}", what), e))
}

/// Print either the human report or the JSON report
pub fn emit(
    format: OutputFormat,
    human: impl FnOnce() -> Result<String>,
    json: impl FnOnce() -> Result<String>,
) -> Result<()> {
    let output = match format {
        OutputFormat::Human => human()?,
        OutputFormat::Json => json()?,
    };
    println!("{}", output);
    Ok(())
}
