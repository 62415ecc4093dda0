//! Configuration management and validation.
//!
//! Settings are layered: built-in defaults, then the TOML configuration file,
//! then environment variables, then command-line overrides.

use crate::constants::{
    APP_DIR_NAME, CONFIG_FILENAME, DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_CATALOG_FILENAME,
    DEFAULT_MAX_ROWS, ENV_CATALOG_PATH, ENV_LOG_LEVEL, LOG_LEVELS,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Catalog location and connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to the SQLite catalog file
    pub path: PathBuf,

    /// How long a statement waits on a locked catalog (milliseconds)
    pub busy_timeout_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when no -v/-q flag is given
    pub level: String,

    /// Compact single-line output
    pub structured: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            structured: false,
        }
    }
}

/// Report rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Highlight selected rows with colour
    pub color: bool,

    /// Maximum rows printed by the list command (0 = unlimited)
    pub max_rows: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

/// Main configuration for stationtool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
    pub display: DisplayConfig,
}

/// Values given on the command line, applied last
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub catalog_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub no_color: bool,
}

impl Config {
    /// Read a TOML configuration file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::io(
                format!("Failed to read configuration file {}", path.display()),
                e,
            )
        })?;

        toml::from_str(&content).map_err(|source| Error::ConfigParsing {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build the effective configuration
    ///
    /// Uses `config_file` when given, otherwise the default configuration file
    /// if it exists, then applies the environment and `overrides`.
    pub fn load_layered(config_file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => match default_config_path() {
                Some(path) if path.is_file() => {
                    debug!("Loading configuration from {}", path.display());
                    Self::from_file(&path)?
                }
                _ => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Apply `STATIONTOOL_*` variables read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(ENV_CATALOG_PATH).filter(|v| !v.is_empty()) {
            debug!("{} overrides catalog path", ENV_CATALOG_PATH);
            self.catalog.path = PathBuf::from(path);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.is_empty()) {
            self.logging.level = level.to_lowercase();
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(path) = &overrides.catalog_path {
            self.catalog.path = path.clone();
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.to_lowercase();
        }
        if overrides.no_color {
            self.display.color = false;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.catalog.path.as_os_str().is_empty() {
            return Err(Error::configuration("Catalog path must not be empty"));
        }

        if self.catalog.busy_timeout_ms == 0 {
            return Err(Error::configuration(
                "Catalog busy timeout must be greater than 0 ms",
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(Error::configuration(format!(
                "Invalid log level '{}'. Expected one of: {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Use a specific catalog file
    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog.path = path.into();
        self
    }

    /// Set the catalog busy timeout
    pub fn with_busy_timeout_ms(mut self, busy_timeout_ms: u64) -> Self {
        self.catalog.busy_timeout_ms = busy_timeout_ms;
        self
    }

    /// Set the default log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }

    /// Disable coloured output
    pub fn without_color(mut self) -> Self {
        self.display.color = false;
        self
    }
}

/// `<config_dir>/stationtool/config.toml`, when the platform has a config directory
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILENAME))
}

/// `<data_dir>/stationtool/catalog.sqlite`, or the working directory as a fallback
pub fn default_catalog_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(DEFAULT_CATALOG_FILENAME))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_FILENAME))
}
