//! Station Tool Library
//!
//! A Rust library for browsing and editing a seismic station metadata catalog
//! (stations, site-channels, sensors, instruments and their responses).
//!
//! This library provides tools for:
//! - Keeping a time-scoped selection consistent across the four linked entity types
//! - Resolving related ids along the Station → Sitechan → Sensor → Instrument chain
//! - Reading and writing the catalog through a SQLite store
//! - Staging validated rows and committing them in one transaction

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod catalog;
        pub mod resolver;
        pub mod selection;
        pub mod staging;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{EntityKind, Id};
pub use app::services::catalog::CatalogStore;
pub use app::services::resolver::RelationshipResolver;
pub use app::services::selection::{IdSet, SelectionManager};
pub use config::Config;

use std::path::PathBuf;

/// Result type alias for stationtool
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for catalog, selection and configuration operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The catalog store could not be reached
    #[error("Storage unavailable at '{}': {message}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        message: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A catalog statement failed
    #[error("Storage query failed: {message}")]
    StorageQuery {
        message: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Configuration file could not be parsed
    #[error("Configuration file '{}' is invalid", .path.display())]
    ConfigParsing {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Data validation error
    #[error("Data validation error: {message}")]
    DataValidation { message: String },

    /// Entity not found in the catalog
    #[error("{kind} not found: id = {id}")]
    EntityNotFound { kind: EntityKind, id: Id },

    /// Lookup between an entity type and itself
    #[error("Unsupported lookup from {kind} to {kind}")]
    UnsupportedLookup { kind: EntityKind },

    /// Date/time parsing error
    #[error("Date/time parsing error: {message}")]
    DateTimeParsing {
        message: String,
        #[source]
        source: chrono::ParseError,
    },

    /// JSON (de)serialization error
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a storage unavailable error for a catalog path
    pub fn storage_unavailable(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: rusqlite::Error,
    ) -> Self {
        Self::StorageUnavailable {
            path: path.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a storage query error with context
    pub fn storage_query(message: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::StorageQuery {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create an entity not found error
    pub fn entity_not_found(kind: EntityKind, id: Id) -> Self {
        Self::EntityNotFound { kind, id }
    }

    /// Create an unsupported lookup error
    pub fn unsupported_lookup(kind: EntityKind) -> Self {
        Self::UnsupportedLookup { kind }
    }

    /// Create a date/time parsing error
    pub fn datetime_parsing(message: impl Into<String>, source: chrono::ParseError) -> Self {
        Self::DateTimeParsing {
            message: message.into(),
            source,
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Whether the error came from the storage collaborator
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Self::StorageUnavailable { .. } | Self::StorageQuery { .. }
        )
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        Self::StorageQuery {
            message: "Catalog statement failed".to_string(),
            source: error,
        }
    }
}

impl From<chrono::ParseError> for Error {
    fn from(error: chrono::ParseError) -> Self {
        Self::DateTimeParsing {
            message: "Date/time parsing failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: "JSON conversion failed".to_string(),
            source: error,
        }
    }
}
