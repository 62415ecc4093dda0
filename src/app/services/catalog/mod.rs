//! SQLite-backed station catalog
//!
//! The catalog holds the five CSS3.0-style tables (station, sitechan, sensor,
//! instrument, response). [`CatalogStore`] keeps only the file path and the
//! connection settings: every read, lookup or commit opens its own connection
//! and drops it before returning.

use crate::config::CatalogConfig;
use crate::constants::DEFAULT_BUSY_TIMEOUT_MS;
use crate::{Error, Result};
use rusqlite::{Connection, OpenFlags, Transaction};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub mod lookup;
pub mod reader;
pub mod schema;
pub mod writer;

#[cfg(test)]
pub mod tests;

pub use reader::CatalogCounts;

/// Handle to a catalog file
#[derive(Debug, Clone)]
pub struct CatalogStore {
    /// Path to the SQLite file
    path: PathBuf,

    /// How long a statement waits on a locked database
    busy_timeout: Duration,
}

impl CatalogStore {
    /// Create a handle without touching the file system
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }

    /// Create a handle from the `[catalog]` configuration section
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(&config.path).with_busy_timeout(Duration::from_millis(config.busy_timeout_ms))
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Create the catalog file and its tables
    ///
    /// Safe to run against an existing catalog; tables that already exist are
    /// left alone.
    pub fn init(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::io(
                    format!("Failed to create catalog directory {}", parent.display()),
                    e,
                )
            })?;
        }

        let conn = Connection::open(&self.path)
            .map_err(|e| Error::storage_unavailable(&self.path, "cannot create catalog", e))?;
        conn.execute_batch(schema::SCHEMA_SQL)
            .map_err(|e| Error::storage_query("Failed to create catalog tables", e))?;

        info!(
            "Initialised catalog at {} (schema v{})",
            self.path.display(),
            schema::SCHEMA_VERSION
        );
        Ok(())
    }

    /// Open a connection to an existing catalog
    ///
    /// The file is never created here, so a missing catalog is reported as
    /// [`Error::StorageUnavailable`].
    pub(crate) fn connect(&self) -> Result<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags)
            .map_err(|e| Error::storage_unavailable(&self.path, "cannot open catalog", e))?;

        conn.busy_timeout(self.busy_timeout)
            .map_err(|e| Error::storage_unavailable(&self.path, "cannot set busy timeout", e))?;
        conn.pragma_update(None, "foreign_keys", true)
            .map_err(|e| Error::storage_unavailable(&self.path, "cannot enable foreign keys", e))?;

        debug!("Opened catalog connection to {}", self.path.display());
        Ok(conn)
    }

    /// Run `f` inside one transaction
    ///
    /// The transaction commits only when `f` succeeds; any error rolls every
    /// statement back.
    pub fn transaction<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.connect()?;
        let tx = conn
            .transaction()
            .map_err(|e| Error::storage_query("Failed to begin transaction", e))?;

        let value = f(&tx)?;

        tx.commit()
            .map_err(|e| Error::storage_query("Failed to commit transaction", e))?;
        Ok(value)
    }
}
