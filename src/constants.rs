//! Application constants for stationtool
//!
//! This module contains the catalog constants, default values and the
//! field limits used when validating rows before they are committed.

// =============================================================================
// Temporal Constants
// =============================================================================

/// Sensor endtime value meaning "no defined end" in the CSS3.0 sensor table
pub const SENSOR_OPEN_END: f64 = 9_999_999_999.999;

/// Any sensor endtime at or above this value is read as the open-end sentinel
///
/// Float columns round-trip through SQLite REAL and legacy text files, so the
/// sentinel is matched against a threshold instead of by exact equality.
pub const SENSOR_OPEN_END_THRESHOLD: f64 = 9_999_999_999.0;

/// Calendar date format used on the command line and in reports
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date-time format used for sensor on-times on the command line
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Catalog Constants
// =============================================================================

/// Default catalog file name inside the data directory
pub const DEFAULT_CATALOG_FILENAME: &str = "catalog.sqlite";

/// Application directory name under the platform config/data directories
pub const APP_DIR_NAME: &str = "stationtool";

/// Configuration file name inside the config directory
pub const CONFIG_FILENAME: &str = "config.toml";

/// Default SQLite busy timeout in milliseconds
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Maximum number of ids bound into a single IN-list
pub const MAX_IN_LIST_PARAMS: usize = 500;

/// Environment variable overriding the catalog path
pub const ENV_CATALOG_PATH: &str = "STATIONTOOL_CATALOG";

/// Environment variable overriding the log level
pub const ENV_LOG_LEVEL: &str = "STATIONTOOL_LOG";

/// Log levels accepted in configuration
pub const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Default rows shown by the list command
pub const DEFAULT_MAX_ROWS: usize = 500;

// =============================================================================
// Field Limits
// =============================================================================

/// Length and range limits enforced on drafts before they are staged
pub mod limits {
    pub const STATION_CODE_MAX_LEN: usize = 6;
    pub const STATION_NAME_MAX_LEN: usize = 50;
    pub const NETWORK_MAX_LEN: usize = 8;
    pub const CHANNEL_CODE_MAX_LEN: usize = 8;
    pub const DESCRIPTION_MAX_LEN: usize = 50;
    pub const INSTRUMENT_NAME_MAX_LEN: usize = 50;
    pub const INSTRUMENT_TYPE_MAX_LEN: usize = 6;

    pub const BAND_LEN: usize = 1;

    pub const LATITUDE_DEG: (f64, f64) = (-90.0, 90.0);
    pub const LONGITUDE_DEG: (f64, f64) = (-180.0, 180.0);
    /// Station elevation in kilometres
    pub const ELEVATION_KM: (f64, f64) = (-20.0, 10.0);
    /// Array member offset from its reference station in kilometres
    pub const OFFSET_KM: (f64, f64) = (-50.0, 50.0);
    /// Emplacement depth in metres relative to station elevation
    pub const EMPLACEMENT_DEPTH_M: (f64, f64) = (-100.0, 100.0);
    pub const TSHIFT: (f64, f64) = (-1000.0, 1000.0);
    pub const CALRATIO: (f64, f64) = (0.0, 1000.0);
    pub const CALPER: (f64, f64) = (0.0, 5000.0);
    pub const SAMPRATE: (f64, f64) = (10.0, 2000.0);
    pub const NCALIB: (f64, f64) = (0.0, 10000.0);
    pub const NCALPER: (f64, f64) = (0.0, 100.0);
}

// =============================================================================
// Coded Values
// =============================================================================

/// Station type codes: substation, broadband, array
pub const STATION_TYPES: &[&str] = &["ss", "bb", "ar"];

/// Instrument digital flags: digital, analog
pub const DIGITAL_FLAGS: &[&str] = &["d", "a"];

/// Sensor instant flags
pub const INSTANT_FLAGS: &[&str] = &["y", "n"];

/// Response formats an instrument can refer to
pub const RESPONSE_FORMATS: &[&str] = &["paz", "fap"];

/// Channel type assigned to sitechans created by connecting an instrument
pub const CONNECTED_CHANNEL_TYPE: &str = "n";

/// Response directory recorded for new instruments
pub const DEFAULT_RESPONSE_DIR: &str = "../response";

/// Orientation (horizontal angle, vertical angle) of the standard components
pub fn channel_orientation(channel_code: &str) -> Option<(f64, f64)> {
    match channel_code {
        "Z" => Some((-1.0, 0.0)),
        "E" => Some((90.0, 90.0)),
        "N" => Some((0.0, 90.0)),
        _ => None,
    }
}

/// Channel codes that can be created when connecting an instrument
pub const CONNECTABLE_CHANNELS: &[&str] = &["N", "E", "Z"];
