//! Command-line argument definitions for stationtool
//!
//! This module defines the complete CLI interface using clap derive API.

use crate::app::models::{EntityKind, Id};
use crate::config::ConfigOverrides;
use crate::constants::{CONNECTABLE_CHANNELS, DATE_FORMAT, DATETIME_FORMAT};
use crate::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the station catalog tool
///
/// Browses and edits a CSS3.0-style seismic station catalog: stations,
/// site-channels, sensors, instruments and their responses.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "stationtool",
    version,
    about = "Browse and edit a seismic station metadata catalog",
    long_about = "Browse and edit a seismic station metadata catalog. Selections made on one \
                  entity type (station, sitechan, sensor, instrument) are propagated to the \
                  other three through the catalog relationships, optionally restricted to \
                  the rows valid on a chosen date."
)]
pub struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by every subcommand
#[derive(Debug, Clone, clap::Args)]
pub struct GlobalArgs {
    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, looks for
    /// <config dir>/stationtool/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        global = true,
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Catalog file, overriding configuration and environment
    #[arg(
        long = "catalog",
        value_name = "FILE",
        global = true,
        help = "Path to the SQLite catalog"
    )]
    pub catalog: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for results
    #[arg(
        long = "format",
        value_enum,
        default_value = "human",
        global = true,
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,

    /// Disable coloured highlighting
    #[arg(long = "no-color", global = true, help = "Disable coloured output")]
    pub no_color: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Create the catalog tables
    Init,
    /// Replay selection actions and print the selected ids
    Select(SelectArgs),
    /// List catalog rows of one entity type
    List(ListArgs),
    /// Print the response of an instrument
    Response(ResponseArgs),
    /// Add a new station
    AddStation(AddStationArgs),
    /// Add a new instrument with its response
    AddInstrument(AddInstrumentArgs),
    /// Install an instrument on a station as N/E/Z channels
    ConnectInstrument(ConnectInstrumentArgs),
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Select(_) => "select",
            Self::List(_) => "list",
            Self::Response(_) => "response",
            Self::AddStation(_) => "add-station",
            Self::AddInstrument(_) => "add-instrument",
            Self::ConnectInstrument(_) => "connect-instrument",
        }
    }
}

/// Arguments for the select command
#[derive(Debug, Clone, Parser)]
pub struct SelectArgs {
    /// Selection actions, applied in order
    #[arg(
        short = 'a',
        long = "action",
        value_name = "ACTION",
        help = "Selection action (repeatable)",
        long_help = "Selection action, applied in the order given. One of:\n  \
                     date:YYYY-MM-DD        set the date filter\n  \
                     clear-date             remove the date filter\n  \
                     field:<kind>           make <kind> the active type\n  \
                     add:<kind>:<id>        add a row to the active selection\n  \
                     select:<kind>:<id>     jump to a single row\n  \
                     clear                  drop the active selection\n\
                     <kind> is station, sitechan, sensor or instrument."
    )]
    pub actions: Vec<SelectionAction>,
}

/// Arguments for the list command
#[derive(Debug, Clone, Parser)]
pub struct ListArgs {
    /// Entity type to list
    #[arg(value_name = "KIND", help = "station, sitechan, sensor or instrument")]
    pub kind: EntityKind,

    /// Selection actions used to mark rows
    #[arg(
        short = 'a',
        long = "action",
        value_name = "ACTION",
        help = "Selection action (repeatable); see `select --help`"
    )]
    pub actions: Vec<SelectionAction>,

    /// Only print rows contained in the selection
    #[arg(long = "selected-only", help = "Only print selected rows")]
    pub selected_only: bool,
}

/// Arguments for the response command
#[derive(Debug, Clone, Parser)]
pub struct ResponseArgs {
    /// Instrument id
    #[arg(value_name = "INSTRUMENT_ID")]
    pub instrument_id: Id,
}

/// Arguments for the add-station command
#[derive(Debug, Clone, Parser)]
pub struct AddStationArgs {
    #[arg(long, help = "Network code")]
    pub network: String,

    #[arg(long = "code", help = "Station code, at most six characters")]
    pub station_code: String,

    #[arg(long = "name", help = "Full station name")]
    pub station_name: String,

    #[arg(long = "on-date", value_name = "YYYY-MM-DD", help = "Date the station opened")]
    pub on_date: NaiveDate,

    #[arg(long, allow_hyphen_values = true, help = "Latitude in degrees")]
    pub latitude: f64,

    #[arg(long, allow_hyphen_values = true, help = "Longitude in degrees")]
    pub longitude: f64,

    #[arg(
        long,
        allow_hyphen_values = true,
        default_value_t = 0.0,
        help = "Elevation in kilometres"
    )]
    pub elevation: f64,

    #[arg(
        long = "type",
        default_value = "bb",
        help = "Station type: ss (substation), bb (broadband) or ar (array)"
    )]
    pub station_type: String,

    #[arg(long = "reference", help = "Reference station code for array members")]
    pub reference_station: Option<String>,

    #[arg(
        long = "north-offset",
        allow_hyphen_values = true,
        default_value_t = 0.0,
        help = "North offset to the reference station in kilometres"
    )]
    pub north_offset: f64,

    #[arg(
        long = "east-offset",
        allow_hyphen_values = true,
        default_value_t = 0.0,
        help = "East offset to the reference station in kilometres"
    )]
    pub east_offset: f64,

    #[arg(long = "dry-run", help = "Validate and print without committing")]
    pub dry_run: bool,
}

/// Arguments for the add-instrument command
#[derive(Debug, Clone, Parser)]
pub struct AddInstrumentArgs {
    #[arg(long = "name", help = "Instrument name")]
    pub instrument_name: String,

    #[arg(long = "type", help = "Instrument type, at most six characters")]
    pub instrument_type: String,

    #[arg(long, help = "Band code (one character)")]
    pub band: String,

    #[arg(long, default_value = "d", help = "d (digital) or a (analog)")]
    pub digital: String,

    #[arg(long, default_value_t = 200.0, help = "Default sample rate")]
    pub samprate: f64,

    #[arg(long, help = "Nominal calibration (nm/count)")]
    pub ncalib: f64,

    #[arg(long, default_value_t = 0.5, help = "Nominal calibration period (s)")]
    pub ncalper: f64,

    /// JSON response document to store with the instrument
    #[arg(
        long = "response",
        value_name = "FILE",
        help = "JSON response document to add with the instrument"
    )]
    pub response_file: Option<PathBuf>,

    /// Response file name; defaults to the file name inside the response document
    #[arg(long, value_name = "NAME", help = "Response file name the instrument refers to")]
    pub dfile: Option<String>,

    /// Response type; defaults to the format of the response document
    #[arg(long, value_name = "TYPE", help = "Response type (paz or fap)")]
    pub rsptype: Option<String>,

    #[arg(long = "dry-run", help = "Validate and print without committing")]
    pub dry_run: bool,
}

/// Arguments for the connect-instrument command
#[derive(Debug, Clone, Parser)]
pub struct ConnectInstrumentArgs {
    #[arg(long = "station", value_name = "ID", help = "Station id")]
    pub station_id: Id,

    #[arg(long = "instrument", value_name = "ID", help = "Instrument id")]
    pub instrument_id: Id,

    #[arg(
        long = "channels",
        value_name = "LIST",
        default_value = "N,E,Z",
        help = "Comma-separated components to create"
    )]
    pub channels: ChannelList,

    #[arg(
        long = "on",
        value_name = "DATETIME",
        help = "Installation time, 'YYYY-MM-DD HH:MM:SS' or 'YYYY-MM-DD' (UTC)"
    )]
    pub on_time: OnTime,

    #[arg(
        long = "depth",
        allow_hyphen_values = true,
        default_value_t = 0.0,
        help = "Emplacement depth in metres"
    )]
    pub emplacement_depth: f64,

    #[arg(long, default_value = "", help = "Description of the installation")]
    pub description: String,

    #[arg(long, allow_hyphen_values = true, default_value_t = 0.0, help = "Time correction")]
    pub tshift: f64,

    #[arg(long, default_value = "n", help = "Discrete snapshot: y or n")]
    pub instant: String,

    #[arg(long, help = "Calibration ratio (defaults to the instrument ncalib)")]
    pub calratio: Option<f64>,

    #[arg(long, help = "Calibration period (defaults to the instrument ncalper)")]
    pub calper: Option<f64>,

    #[arg(long = "dry-run", help = "Validate and print without committing")]
    pub dry_run: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

// =============================================================================
// Value Parsers
// =============================================================================

/// One step of a scripted selection session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionAction {
    Date(NaiveDate),
    ClearDate,
    Field(EntityKind),
    Add(EntityKind, Id),
    Select(EntityKind, Id),
    Clear,
}

impl FromStr for SelectionAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').map(str::trim).collect();

        match parts.as_slice() {
            ["clear"] => Ok(Self::Clear),
            ["clear-date"] => Ok(Self::ClearDate),
            ["date", date] => NaiveDate::parse_from_str(date, DATE_FORMAT)
                .map(Self::Date)
                .map_err(|e| Error::datetime_parsing(format!("Invalid date '{}'", date), e)),
            ["field", kind] => Ok(Self::Field(kind.parse()?)),
            ["add", kind, id] => Ok(Self::Add(kind.parse()?, parse_id(id)?)),
            ["select", kind, id] => Ok(Self::Select(kind.parse()?, parse_id(id)?)),
            _ => Err(Error::data_validation(format!(
                "Unknown selection action '{}'. Expected date:YYYY-MM-DD, clear-date, \
                 field:<kind>, add:<kind>:<id>, select:<kind>:<id> or clear",
                s
            ))),
        }
    }
}

fn parse_id(value: &str) -> Result<Id> {
    value
        .parse()
        .map_err(|_| Error::data_validation(format!("Invalid id '{}'", value)))
}

/// Wrapper for parsing comma-separated channel lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelList {
    pub channels: Vec<String>,
}

impl FromStr for ChannelList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let channels: Vec<String> = s
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        if channels.is_empty() {
            return Err(Error::data_validation(
                "Channel list cannot be empty".to_string(),
            ));
        }

        for channel in &channels {
            if !CONNECTABLE_CHANNELS.contains(&channel.as_str()) {
                return Err(Error::data_validation(format!(
                    "Unknown channel '{}'. Available channels: {}",
                    channel,
                    CONNECTABLE_CHANNELS.join(", ")
                )));
            }
        }

        Ok(ChannelList { channels })
    }
}

/// Installation time given as a date-time or a bare date (midnight)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnTime(pub NaiveDateTime);

impl FromStr for OnTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT) {
            return Ok(Self(datetime));
        }
        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
            return Ok(Self(datetime));
        }
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(|date| Self(date.and_time(NaiveTime::MIN)))
            .map_err(|e| Error::datetime_parsing(format!("Invalid installation time '{}'", s), e))
    }
}

// =============================================================================
// Validation and Derived Settings
// =============================================================================

impl GlobalArgs {
    /// Log level requested by -v/-q, if any
    pub fn log_level_override(&self) -> Option<&'static str> {
        if self.quiet {
            Some("error")
        } else {
            match self.verbose {
                0 => None,
                1 => Some("info"),
                2 => Some("debug"),
                _ => Some("trace"),
            }
        }
    }

    /// Determine the log level, falling back to `default` without -v/-q
    pub fn get_log_level<'a>(&self, default: &'a str) -> &'a str {
        self.log_level_override().unwrap_or(default)
    }

    pub fn config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            catalog_path: self.catalog.clone(),
            log_level: self.log_level_override().map(str::to_string),
            no_color: self.no_color,
        }
    }

    /// Validate the global arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(config_file) = &self.config_file {
            if !config_file.is_file() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }
        Ok(())
    }
}

impl AddInstrumentArgs {
    /// Validate the add-instrument arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if self.response_file.is_none() && self.dfile.is_none() {
            return Err(Error::configuration(
                "Either --response or --dfile must be given".to_string(),
            ));
        }
        if let Some(path) = &self.response_file {
            if !path.is_file() {
                return Err(Error::configuration(format!(
                    "Response file does not exist: {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}
