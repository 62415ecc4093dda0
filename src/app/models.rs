//! Data models for the station catalog
//!
//! This module contains the entity tags and row structures for the CSS3.0-style
//! station catalog: stations, site-channels, sensors, instruments and the
//! instrument responses. Rows link in a strict chain,
//! Station 1-* Sitechan 1-* Sensor *-1 Instrument.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod validity;

pub use validity::{DateInterval, EpochInterval, SensorEnd, Validity};

/// Opaque catalog row identifier
pub type Id = i64;

// =============================================================================
// Entity Kinds
// =============================================================================

/// The four selectable entity types, in chain order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Station,
    Sitechan,
    Sensor,
    Instrument,
}

impl EntityKind {
    /// All kinds in chain order Station → Sitechan → Sensor → Instrument
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Station,
        EntityKind::Sitechan,
        EntityKind::Sensor,
        EntityKind::Instrument,
    ];

    /// Position along the relationship chain
    pub fn chain_position(self) -> usize {
        match self {
            Self::Station => 0,
            Self::Sitechan => 1,
            Self::Sensor => 2,
            Self::Instrument => 3,
        }
    }

    /// The kinds visited when walking from `self` to `target`, target included
    ///
    /// There are no shortcut edges: Station → Sensor goes through Sitechan,
    /// Instrument → Station goes through Sensor and Sitechan. The path is
    /// empty when `target == self`.
    pub fn path_to(self, target: EntityKind) -> Vec<EntityKind> {
        let from = self.chain_position();
        let to = target.chain_position();
        if from < to {
            Self::ALL[from + 1..=to].to_vec()
        } else {
            Self::ALL[to..from].iter().rev().copied().collect()
        }
    }

    /// The three kinds other than `self`, in chain order
    pub fn others(self) -> impl Iterator<Item = EntityKind> {
        Self::ALL.into_iter().filter(move |kind| *kind != self)
    }

    /// Catalog table name
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Station => "station",
            Self::Sitechan => "sitechan",
            Self::Sensor => "sensor",
            Self::Instrument => "instrument",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::Station => "Station",
            Self::Sitechan => "Sitechan",
            Self::Sensor => "Sensor",
            Self::Instrument => "Instrument",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "station" | "stations" => Ok(Self::Station),
            "sitechan" | "sitechans" | "channel" => Ok(Self::Sitechan),
            "sensor" | "sensors" => Ok(Self::Sensor),
            "instrument" | "instruments" => Ok(Self::Instrument),
            other => Err(Error::data_validation(format!(
                "Unknown entity type '{}'. Expected one of: station, sitechan, sensor, instrument",
                other
            ))),
        }
    }
}

// =============================================================================
// Catalog Rows
// =============================================================================

/// Seismic station row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: Id,

    /// Network code; (network, station_code) is unique
    pub network: String,

    /// Station code, at most six characters
    pub station_code: String,

    pub station_name: String,

    /// First day of operation
    pub on_date: NaiveDate,

    /// Last day of operation (absent while the station is open)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub off_date: Option<NaiveDate>,

    /// Latitude in decimal degrees
    pub latitude: f64,

    /// Longitude in decimal degrees
    pub longitude: f64,

    /// Elevation in kilometres
    pub elevation: f64,

    /// Station type code: ss, bb or ar
    pub station_type: String,

    /// Reference station code for array members
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_station: Option<String>,

    /// Offset to the reference station in kilometres
    pub north_offset: f64,
    pub east_offset: f64,

    pub load_date: NaiveDate,
}

impl Station {
    pub fn validity(&self) -> DateInterval {
        DateInterval {
            on_date: self.on_date,
            off_date: self.off_date,
        }
    }

    /// Get station location as (latitude, longitude) tuple
    pub fn location(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// Site-channel row: one sensing channel at a station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sitechan {
    pub id: Id,
    pub station_id: Id,
    pub channel_code: String,
    pub on_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub off_date: Option<NaiveDate>,
    pub channel_type: String,

    /// Depth in metres relative to the station elevation
    pub emplacement_depth: f64,

    /// Horizontal angle in degrees from north; -1 for vertical components
    pub horizontal_angle: f64,

    /// Vertical angle in degrees from vertical
    pub vertical_angle: f64,
    pub description: String,
    pub load_date: NaiveDate,
}

impl Sitechan {
    pub fn validity(&self) -> DateInterval {
        DateInterval {
            on_date: self.on_date,
            off_date: self.off_date,
        }
    }
}

/// Sensor row: a time-bounded deployment of an instrument on a site-channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub id: Id,
    pub sitechan_id: Id,
    pub instrument_id: Id,

    /// Deployment start, epoch seconds
    pub time: f64,

    /// Deployment end, epoch seconds or the open-end sentinel
    pub endtime: f64,
    pub calratio: f64,
    pub calper: f64,
    pub tshift: f64,

    /// Discrete snapshot flag, "y" or "n"
    pub instant: String,
    pub load_date: NaiveDate,
}

impl Sensor {
    pub fn validity(&self) -> EpochInterval {
        EpochInterval::from_raw(self.time, self.endtime)
    }
}

/// Instrument row: calibration profile shared by sensor deployments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: Id,
    pub instrument_name: String,
    pub instrument_type: String,
    pub band: String,

    /// "d" for digital, "a" for analog
    pub digital: String,
    pub samprate: f64,

    /// Nominal calibration (nm/count)
    pub ncalib: f64,

    /// Nominal calibration period (s)
    pub ncalper: f64,
    pub resp_dir: String,

    /// Response file name
    pub dfile: String,

    /// Response type, "paz" or "fap"
    pub rsptype: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_id: Option<Id>,
    pub load_date: NaiveDate,
}

// =============================================================================
// Responses
// =============================================================================

/// One frequency-amplitude-phase sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FapPoint {
    pub frequency: f64,
    pub amplitude: f64,
    pub phase: f64,
}

/// Transfer function description of an instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum ResponseKind {
    /// Pole-zero form; poles and zeros are (real, imaginary) pairs
    Paz {
        scale_factor: f64,
        poles: Vec<(f64, f64)>,
        zeros: Vec<(f64, f64)>,
    },
    /// Frequency-amplitude-phase table
    Fap { points: Vec<FapPoint> },
}

impl ResponseKind {
    /// Short format name stored in the instrument's `rsptype`
    pub fn format_name(&self) -> &'static str {
        match self {
            Self::Paz { .. } => "paz",
            Self::Fap { .. } => "fap",
        }
    }
}

/// Instrument response record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Catalog id; 0 until the response is committed
    #[serde(default)]
    pub id: Id,

    /// File name the instrument refers to through `dfile`
    pub file_name: String,

    #[serde(flatten)]
    pub kind: ResponseKind,
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Response {} ({})", self.file_name, self.kind.format_name())?;
        match &self.kind {
            ResponseKind::Paz {
                scale_factor,
                poles,
                zeros,
            } => {
                writeln!(f, "scale factor: {:e}", scale_factor)?;
                writeln!(f, "poles ({}):", poles.len())?;
                for (re, im) in poles {
                    writeln!(f, "  {:>14.6e} {:>14.6e}", re, im)?;
                }
                writeln!(f, "zeros ({}):", zeros.len())?;
                for (re, im) in zeros {
                    writeln!(f, "  {:>14.6e} {:>14.6e}", re, im)?;
                }
            }
            ResponseKind::Fap { points } => {
                writeln!(f, "{:>14} {:>14} {:>14}", "freq", "amp", "phase")?;
                for point in points {
                    writeln!(
                        f,
                        "{:>14.6e} {:>14.6e} {:>14.6}",
                        point.frequency, point.amplitude, point.phase
                    )?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_between_neighbours() {
        assert_eq!(
            EntityKind::Station.path_to(EntityKind::Sitechan),
            vec![EntityKind::Sitechan]
        );
        assert_eq!(
            EntityKind::Instrument.path_to(EntityKind::Sensor),
            vec![EntityKind::Sensor]
        );
    }

    #[test]
    fn test_multi_hop_paths_go_through_intermediates() {
        assert_eq!(
            EntityKind::Station.path_to(EntityKind::Instrument),
            vec![
                EntityKind::Sitechan,
                EntityKind::Sensor,
                EntityKind::Instrument
            ]
        );
        assert_eq!(
            EntityKind::Instrument.path_to(EntityKind::Station),
            vec![EntityKind::Sensor, EntityKind::Sitechan, EntityKind::Station]
        );
        assert_eq!(
            EntityKind::Sensor.path_to(EntityKind::Station),
            vec![EntityKind::Sitechan, EntityKind::Station]
        );
        assert!(EntityKind::Sensor.path_to(EntityKind::Sensor).is_empty());
    }

    #[test]
    fn test_others_excludes_self() {
        let others: Vec<_> = EntityKind::Sensor.others().collect();
        assert_eq!(
            others,
            vec![
                EntityKind::Station,
                EntityKind::Sitechan,
                EntityKind::Instrument
            ]
        );
    }

    #[test]
    fn test_entity_kind_parsing() {
        assert_eq!("station".parse::<EntityKind>().unwrap(), EntityKind::Station);
        assert_eq!(" Sitechan ".parse::<EntityKind>().unwrap(), EntityKind::Sitechan);
        assert_eq!("SENSORS".parse::<EntityKind>().unwrap(), EntityKind::Sensor);
        assert!("response".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_response_json_shape() {
        let response = Response {
            id: 0,
            file_name: "sts2.paz".to_string(),
            kind: ResponseKind::Paz {
                scale_factor: 1.0,
                poles: vec![(-0.037, 0.037), (-0.037, -0.037)],
                zeros: vec![(0.0, 0.0)],
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["format"], "paz");
        assert_eq!(json["file_name"], "sts2.paz");

        let back: Response = serde_json::from_value(json).unwrap();
        assert_eq!(back, response);
    }

    #[test]
    fn test_response_display_lists_points() {
        let response = Response {
            id: 3,
            file_name: "cmg3.fap".to_string(),
            kind: ResponseKind::Fap {
                points: vec![FapPoint {
                    frequency: 1.0,
                    amplitude: 2.0,
                    phase: -90.0,
                }],
            },
        };

        let text = response.to_string();
        assert!(text.starts_with("Response cmg3.fap (fap)"));
        assert!(text.contains("-90.000000"));
    }
}
