//! Draft rows and their validation
//!
//! Drafts carry the user-entered fields of a new row. Ids, load dates and
//! links to rows created in the same commit are assigned when the staging
//! area is pushed to the catalog.

use crate::app::models::{Id, Instrument, Response, ResponseKind};
use crate::constants::{
    CONNECTABLE_CHANNELS, CONNECTED_CHANNEL_TYPE, DEFAULT_RESPONSE_DIR, DIGITAL_FLAGS,
    INSTANT_FLAGS, RESPONSE_FORMATS, SENSOR_OPEN_END, STATION_TYPES, channel_orientation,
    limits,
};
use crate::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Network, station and reference station codes
static CODE_REGEX: LazyLock<Regex> =
    // pattern is a literal
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("Invalid station code regex"));

// =============================================================================
// Stations
// =============================================================================

/// New station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationDraft {
    pub network: String,
    pub station_code: String,
    pub station_name: String,
    pub on_date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,

    /// Kilometres
    pub elevation: f64,
    pub station_type: String,

    /// Blank unless the station is part of an array
    #[serde(default)]
    pub reference_station: Option<String>,
    #[serde(default)]
    pub north_offset: f64,
    #[serde(default)]
    pub east_offset: f64,
}

impl StationDraft {
    pub fn validate(&self) -> Result<()> {
        check_code("network", &self.network, limits::NETWORK_MAX_LEN)?;
        check_code(
            "station code",
            &self.station_code,
            limits::STATION_CODE_MAX_LEN,
        )?;
        check_text("station name", &self.station_name, limits::STATION_NAME_MAX_LEN)?;
        check_range("latitude", self.latitude, limits::LATITUDE_DEG)?;
        check_range("longitude", self.longitude, limits::LONGITUDE_DEG)?;
        check_range("elevation", self.elevation, limits::ELEVATION_KM)?;
        check_choice("station type", &self.station_type, STATION_TYPES)?;

        if let Some(reference) = self.reference_station() {
            check_code(
                "reference station",
                reference,
                limits::STATION_CODE_MAX_LEN,
            )?;
        }
        check_range("north offset", self.north_offset, limits::OFFSET_KM)?;
        check_range("east offset", self.east_offset, limits::OFFSET_KM)?;
        Ok(())
    }

    /// Reference station code, with a blank entry read as none
    pub fn reference_station(&self) -> Option<&str> {
        self.reference_station
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

// =============================================================================
// Instruments and Responses
// =============================================================================

/// New instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentDraft {
    pub instrument_name: String,
    pub instrument_type: String,

    /// Single band code character
    pub band: String,
    pub digital: String,
    pub samprate: f64,
    pub ncalib: f64,
    pub ncalper: f64,

    #[serde(default = "default_resp_dir")]
    pub resp_dir: String,

    /// Response file name; links the instrument to its response
    pub dfile: String,
    pub rsptype: String,
}

fn default_resp_dir() -> String {
    DEFAULT_RESPONSE_DIR.to_string()
}

impl InstrumentDraft {
    pub fn validate(&self) -> Result<()> {
        check_text(
            "instrument name",
            &self.instrument_name,
            limits::INSTRUMENT_NAME_MAX_LEN,
        )?;
        check_text(
            "instrument type",
            &self.instrument_type,
            limits::INSTRUMENT_TYPE_MAX_LEN,
        )?;
        check_text("band", &self.band, limits::BAND_LEN)?;
        check_choice("digital flag", &self.digital, DIGITAL_FLAGS)?;
        check_range("sample rate", self.samprate, limits::SAMPRATE)?;
        check_range("ncalib", self.ncalib, limits::NCALIB)?;
        check_range("ncalper", self.ncalper, limits::NCALPER)?;
        check_text("response file", &self.dfile, usize::MAX)?;
        check_choice("response type", &self.rsptype, RESPONSE_FORMATS)?;
        Ok(())
    }

    /// Whether `response` is the one this instrument refers to
    pub fn refers_to(&self, response: &Response) -> bool {
        self.dfile == response.file_name
    }
}

/// Check a response document before it is staged
pub fn validate_response(response: &Response) -> Result<()> {
    check_text("response file name", &response.file_name, usize::MAX)?;

    match &response.kind {
        ResponseKind::Paz {
            scale_factor,
            poles,
            zeros,
        } => {
            if !scale_factor.is_finite() {
                return Err(Error::data_validation(format!(
                    "Response {}: scale factor must be a finite number",
                    response.file_name
                )));
            }
            let finite = |(re, im): &(f64, f64)| re.is_finite() && im.is_finite();
            if !poles.iter().all(finite) || !zeros.iter().all(finite) {
                return Err(Error::data_validation(format!(
                    "Response {}: poles and zeros must be finite",
                    response.file_name
                )));
            }
        }
        ResponseKind::Fap { points } => {
            if points.is_empty() {
                return Err(Error::data_validation(format!(
                    "Response {}: a fap response needs at least one point",
                    response.file_name
                )));
            }
        }
    }
    Ok(())
}

// =============================================================================
// Connecting Instruments
// =============================================================================

/// Request to install an instrument on a station
///
/// Produces one site-channel and one sensor per requested component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectInstrument {
    pub station_id: Id,
    pub instrument_id: Id,

    /// Components to create, any of N, E and Z
    pub channels: Vec<String>,

    /// Installation time (UTC)
    pub on_time: NaiveDateTime,

    /// Metres relative to the station elevation
    #[serde(default)]
    pub emplacement_depth: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tshift: f64,
    pub instant: String,

    /// Defaults to the instrument's nominal calibration
    #[serde(default)]
    pub calratio: Option<f64>,

    /// Defaults to the instrument's nominal calibration period
    #[serde(default)]
    pub calper: Option<f64>,
}

impl ConnectInstrument {
    pub fn validate(&self) -> Result<()> {
        if self.channels.is_empty() {
            return Err(Error::data_validation(
                "At least one channel must be chosen".to_string(),
            ));
        }
        for (i, code) in self.channels.iter().enumerate() {
            if !CONNECTABLE_CHANNELS.contains(&code.as_str()) {
                return Err(Error::data_validation(format!(
                    "Invalid channel '{}'. Expected one of: {}",
                    code,
                    CONNECTABLE_CHANNELS.join(", ")
                )));
            }
            if self.channels[..i].contains(code) {
                return Err(Error::data_validation(format!(
                    "Channel '{}' requested twice",
                    code
                )));
            }
        }

        check_range(
            "emplacement depth",
            self.emplacement_depth,
            limits::EMPLACEMENT_DEPTH_M,
        )?;
        check_optional_text("description", &self.description, limits::DESCRIPTION_MAX_LEN)?;
        check_range("tshift", self.tshift, limits::TSHIFT)?;
        check_choice("instant flag", &self.instant, INSTANT_FLAGS)?;
        if let Some(calratio) = self.calratio {
            check_range("calratio", calratio, limits::CALRATIO)?;
        }
        if let Some(calper) = self.calper {
            check_range("calper", calper, limits::CALPER)?;
        }
        Ok(())
    }

    /// Site-channel and sensor drafts for every requested component
    pub fn channel_drafts(&self, instrument: &Instrument) -> Result<Vec<ChannelDraft>> {
        if instrument.id != self.instrument_id {
            return Err(Error::data_validation(format!(
                "Instrument {} does not match the requested instrument {}",
                instrument.id, self.instrument_id
            )));
        }
        self.validate()?;

        let calratio = self.calratio.unwrap_or(instrument.ncalib);
        let calper = self.calper.unwrap_or(instrument.ncalper);
        check_range("calratio", calratio, limits::CALRATIO)?;
        check_range("calper", calper, limits::CALPER)?;

        self.channels
            .iter()
            .map(|code| {
                let (horizontal_angle, vertical_angle) = channel_orientation(code)
                    .ok_or_else(|| Error::data_validation(format!("Invalid channel '{}'", code)))?;

                Ok(ChannelDraft {
                    station_id: self.station_id,
                    instrument_id: self.instrument_id,
                    channel_code: code.clone(),
                    on_date: self.on_time.date(),
                    channel_type: CONNECTED_CHANNEL_TYPE.to_string(),
                    emplacement_depth: self.emplacement_depth,
                    horizontal_angle,
                    vertical_angle,
                    description: self.description.clone(),
                    time: self.on_time.and_utc().timestamp() as f64,
                    endtime: SENSOR_OPEN_END,
                    calratio,
                    calper,
                    tshift: self.tshift,
                    instant: self.instant.clone(),
                })
            })
            .collect()
    }
}

/// One component of a connected instrument: a site-channel and its sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDraft {
    pub station_id: Id,
    pub instrument_id: Id,

    // Site-channel
    pub channel_code: String,
    pub on_date: NaiveDate,
    pub channel_type: String,
    pub emplacement_depth: f64,
    pub horizontal_angle: f64,
    pub vertical_angle: f64,
    pub description: String,

    // Sensor
    pub time: f64,
    pub endtime: f64,
    pub calratio: f64,
    pub calper: f64,
    pub tshift: f64,
    pub instant: String,
}

// =============================================================================
// Field Checks
// =============================================================================

fn check_text(field: &str, value: &str, max_len: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::data_validation(format!("{} must not be empty", field)));
    }
    check_optional_text(field, value, max_len)
}

fn check_optional_text(field: &str, value: &str, max_len: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max_len {
        return Err(Error::data_validation(format!(
            "{} '{}' is {} characters long, maximum is {}",
            field, value, len, max_len
        )));
    }
    Ok(())
}

fn check_code(field: &str, value: &str, max_len: usize) -> Result<()> {
    check_text(field, value, max_len)?;
    if !CODE_REGEX.is_match(value) {
        return Err(Error::data_validation(format!(
            "{} '{}' may only contain letters and digits",
            field, value
        )));
    }
    Ok(())
}

fn check_range(field: &str, value: f64, (min, max): (f64, f64)) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(Error::data_validation(format!(
            "{} {} is outside the range {} to {}",
            field, value, min, max
        )));
    }
    Ok(())
}

fn check_choice(field: &str, value: &str, choices: &[&str]) -> Result<()> {
    if !choices.contains(&value) {
        return Err(Error::data_validation(format!(
            "Invalid {} '{}'. Expected one of: {}",
            field,
            value,
            choices.join(", ")
        )));
    }
    Ok(())
}
