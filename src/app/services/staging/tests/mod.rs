//! Shared test utilities and fixtures for staging tests

use crate::app::models::{Response, ResponseKind};
use crate::app::services::staging::{ConnectInstrument, InstrumentDraft, StationDraft};
use chrono::{NaiveDate, NaiveDateTime};

pub use crate::app::services::catalog::tests::{create_empty_catalog, create_test_catalog};

pub mod drafts_tests;

pub fn load_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

pub fn on_time(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

/// Valid station draft
pub fn station_draft(code: &str) -> StationDraft {
    StationDraft {
        network: "HE".to_string(),
        station_code: code.to_string(),
        station_name: format!("{} observatory", code),
        on_date: NaiveDate::from_ymd_opt(2021, 5, 1).unwrap(),
        latitude: 61.2,
        longitude: 25.1,
        elevation: 0.15,
        station_type: "bb".to_string(),
        reference_station: None,
        north_offset: 0.0,
        east_offset: 0.0,
    }
}

/// Valid instrument draft referring to `dfile`
pub fn instrument_draft(dfile: &str) -> InstrumentDraft {
    InstrumentDraft {
        instrument_name: "Guralp CMG-3ESP".to_string(),
        instrument_type: "CMG3".to_string(),
        band: "b".to_string(),
        digital: "d".to_string(),
        samprate: 100.0,
        ncalib: 0.25,
        ncalper: 1.0,
        resp_dir: "../response".to_string(),
        dfile: dfile.to_string(),
        rsptype: "paz".to_string(),
    }
}

pub fn paz_response(file_name: &str) -> Response {
    Response {
        id: 0,
        file_name: file_name.to_string(),
        kind: ResponseKind::Paz {
            scale_factor: 2.0e10,
            poles: vec![(-0.01178, 0.01178), (-0.01178, -0.01178)],
            zeros: vec![(0.0, 0.0), (0.0, 0.0)],
        },
    }
}

/// Connect request for all three components
pub fn connect_request(station_id: i64, instrument_id: i64) -> ConnectInstrument {
    ConnectInstrument {
        station_id,
        instrument_id,
        channels: vec!["N".to_string(), "E".to_string(), "Z".to_string()],
        on_time: on_time("2023-04-05 12:00:00"),
        emplacement_depth: 2.5,
        description: "vault".to_string(),
        tshift: 0.0,
        instant: "n".to_string(),
        calratio: None,
        calper: None,
    }
}
