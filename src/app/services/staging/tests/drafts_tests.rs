//! Tests for draft validation and connect-instrument expansion

use super::*;
use crate::Error;
use crate::app::models::validity::date_to_epoch;
use crate::app::models::{FapPoint, Instrument};
use crate::app::services::staging::validate_response;
use crate::constants::SENSOR_OPEN_END;

fn assert_invalid<T: std::fmt::Debug>(result: crate::Result<T>, fragment: &str) {
    match result {
        Err(Error::DataValidation { message }) => assert!(
            message.contains(fragment),
            "expected '{}' in '{}'",
            fragment,
            message
        ),
        other => panic!("expected a validation error, got {:?}", other),
    }
}

fn instrument(id: i64) -> Instrument {
    Instrument {
        id,
        instrument_name: "STS-2".to_string(),
        instrument_type: "STS2".to_string(),
        band: "b".to_string(),
        digital: "d".to_string(),
        samprate: 100.0,
        ncalib: 0.75,
        ncalper: 1.5,
        resp_dir: "../response".to_string(),
        dfile: "sts2.paz".to_string(),
        rsptype: "paz".to_string(),
        response_id: None,
        load_date: load_date(),
    }
}

#[test]
fn test_valid_station_draft() {
    station_draft("HEL9").validate().unwrap();
}

#[test]
fn test_station_code_limits() {
    assert_invalid(station_draft("TOOLONG").validate(), "maximum is 6");
    assert_invalid(station_draft("HE-1").validate(), "letters and digits");
    assert_invalid(station_draft("  ").validate(), "must not be empty");
}

#[test]
fn test_station_numeric_ranges() {
    let mut draft = station_draft("HEL9");
    draft.elevation = 11.0;
    assert_invalid(draft.validate(), "elevation");

    let mut draft = station_draft("HEL9");
    draft.latitude = 95.0;
    assert_invalid(draft.validate(), "latitude");

    let mut draft = station_draft("HEL9");
    draft.east_offset = -50.5;
    assert_invalid(draft.validate(), "east offset");

    let mut draft = station_draft("HEL9");
    draft.north_offset = f64::NAN;
    assert_invalid(draft.validate(), "north offset");
}

#[test]
fn test_station_type_and_reference() {
    let mut draft = station_draft("HEL9");
    draft.station_type = "xx".to_string();
    assert_invalid(draft.validate(), "station type");

    let mut draft = station_draft("HEL9");
    draft.station_type = "ar".to_string();
    draft.reference_station = Some("   ".to_string());
    draft.validate().unwrap();
    assert_eq!(draft.reference_station(), None);

    draft.reference_station = Some("HEL1".to_string());
    draft.north_offset = 1.25;
    draft.validate().unwrap();
    assert_eq!(draft.reference_station(), Some("HEL1"));
}

#[test]
fn test_instrument_draft_checks() {
    instrument_draft("cmg3.paz").validate().unwrap();

    let mut draft = instrument_draft("cmg3.paz");
    draft.band = "bb".to_string();
    assert_invalid(draft.validate(), "band");

    let mut draft = instrument_draft("cmg3.paz");
    draft.digital = "x".to_string();
    assert_invalid(draft.validate(), "digital flag");

    let mut draft = instrument_draft("cmg3.paz");
    draft.samprate = 5.0;
    assert_invalid(draft.validate(), "sample rate");

    let mut draft = instrument_draft("cmg3.paz");
    draft.ncalper = 200.0;
    assert_invalid(draft.validate(), "ncalper");

    let mut draft = instrument_draft("cmg3.paz");
    draft.rsptype = "resp".to_string();
    assert_invalid(draft.validate(), "response type");

    assert_invalid(instrument_draft("").validate(), "response file");
}

#[test]
fn test_response_checks() {
    validate_response(&paz_response("cmg3.paz")).unwrap();

    let empty_fap = Response {
        id: 0,
        file_name: "empty.fap".to_string(),
        kind: ResponseKind::Fap { points: vec![] },
    };
    assert_invalid(validate_response(&empty_fap), "at least one point");

    let fap = Response {
        id: 0,
        file_name: "one.fap".to_string(),
        kind: ResponseKind::Fap {
            points: vec![FapPoint {
                frequency: 0.1,
                amplitude: 1.0,
                phase: 0.0,
            }],
        },
    };
    validate_response(&fap).unwrap();

    let bad_paz = Response {
        id: 0,
        file_name: "bad.paz".to_string(),
        kind: ResponseKind::Paz {
            scale_factor: f64::INFINITY,
            poles: vec![],
            zeros: vec![],
        },
    };
    assert_invalid(validate_response(&bad_paz), "scale factor");
}

#[test]
fn test_connect_creates_oriented_channels() {
    let request = connect_request(1, 100);
    let drafts = request.channel_drafts(&instrument(100)).unwrap();

    let orientation: Vec<_> = drafts
        .iter()
        .map(|d| (d.channel_code.as_str(), d.horizontal_angle, d.vertical_angle))
        .collect();
    assert_eq!(
        orientation,
        vec![("N", 0.0, 90.0), ("E", 90.0, 90.0), ("Z", -1.0, 0.0)]
    );

    let expected_time = date_to_epoch(request.on_time.date()) + 12.0 * 3600.0;
    for draft in &drafts {
        assert_eq!(draft.station_id, 1);
        assert_eq!(draft.instrument_id, 100);
        assert_eq!(draft.on_date, request.on_time.date());
        assert_eq!(draft.channel_type, "n");
        assert_eq!(draft.time, expected_time);
        assert_eq!(draft.endtime, SENSOR_OPEN_END);
        assert_eq!(draft.emplacement_depth, 2.5);
        assert_eq!(draft.description, "vault");
    }
}

#[test]
fn test_connect_calibration_defaults_to_instrument() {
    let mut request = connect_request(1, 100);
    let drafts = request.channel_drafts(&instrument(100)).unwrap();
    assert_eq!(drafts[0].calratio, 0.75);
    assert_eq!(drafts[0].calper, 1.5);

    request.calratio = Some(2.0);
    request.calper = Some(20.0);
    let drafts = request.channel_drafts(&instrument(100)).unwrap();
    assert_eq!(drafts[0].calratio, 2.0);
    assert_eq!(drafts[0].calper, 20.0);
}

#[test]
fn test_connect_request_checks() {
    let mut request = connect_request(1, 100);
    request.channels = vec![];
    assert_invalid(request.validate(), "At least one channel");

    let mut request = connect_request(1, 100);
    request.channels = vec!["Z".to_string(), "X".to_string()];
    assert_invalid(request.validate(), "Invalid channel 'X'");

    let mut request = connect_request(1, 100);
    request.channels = vec!["Z".to_string(), "Z".to_string()];
    assert_invalid(request.validate(), "requested twice");

    let mut request = connect_request(1, 100);
    request.emplacement_depth = 150.0;
    assert_invalid(request.validate(), "emplacement depth");

    let mut request = connect_request(1, 100);
    request.instant = "maybe".to_string();
    assert_invalid(request.validate(), "instant flag");

    let mut request = connect_request(1, 100);
    request.calper = Some(6000.0);
    assert_invalid(request.validate(), "calper");
}

#[test]
fn test_connect_rejects_mismatched_instrument() {
    let request = connect_request(1, 100);
    assert_invalid(request.channel_drafts(&instrument(200)), "does not match");
}
