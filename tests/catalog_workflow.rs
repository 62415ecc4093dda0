//! End-to-end workflow: create a catalog, commit staged rows, then browse them
//! through the selection manager.

use chrono::{NaiveDate, NaiveDateTime};
use stationtool::app::models::{FapPoint, Response, ResponseKind};
use stationtool::app::services::staging::{
    ConnectInstrument, InstrumentDraft, StagingArea, StationDraft,
};
use stationtool::{CatalogStore, EntityKind, Error, IdSet, RelationshipResolver, SelectionManager};
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn on_time(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn station(code: &str, on_date: NaiveDate) -> StationDraft {
    StationDraft {
        network: "HE".to_string(),
        station_code: code.to_string(),
        station_name: format!("{} test site", code),
        on_date,
        latitude: 64.5,
        longitude: 26.1,
        elevation: 0.12,
        station_type: "bb".to_string(),
        reference_station: None,
        north_offset: 0.0,
        east_offset: 0.0,
    }
}

fn instrument(name: &str, dfile: &str, rsptype: &str) -> InstrumentDraft {
    InstrumentDraft {
        instrument_name: name.to_string(),
        instrument_type: "SEIS".to_string(),
        band: "b".to_string(),
        digital: "d".to_string(),
        samprate: 100.0,
        ncalib: 1.5,
        ncalper: 1.0,
        resp_dir: "../response".to_string(),
        dfile: dfile.to_string(),
        rsptype: rsptype.to_string(),
    }
}

fn connect(station_id: i64, instrument_id: i64, channels: &[&str], at: &str) -> ConnectInstrument {
    ConnectInstrument {
        station_id,
        instrument_id,
        channels: channels.iter().map(|c| c.to_string()).collect(),
        on_time: on_time(at),
        emplacement_depth: 0.0,
        description: String::new(),
        tshift: 0.0,
        instant: "n".to_string(),
        calratio: None,
        calper: None,
    }
}

/// Catalog with two stations, each with one instrument connected
fn build_catalog() -> (TempDir, CatalogStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = CatalogStore::new(temp_dir.path().join("nested").join("catalog.sqlite"));
    store.init().unwrap();

    let mut staging = StagingArea::new();
    staging.stage_station(station("KEV", date(2001, 1, 1))).unwrap();
    staging.stage_station(station("SUF", date(2015, 6, 1))).unwrap();
    staging
        .stage_instrument(
            instrument("STS-2", "sts2.fap", "fap"),
            Some(Response {
                id: 0,
                file_name: "sts2.fap".to_string(),
                kind: ResponseKind::Fap {
                    points: vec![FapPoint {
                        frequency: 1.0,
                        amplitude: 1500.0,
                        phase: 0.0,
                    }],
                },
            }),
        )
        .unwrap();
    staging
        .stage_instrument(instrument("CMG-3T", "cmg3t.paz", "paz"), None)
        .unwrap();
    let report = staging.push_with_load_date(&store, date(2024, 3, 1)).unwrap();
    assert_eq!(report.stations.len(), 2);
    assert_eq!(report.instruments.len(), 2);
    assert_eq!(report.responses.len(), 1);
    assert!(staging.is_empty());

    let (kev, suf) = (report.stations[0], report.stations[1]);
    let (sts2, cmg) = (report.instruments[0], report.instruments[1]);

    let mut staging = StagingArea::new();
    staging
        .connect_instrument(
            &connect(kev, sts2, &["N", "E", "Z"], "2001-01-01 00:00:00"),
            &store.instrument(sts2).unwrap(),
        )
        .unwrap();
    staging
        .connect_instrument(
            &connect(suf, cmg, &["Z"], "2016-03-10 08:30:00"),
            &store.instrument(cmg).unwrap(),
        )
        .unwrap();
    let report = staging.push_with_load_date(&store, date(2024, 3, 1)).unwrap();
    assert_eq!(report.sitechans.len(), 4);
    assert_eq!(report.sensors.len(), 4);

    (temp_dir, store)
}

fn station_id(store: &CatalogStore, code: &str) -> i64 {
    store
        .stations()
        .unwrap()
        .into_iter()
        .find(|s| s.station_code == code)
        .map(|s| s.id)
        .unwrap()
}

#[test]
fn test_committed_rows_are_linked() {
    let (_temp_dir, store) = build_catalog();

    let counts = store.counts().unwrap();
    assert_eq!(counts.stations, 2);
    assert_eq!(counts.sitechans, 4);
    assert_eq!(counts.sensors, 4);
    assert_eq!(counts.instruments, 2);
    assert_eq!(counts.responses, 1);

    let instruments = store.instruments().unwrap();
    let sts2 = instruments.iter().find(|i| i.dfile == "sts2.fap").unwrap();
    let response = store.response_for_instrument(sts2.id).unwrap().unwrap();
    assert_eq!(response.file_name, "sts2.fap");

    let cmg = instruments.iter().find(|i| i.dfile == "cmg3t.paz").unwrap();
    assert!(store.response_for_instrument(cmg.id).unwrap().is_none());

    for sensor in store.sensors().unwrap() {
        assert_eq!(sensor.calratio, 1.5);
        assert!(sensor.validity().endtime.is_open());
    }
}

#[test]
fn test_selection_follows_committed_chain() {
    let (_temp_dir, store) = build_catalog();
    let kev = station_id(&store, "KEV");
    let suf = station_id(&store, "SUF");

    let mut manager = SelectionManager::new(&store);
    manager.add_station_to_selection(kev).unwrap();

    assert_eq!(manager.selected_sitechans().len(), 3);
    assert_eq!(manager.selected_sensors().len(), 3);
    assert_eq!(manager.selected_instruments().len(), 1);

    manager.add_station_to_selection(suf).unwrap();
    assert_eq!(manager.selected_sitechans().len(), 4);
    assert_eq!(manager.selected_instruments().len(), 2);

    // Jumping to the CMG-3T instrument keeps Station as the active type
    let cmg = store
        .instruments()
        .unwrap()
        .into_iter()
        .find(|i| i.instrument_name == "CMG-3T")
        .unwrap();
    manager.select(EntityKind::Instrument, cmg.id).unwrap();
    assert_eq!(manager.active_kind(), Some(EntityKind::Station));
    assert_eq!(manager.selected_stations().as_slice(), &[suf]);
}

#[test]
fn test_date_view_before_second_station() {
    let (_temp_dir, store) = build_catalog();
    let kev = station_id(&store, "KEV");

    let mut manager = SelectionManager::new(&store);
    manager.select_date(date(2010, 1, 1)).unwrap();

    assert_eq!(manager.selected_stations().as_slice(), &[kev]);
    assert_eq!(manager.selected_sitechans().len(), 3);
    assert_eq!(manager.selected_instruments().len(), 1);

    // The SUF sensor starts mid-day; it covers midnight only from the next day
    manager.select_date(date(2016, 3, 10)).unwrap();
    assert_eq!(manager.selected_sensors().len(), 3);
    manager.select_date(date(2016, 3, 11)).unwrap();
    assert_eq!(manager.selected_sensors().len(), 4);
}

#[test]
fn test_resolver_lookup_contract() {
    let (_temp_dir, store) = build_catalog();
    let kev = station_id(&store, "KEV");

    let instruments = store
        .lookup(
            EntityKind::Station,
            EntityKind::Instrument,
            &IdSet::single(kev),
            None,
        )
        .unwrap();
    assert_eq!(instruments.len(), 1);

    let empty = store
        .lookup(EntityKind::Sensor, EntityKind::Station, &IdSet::new(), None)
        .unwrap();
    assert!(empty.is_empty());

    assert!(matches!(
        store.lookup(EntityKind::Sensor, EntityKind::Sensor, &IdSet::single(1), None),
        Err(Error::UnsupportedLookup { .. })
    ));
}

#[test]
fn test_failed_push_keeps_catalog_and_staging() {
    let (_temp_dir, store) = build_catalog();
    let before = store.counts().unwrap();

    let mut staging = StagingArea::new();
    staging.stage_station(station("NEW", date(2024, 1, 1))).unwrap();
    staging.stage_station(station("KEV", date(2024, 1, 1))).unwrap();

    let error = staging.push_with_load_date(&store, date(2024, 3, 1)).unwrap_err();
    assert!(matches!(error, Error::DataValidation { .. }));
    assert_eq!(store.counts().unwrap(), before);
    assert_eq!(staging.len(), 2);
}
