//! Shared test utilities and fixtures for catalog tests
//!
//! The seeded catalog:
//!
//! | station | on / off               | sitechans                          |
//! |---------|------------------------|------------------------------------|
//! | 1 HEL1  | 2000-01-01 / open      | 10 HHZ (open), 11 HHN (2020 only)  |
//! | 2 OUL2  | 2010-01-01 / 2015-12-31| 20 BHZ (2010..2015)                |
//! | 3 ROV3  | 2018-01-01 / open      | none                               |
//!
//! | sensor | sitechan | instrument | window                 |
//! |--------|----------|------------|------------------------|
//! | 1000   | 10       | 100        | 2000-01-01 / open      |
//! | 1001   | 11       | 200        | 2020-01-01 / 2020-12-31|
//! | 1002   | 11       | 300        | 2020-01-01 / open      |
//! | 2000   | 20       | 200        | 2010-01-01 / 2015-12-31|
//!
//! Instrument 400 has no sensors.

use crate::app::models::validity::date_to_epoch;
use crate::app::services::catalog::CatalogStore;
use crate::app::services::selection::IdSet;
use crate::constants::SENSOR_OPEN_END;
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use tempfile::TempDir;


pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Last second of `date` in epoch seconds
pub fn end_of_day(y: i32, m: u32, d: u32) -> f64 {
    date_to_epoch(date(y, m, d)) + 86_399.0
}

pub fn ids(values: &[i64]) -> IdSet {
    values.iter().copied().collect()
}

/// Initialised catalog with no rows
pub fn create_empty_catalog() -> (TempDir, CatalogStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = CatalogStore::new(temp_dir.path().join("catalog.sqlite"));
    store.init().unwrap();
    (temp_dir, store)
}

/// Initialised catalog holding the chain described in the module docs
pub fn create_test_catalog() -> (TempDir, CatalogStore) {
    let (temp_dir, store) = create_empty_catalog();
    let conn = Connection::open(store.path()).unwrap();
    seed_chain(&conn);
    (temp_dir, store)
}

pub fn insert_station(
    conn: &Connection,
    id: i64,
    code: &str,
    on_date: NaiveDate,
    off_date: Option<NaiveDate>,
) {
    conn.execute(
        "INSERT INTO station (id, network, station_code, station_name, on_date, off_date, \
         latitude, longitude, elevation, station_type, load_date) \
         VALUES (?1, 'HE', ?2, ?3, ?4, ?5, 60.17, 24.95, 0.02, 'bb', ?4)",
        params![id, code, format!("{} station", code), on_date, off_date],
    )
    .unwrap();
}

pub fn insert_sitechan(
    conn: &Connection,
    id: i64,
    station_id: i64,
    code: &str,
    on_date: NaiveDate,
    off_date: Option<NaiveDate>,
) {
    conn.execute(
        "INSERT INTO sitechan (id, station_id, channel_code, on_date, off_date, channel_type, \
         emplacement_depth, horizontal_angle, vertical_angle, description, load_date) \
         VALUES (?1, ?2, ?3, ?4, ?5, 'n', 0.0, -1.0, 0.0, '', ?4)",
        params![id, station_id, code, on_date, off_date],
    )
    .unwrap();
}

pub fn insert_instrument(conn: &Connection, id: i64, name: &str) {
    conn.execute(
        "INSERT INTO instrument (id, instrument_name, instrument_type, band, digital, samprate, \
         ncalib, ncalper, resp_dir, dfile, rsptype, response_id, load_date) \
         VALUES (?1, ?2, 'STS2', 'b', 'd', 100.0, 1.0, 1.0, '../response', ?3, 'paz', NULL, \
         '2000-01-01')",
        params![id, name, format!("{}.paz", name.to_lowercase())],
    )
    .unwrap();
}

pub fn insert_sensor(
    conn: &Connection,
    id: i64,
    sitechan_id: i64,
    instrument_id: i64,
    time: f64,
    endtime: f64,
) {
    conn.execute(
        "INSERT INTO sensor (id, sitechan_id, instrument_id, time, endtime, calratio, calper, \
         tshift, instant, load_date) \
         VALUES (?1, ?2, ?3, ?4, ?5, 1.0, 1.0, 0.0, 'n', '2000-01-01')",
        params![id, sitechan_id, instrument_id, time, endtime],
    )
    .unwrap();
}

pub fn seed_chain(conn: &Connection) {
    insert_station(conn, 1, "HEL1", date(2000, 1, 1), None);
    insert_station(conn, 2, "OUL2", date(2010, 1, 1), Some(date(2015, 12, 31)));
    insert_station(conn, 3, "ROV3", date(2018, 1, 1), None);

    insert_sitechan(conn, 10, 1, "HHZ", date(2000, 1, 1), None);
    insert_sitechan(conn, 11, 1, "HHN", date(2020, 1, 1), Some(date(2020, 12, 31)));
    insert_sitechan(conn, 20, 2, "BHZ", date(2010, 1, 1), Some(date(2015, 12, 31)));

    insert_instrument(conn, 100, "STS-2");
    insert_instrument(conn, 200, "CMG-3T");
    insert_instrument(conn, 300, "TRILLIUM");
    insert_instrument(conn, 400, "SPARE");

    insert_sensor(conn, 1000, 10, 100, date_to_epoch(date(2000, 1, 1)), SENSOR_OPEN_END);
    insert_sensor(
        conn,
        1001,
        11,
        200,
        date_to_epoch(date(2020, 1, 1)),
        end_of_day(2020, 12, 31),
    );
    insert_sensor(conn, 1002, 11, 300, date_to_epoch(date(2020, 1, 1)), SENSOR_OPEN_END);
    insert_sensor(
        conn,
        2000,
        20,
        200,
        date_to_epoch(date(2010, 1, 1)),
        end_of_day(2015, 12, 31),
    );
}
