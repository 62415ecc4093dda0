//! Catalog table definitions
//!
//! Calendar dates are stored as ISO-8601 text, sensor times as REAL epoch
//! seconds with the open-end sentinel in `endtime`. Responses are stored as a
//! JSON document keyed by their file name.

/// Version stamped into `PRAGMA user_version` by [`SCHEMA_SQL`]
pub const SCHEMA_VERSION: i64 = 1;

pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS station (
    id                INTEGER PRIMARY KEY,
    network           TEXT    NOT NULL,
    station_code      TEXT    NOT NULL,
    station_name      TEXT    NOT NULL,
    on_date           TEXT    NOT NULL,
    off_date          TEXT,
    latitude          REAL    NOT NULL,
    longitude         REAL    NOT NULL,
    elevation         REAL    NOT NULL,
    station_type      TEXT    NOT NULL,
    reference_station TEXT,
    north_offset      REAL    NOT NULL DEFAULT 0,
    east_offset       REAL    NOT NULL DEFAULT 0,
    load_date         TEXT    NOT NULL,
    UNIQUE (network, station_code)
);

CREATE TABLE IF NOT EXISTS response (
    id              INTEGER PRIMARY KEY,
    file_name       TEXT    NOT NULL UNIQUE,
    response_format TEXT    NOT NULL,
    document        TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS instrument (
    id              INTEGER PRIMARY KEY,
    instrument_name TEXT    NOT NULL,
    instrument_type TEXT    NOT NULL,
    band            TEXT    NOT NULL,
    digital         TEXT    NOT NULL,
    samprate        REAL    NOT NULL,
    ncalib          REAL    NOT NULL,
    ncalper         REAL    NOT NULL,
    resp_dir        TEXT    NOT NULL,
    dfile           TEXT    NOT NULL,
    rsptype         TEXT    NOT NULL,
    response_id     INTEGER REFERENCES response (id),
    load_date       TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS sitechan (
    id                INTEGER PRIMARY KEY,
    station_id        INTEGER NOT NULL REFERENCES station (id),
    channel_code      TEXT    NOT NULL,
    on_date           TEXT    NOT NULL,
    off_date          TEXT,
    channel_type      TEXT    NOT NULL,
    emplacement_depth REAL    NOT NULL,
    horizontal_angle  REAL    NOT NULL,
    vertical_angle    REAL    NOT NULL,
    description       TEXT    NOT NULL DEFAULT '',
    load_date         TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS sensor (
    id            INTEGER PRIMARY KEY,
    sitechan_id   INTEGER NOT NULL REFERENCES sitechan (id),
    instrument_id INTEGER NOT NULL REFERENCES instrument (id),
    time          REAL    NOT NULL,
    endtime       REAL    NOT NULL,
    calratio      REAL    NOT NULL,
    calper        REAL    NOT NULL,
    tshift        REAL    NOT NULL,
    instant       TEXT    NOT NULL,
    load_date     TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sitechan_station ON sitechan (station_id);
CREATE INDEX IF NOT EXISTS idx_sensor_sitechan ON sensor (sitechan_id);
CREATE INDEX IF NOT EXISTS idx_sensor_instrument ON sensor (instrument_id);

PRAGMA user_version = 1;
"#;
