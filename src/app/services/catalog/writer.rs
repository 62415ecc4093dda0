//! Row inserts used by the staging commit
//!
//! Every function takes a plain connection so it can run inside the
//! transaction opened by [`CatalogStore::transaction`](super::CatalogStore::transaction).

use crate::app::models::{EntityKind, Id, Response};
use crate::app::services::staging::{ChannelDraft, InstrumentDraft, StationDraft};
use crate::{Error, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};

pub fn station_exists(conn: &Connection, network: &str, station_code: &str) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM station WHERE network = ?1 AND station_code = ?2)",
        params![network, station_code],
        |row| row.get(0),
    )
    .map_err(|e| {
        Error::storage_query(
            format!("Failed to check station {}.{}", network, station_code),
            e,
        )
    })
}

/// Whether a row with `id` exists in the table of `kind`
pub fn entity_exists(conn: &Connection, kind: EntityKind, id: Id) -> Result<bool> {
    let sql = format!(
        "SELECT EXISTS (SELECT 1 FROM {} WHERE id = ?1)",
        kind.table_name()
    );
    conn.query_row(&sql, params![id], |row| row.get(0))
        .map_err(|e| Error::storage_query(format!("Failed to check {} {}", kind, id), e))
}

/// Id of the response stored under `file_name`
pub fn response_id_by_file(conn: &Connection, file_name: &str) -> Result<Option<Id>> {
    conn.query_row(
        "SELECT id FROM response WHERE file_name = ?1",
        params![file_name],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| Error::storage_query(format!("Failed to look up response {}", file_name), e))
}

pub fn insert_station(conn: &Connection, draft: &StationDraft, load_date: NaiveDate) -> Result<Id> {
    conn.execute(
        "INSERT INTO station (network, station_code, station_name, on_date, off_date, \
         latitude, longitude, elevation, station_type, reference_station, north_offset, \
         east_offset, load_date) \
         VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            draft.network,
            draft.station_code,
            draft.station_name,
            draft.on_date,
            draft.latitude,
            draft.longitude,
            draft.elevation,
            draft.station_type,
            draft.reference_station(),
            draft.north_offset,
            draft.east_offset,
            load_date,
        ],
    )
    .map_err(|e| {
        Error::storage_query(
            format!(
                "Failed to insert station {}.{}",
                draft.network, draft.station_code
            ),
            e,
        )
    })?;
    Ok(conn.last_insert_rowid())
}

/// Store a response document; the id field of `response` is ignored
pub fn insert_response(conn: &Connection, response: &Response) -> Result<Id> {
    let document = serde_json::to_string(response).map_err(|e| {
        Error::serialization(format!("Failed to encode response {}", response.file_name), e)
    })?;

    conn.execute(
        "INSERT INTO response (file_name, response_format, document) VALUES (?1, ?2, ?3)",
        params![response.file_name, response.kind.format_name(), document],
    )
    .map_err(|e| {
        Error::storage_query(format!("Failed to insert response {}", response.file_name), e)
    })?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_instrument(
    conn: &Connection,
    draft: &InstrumentDraft,
    response_id: Option<Id>,
    load_date: NaiveDate,
) -> Result<Id> {
    conn.execute(
        "INSERT INTO instrument (instrument_name, instrument_type, band, digital, samprate, \
         ncalib, ncalper, resp_dir, dfile, rsptype, response_id, load_date) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            draft.instrument_name,
            draft.instrument_type,
            draft.band,
            draft.digital,
            draft.samprate,
            draft.ncalib,
            draft.ncalper,
            draft.resp_dir,
            draft.dfile,
            draft.rsptype,
            response_id,
            load_date,
        ],
    )
    .map_err(|e| {
        Error::storage_query(
            format!("Failed to insert instrument {}", draft.instrument_name),
            e,
        )
    })?;
    Ok(conn.last_insert_rowid())
}

/// Insert the site-channel and sensor of one connected component
///
/// Returns `(sitechan_id, sensor_id)`.
pub fn insert_channel(conn: &Connection, draft: &ChannelDraft, load_date: NaiveDate) -> Result<(Id, Id)> {
    conn.execute(
        "INSERT INTO sitechan (station_id, channel_code, on_date, off_date, channel_type, \
         emplacement_depth, horizontal_angle, vertical_angle, description, load_date) \
         VALUES (?1, ?2, ?3, NULL, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            draft.station_id,
            draft.channel_code,
            draft.on_date,
            draft.channel_type,
            draft.emplacement_depth,
            draft.horizontal_angle,
            draft.vertical_angle,
            draft.description,
            load_date,
        ],
    )
    .map_err(|e| {
        Error::storage_query(
            format!(
                "Failed to insert channel {} for station {}",
                draft.channel_code, draft.station_id
            ),
            e,
        )
    })?;
    let sitechan_id = conn.last_insert_rowid();

    conn.execute(
        "INSERT INTO sensor (sitechan_id, instrument_id, time, endtime, calratio, calper, \
         tshift, instant, load_date) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            sitechan_id,
            draft.instrument_id,
            draft.time,
            draft.endtime,
            draft.calratio,
            draft.calper,
            draft.tshift,
            draft.instant,
            load_date,
        ],
    )
    .map_err(|e| {
        Error::storage_query(
            format!(
                "Failed to insert sensor for channel {} of instrument {}",
                draft.channel_code, draft.instrument_id
            ),
            e,
        )
    })?;

    Ok((sitechan_id, conn.last_insert_rowid()))
}
