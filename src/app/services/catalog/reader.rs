//! Listing reads used by the catalog views

use super::CatalogStore;
use crate::app::models::{EntityKind, Id, Instrument, Response, Sensor, Sitechan, Station};
use crate::{Error, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;

const STATION_COLUMNS: &str = "id, network, station_code, station_name, on_date, off_date, \
     latitude, longitude, elevation, station_type, reference_station, north_offset, \
     east_offset, load_date";

const SITECHAN_COLUMNS: &str = "id, station_id, channel_code, on_date, off_date, channel_type, \
     emplacement_depth, horizontal_angle, vertical_angle, description, load_date";

const SENSOR_COLUMNS: &str = "id, sitechan_id, instrument_id, time, endtime, calratio, calper, \
     tshift, instant, load_date";

const INSTRUMENT_COLUMNS: &str = "id, instrument_name, instrument_type, band, digital, samprate, \
     ncalib, ncalper, resp_dir, dfile, rsptype, response_id, load_date";

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogCounts {
    pub stations: usize,
    pub sitechans: usize,
    pub sensors: usize,
    pub instruments: usize,
    pub responses: usize,
}

impl CatalogStore {
    /// All stations ordered by id
    pub fn stations(&self) -> Result<Vec<Station>> {
        let conn = self.connect()?;
        query_rows(
            &conn,
            &format!("SELECT {STATION_COLUMNS} FROM station ORDER BY id"),
            station_from_row,
        )
    }

    /// All site-channels ordered by id
    pub fn sitechans(&self) -> Result<Vec<Sitechan>> {
        let conn = self.connect()?;
        query_rows(
            &conn,
            &format!("SELECT {SITECHAN_COLUMNS} FROM sitechan ORDER BY id"),
            sitechan_from_row,
        )
    }

    /// All sensors ordered by id
    pub fn sensors(&self) -> Result<Vec<Sensor>> {
        let conn = self.connect()?;
        query_rows(
            &conn,
            &format!("SELECT {SENSOR_COLUMNS} FROM sensor ORDER BY id"),
            sensor_from_row,
        )
    }

    /// All instruments ordered by id
    pub fn instruments(&self) -> Result<Vec<Instrument>> {
        let conn = self.connect()?;
        query_rows(
            &conn,
            &format!("SELECT {INSTRUMENT_COLUMNS} FROM instrument ORDER BY id"),
            instrument_from_row,
        )
    }

    /// One instrument by id
    pub fn instrument(&self, id: Id) -> Result<Instrument> {
        let conn = self.connect()?;
        find_instrument(&conn, id)?.ok_or_else(|| Error::entity_not_found(EntityKind::Instrument, id))
    }

    /// One station by id
    pub fn station(&self, id: Id) -> Result<Station> {
        let conn = self.connect()?;
        conn.query_row(
            &format!("SELECT {STATION_COLUMNS} FROM station WHERE id = ?1"),
            params![id],
            station_from_row,
        )
        .optional()
        .map_err(|e| Error::storage_query(format!("Failed to read station {}", id), e))?
        .ok_or_else(|| Error::entity_not_found(EntityKind::Station, id))
    }

    /// Response linked to an instrument, if it has one
    pub fn response_for_instrument(&self, instrument_id: Id) -> Result<Option<Response>> {
        let conn = self.connect()?;
        let instrument = find_instrument(&conn, instrument_id)?
            .ok_or_else(|| Error::entity_not_found(EntityKind::Instrument, instrument_id))?;

        let Some(response_id) = instrument.response_id else {
            return Ok(None);
        };

        let document: Option<(Id, String)> = conn
            .query_row(
                "SELECT id, document FROM response WHERE id = ?1",
                params![response_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| Error::storage_query(format!("Failed to read response {}", response_id), e))?;

        match document {
            Some((id, json)) => {
                let mut response: Response = serde_json::from_str(&json).map_err(|e| {
                    Error::serialization(format!("Response {} is not valid JSON", id), e)
                })?;
                response.id = id;
                Ok(Some(response))
            }
            None => Ok(None),
        }
    }

    /// Whether a station with this (network, station code) pair exists
    pub fn station_exists(&self, network: &str, station_code: &str) -> Result<bool> {
        let conn = self.connect()?;
        super::writer::station_exists(&conn, network, station_code)
    }

    /// Number of rows in each table
    pub fn counts(&self) -> Result<CatalogCounts> {
        let conn = self.connect()?;
        let count = |table: &str| -> Result<usize> {
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n as usize)
            .map_err(|e| Error::storage_query(format!("Failed to count {} rows", table), e))
        };

        Ok(CatalogCounts {
            stations: count("station")?,
            sitechans: count("sitechan")?,
            sensors: count("sensor")?,
            instruments: count("instrument")?,
            responses: count("response")?,
        })
    }
}

fn query_rows<T>(
    conn: &Connection,
    sql: &str,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| Error::storage_query(format!("Failed to prepare '{}'", sql), e))?;
    let rows = stmt
        .query_map([], map)
        .map_err(|e| Error::storage_query(format!("Failed to run '{}'", sql), e))?;

    rows.collect::<rusqlite::Result<Vec<T>>>()
        .map_err(|e| Error::storage_query("Failed to decode catalog row", e))
}

pub(crate) fn find_instrument(conn: &Connection, id: Id) -> Result<Option<Instrument>> {
    conn.query_row(
        &format!("SELECT {INSTRUMENT_COLUMNS} FROM instrument WHERE id = ?1"),
        params![id],
        instrument_from_row,
    )
    .optional()
    .map_err(|e| Error::storage_query(format!("Failed to read instrument {}", id), e))
}

// =============================================================================
// Row Mapping
// =============================================================================

fn station_from_row(row: &Row<'_>) -> rusqlite::Result<Station> {
    Ok(Station {
        id: row.get("id")?,
        network: row.get("network")?,
        station_code: row.get("station_code")?,
        station_name: row.get("station_name")?,
        on_date: row.get("on_date")?,
        off_date: row.get("off_date")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        elevation: row.get("elevation")?,
        station_type: row.get("station_type")?,
        reference_station: row.get("reference_station")?,
        north_offset: row.get("north_offset")?,
        east_offset: row.get("east_offset")?,
        load_date: row.get("load_date")?,
    })
}

fn sitechan_from_row(row: &Row<'_>) -> rusqlite::Result<Sitechan> {
    Ok(Sitechan {
        id: row.get("id")?,
        station_id: row.get("station_id")?,
        channel_code: row.get("channel_code")?,
        on_date: row.get("on_date")?,
        off_date: row.get("off_date")?,
        channel_type: row.get("channel_type")?,
        emplacement_depth: row.get("emplacement_depth")?,
        horizontal_angle: row.get("horizontal_angle")?,
        vertical_angle: row.get("vertical_angle")?,
        description: row.get("description")?,
        load_date: row.get("load_date")?,
    })
}

fn sensor_from_row(row: &Row<'_>) -> rusqlite::Result<Sensor> {
    Ok(Sensor {
        id: row.get("id")?,
        sitechan_id: row.get("sitechan_id")?,
        instrument_id: row.get("instrument_id")?,
        time: row.get("time")?,
        endtime: row.get("endtime")?,
        calratio: row.get("calratio")?,
        calper: row.get("calper")?,
        tshift: row.get("tshift")?,
        instant: row.get("instant")?,
        load_date: row.get("load_date")?,
    })
}

fn instrument_from_row(row: &Row<'_>) -> rusqlite::Result<Instrument> {
    Ok(Instrument {
        id: row.get("id")?,
        instrument_name: row.get("instrument_name")?,
        instrument_type: row.get("instrument_type")?,
        band: row.get("band")?,
        digital: row.get("digital")?,
        samprate: row.get("samprate")?,
        ncalib: row.get("ncalib")?,
        ncalper: row.get("ncalper")?,
        resp_dir: row.get("resp_dir")?,
        dfile: row.get("dfile")?,
        rsptype: row.get("rsptype")?,
        response_id: row.get("response_id")?,
        load_date: row.get("load_date")?,
    })
}
