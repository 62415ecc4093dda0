//! Relationship lookups against the catalog
//!
//! A lookup walks the chain one hop at a time (Station ↔ Sitechan ↔ Sensor ↔
//! Instrument) inside a single connection. Each hop query returns the reached
//! ids together with the validity columns used to filter them, so the date
//! predicates live in [`Validity`] rather than in SQL.

use super::CatalogStore;
use crate::app::models::{DateInterval, EntityKind, EpochInterval, Id, Validity};
use crate::app::services::resolver::RelationshipResolver;
use crate::app::services::selection::IdSet;
use crate::constants::MAX_IN_LIST_PARAMS;
use crate::{Error, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, Row, params_from_iter};
use tracing::debug;

/// Which columns carry the validity of the reached row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Window {
    /// on_date, off_date
    Dates,
    /// time, endtime
    Epoch,
}

/// One edge of the chain
#[derive(Debug, Clone, Copy)]
struct Hop {
    /// SELECT with an `{ids}` placeholder for the IN-list
    sql: &'static str,
    window: Window,
}

impl Hop {
    /// Query for the step `from` → `to`; `None` when the kinds are not neighbours
    fn between(from: EntityKind, to: EntityKind) -> Option<Hop> {
        use EntityKind::*;

        let (sql, window) = match (from, to) {
            (Station, Sitechan) => (
                "SELECT id, on_date, off_date FROM sitechan \
                 WHERE station_id IN ({ids}) ORDER BY id",
                Window::Dates,
            ),
            (Sitechan, Station) => (
                "SELECT DISTINCT st.id, st.on_date, st.off_date FROM station st \
                 JOIN sitechan sc ON sc.station_id = st.id \
                 WHERE sc.id IN ({ids}) ORDER BY st.id",
                Window::Dates,
            ),
            (Sitechan, Sensor) => (
                "SELECT id, time, endtime FROM sensor \
                 WHERE sitechan_id IN ({ids}) ORDER BY id",
                Window::Epoch,
            ),
            (Sensor, Sitechan) => (
                "SELECT DISTINCT sc.id, sc.on_date, sc.off_date FROM sitechan sc \
                 JOIN sensor se ON se.sitechan_id = sc.id \
                 WHERE se.id IN ({ids}) ORDER BY sc.id",
                Window::Dates,
            ),
            // Instruments have no window of their own: filter on the linking sensor
            (Sensor, Instrument) => (
                "SELECT instrument_id, time, endtime FROM sensor \
                 WHERE id IN ({ids}) ORDER BY instrument_id",
                Window::Epoch,
            ),
            (Instrument, Sensor) => (
                "SELECT id, time, endtime FROM sensor \
                 WHERE instrument_id IN ({ids}) ORDER BY id",
                Window::Epoch,
            ),
            _ => return None,
        };
        Some(Hop { sql, window })
    }

    /// Query for every row of `kind` with its validity
    fn all(kind: EntityKind) -> Hop {
        let (sql, window) = match kind {
            EntityKind::Station => (
                "SELECT id, on_date, off_date FROM station ORDER BY id",
                Window::Dates,
            ),
            EntityKind::Sitechan => (
                "SELECT id, on_date, off_date FROM sitechan ORDER BY id",
                Window::Dates,
            ),
            EntityKind::Sensor => (
                "SELECT id, time, endtime FROM sensor ORDER BY id",
                Window::Epoch,
            ),
            EntityKind::Instrument => (
                "SELECT instrument_id, time, endtime FROM sensor ORDER BY instrument_id",
                Window::Epoch,
            ),
        };
        Hop { sql, window }
    }
}

impl RelationshipResolver for CatalogStore {
    fn query_related(
        &self,
        source: EntityKind,
        target: EntityKind,
        ids: &IdSet,
        at: Option<NaiveDate>,
    ) -> Result<IdSet> {
        let conn = self.connect()?;

        let mut kind = source;
        let mut current = ids.clone();
        for next in source.path_to(target) {
            let hop = Hop::between(kind, next).ok_or_else(|| Error::unsupported_lookup(kind))?;
            current = follow(&conn, hop, &current, at)
                .map_err(|e| Error::storage_query(format!("{} → {} lookup failed", kind, next), e))?;

            debug!("Hop {} → {}: {} ids", kind, next, current.len());
            kind = next;
            if current.is_empty() {
                break;
            }
        }
        Ok(current)
    }

    fn all_ids(&self, kind: EntityKind, at: NaiveDate) -> Result<IdSet> {
        let conn = self.connect()?;
        let hop = Hop::all(kind);

        let mut stmt = conn
            .prepare_cached(hop.sql)
            .map_err(|e| Error::storage_query(format!("Failed to list {} ids", kind), e))?;
        let rows = stmt
            .query_map([], |row| read_validity(row, hop.window))
            .map_err(|e| Error::storage_query(format!("Failed to list {} ids", kind), e))?;

        let mut valid = IdSet::new();
        for row in rows {
            let (id, validity) =
                row.map_err(|e| Error::storage_query(format!("Bad {} row", kind), e))?;
            if validity.contains(at) {
                valid.insert(id);
            }
        }

        debug!("{} valid {} ids on {}", valid.len(), kind, at);
        Ok(valid)
    }
}

/// Run one hop for `ids`, in IN-list chunks, keeping rows valid on `at`
fn follow(
    conn: &Connection,
    hop: Hop,
    ids: &IdSet,
    at: Option<NaiveDate>,
) -> rusqlite::Result<IdSet> {
    let mut reached = IdSet::new();

    for chunk in ids.as_slice().chunks(MAX_IN_LIST_PARAMS) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = hop.sql.replace("{ids}", &placeholders);

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
            read_validity(row, hop.window)
        })?;

        for row in rows {
            let (id, validity) = row?;
            if validity.valid_at(at) {
                reached.insert(id);
            }
        }
    }

    Ok(reached)
}

fn read_validity(row: &Row<'_>, window: Window) -> rusqlite::Result<(Id, Validity)> {
    let id: Id = row.get(0)?;
    let validity = match window {
        Window::Dates => Validity::Dates(DateInterval {
            on_date: row.get(1)?,
            off_date: row.get(2)?,
        }),
        Window::Epoch => Validity::Epoch(EpochInterval::from_raw(row.get(1)?, row.get(2)?)),
    };
    Ok((id, validity))
}
