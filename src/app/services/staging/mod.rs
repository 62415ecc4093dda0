//! Staging area for new catalog rows
//!
//! New stations, instruments, responses and connected channels are validated
//! and held here before they are pushed to the catalog. A push writes every
//! staged row in one transaction and empties the staging area only when that
//! transaction commits.

use crate::app::models::{EntityKind, Id, Instrument, Response};
use crate::app::services::catalog::{CatalogStore, writer};
use crate::{Error, Result};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

pub mod drafts;

#[cfg(test)]
pub mod tests;

pub use drafts::{ChannelDraft, ConnectInstrument, InstrumentDraft, StationDraft, validate_response};

/// One staged row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "row", rename_all = "lowercase")]
pub enum StagedRow {
    Station(StationDraft),
    Instrument(InstrumentDraft),
    Response(Response),
    Channel(ChannelDraft),
}

impl StagedRow {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Station(_) => "station",
            Self::Instrument(_) => "instrument",
            Self::Response(_) => "response",
            Self::Channel(_) => "channel",
        }
    }
}

/// Ids assigned by a successful push
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PushReport {
    pub stations: Vec<Id>,
    pub responses: Vec<Id>,
    pub instruments: Vec<Id>,
    pub sitechans: Vec<Id>,
    pub sensors: Vec<Id>,
}

impl PushReport {
    pub fn total_rows(&self) -> usize {
        self.stations.len()
            + self.responses.len()
            + self.instruments.len()
            + self.sitechans.len()
            + self.sensors.len()
    }
}

/// Validated rows waiting to be committed
#[derive(Debug, Clone, Default)]
pub struct StagingArea {
    rows: Vec<StagedRow>,
}

impl StagingArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[StagedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn stage_station(&mut self, draft: StationDraft) -> Result<()> {
        draft.validate()?;

        let duplicate = self.rows.iter().any(|row| {
            matches!(row, StagedRow::Station(s)
                if s.network == draft.network && s.station_code == draft.station_code)
        });
        if duplicate {
            return Err(Error::data_validation(format!(
                "Station {}.{} is already staged",
                draft.network, draft.station_code
            )));
        }

        debug!("Staged station {}.{}", draft.network, draft.station_code);
        self.rows.push(StagedRow::Station(draft));
        Ok(())
    }

    /// Stage an instrument, optionally with the response it refers to
    pub fn stage_instrument(
        &mut self,
        draft: InstrumentDraft,
        response: Option<Response>,
    ) -> Result<()> {
        draft.validate()?;

        if let Some(response) = &response {
            if !draft.refers_to(response) {
                return Err(Error::data_validation(format!(
                    "Instrument response file '{}' does not match response '{}'",
                    draft.dfile, response.file_name
                )));
            }
            if response.kind.format_name() != draft.rsptype {
                return Err(Error::data_validation(format!(
                    "Instrument response type '{}' does not match response format '{}'",
                    draft.rsptype,
                    response.kind.format_name()
                )));
            }
        }

        if let Some(response) = &response {
            self.check_response(response)?;
        }

        debug!("Staged instrument {}", draft.instrument_name);
        self.rows.push(StagedRow::Instrument(draft));
        if let Some(response) = response {
            debug!("Staged response {}", response.file_name);
            self.rows.push(StagedRow::Response(response));
        }
        Ok(())
    }

    pub fn stage_response(&mut self, response: Response) -> Result<()> {
        self.check_response(&response)?;

        debug!("Staged response {}", response.file_name);
        self.rows.push(StagedRow::Response(response));
        Ok(())
    }

    /// Validate a response and reject a file name that is already staged
    fn check_response(&self, response: &Response) -> Result<()> {
        validate_response(response)?;

        let duplicate = self.rows.iter().any(
            |row| matches!(row, StagedRow::Response(r) if r.file_name == response.file_name),
        );
        if duplicate {
            return Err(Error::data_validation(format!(
                "Response {} is already staged",
                response.file_name
            )));
        }
        Ok(())
    }

    /// Stage the site-channel and sensor pairs that connect `instrument` to a station
    ///
    /// Returns the number of channels staged.
    pub fn connect_instrument(
        &mut self,
        request: &ConnectInstrument,
        instrument: &Instrument,
    ) -> Result<usize> {
        let channels = request.channel_drafts(instrument)?;
        let count = channels.len();

        debug!(
            "Staged {} channels connecting instrument {} to station {}",
            count, request.instrument_id, request.station_id
        );
        self.rows
            .extend(channels.into_iter().map(StagedRow::Channel));
        Ok(count)
    }

    /// Remove one staged row by position
    pub fn remove(&mut self, index: usize) -> Result<StagedRow> {
        if index >= self.rows.len() {
            return Err(Error::data_validation(format!(
                "No staged row at position {} ({} staged)",
                index,
                self.rows.len()
            )));
        }
        Ok(self.rows.remove(index))
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Commit every staged row with today's load date
    pub fn push(&mut self, store: &CatalogStore) -> Result<PushReport> {
        self.push_with_load_date(store, Utc::now().date_naive())
    }

    /// Commit every staged row in one transaction
    ///
    /// Responses are written first so instruments can link to them by file
    /// name, then stations, instruments and connected channels. On any error
    /// nothing is written and the staged rows are kept.
    pub fn push_with_load_date(
        &mut self,
        store: &CatalogStore,
        load_date: NaiveDate,
    ) -> Result<PushReport> {
        if self.rows.is_empty() {
            debug!("Nothing staged, skipping push");
            return Ok(PushReport::default());
        }

        let report = store.transaction(|tx| {
            let mut report = PushReport::default();

            for response in self.responses() {
                if writer::response_id_by_file(tx, &response.file_name)?.is_some() {
                    return Err(Error::data_validation(format!(
                        "Response {} already exists in the catalog",
                        response.file_name
                    )));
                }
                report.responses.push(writer::insert_response(tx, response)?);
            }

            for station in self.stations() {
                if writer::station_exists(tx, &station.network, &station.station_code)? {
                    return Err(Error::data_validation(format!(
                        "Station {}.{} already exists in the catalog",
                        station.network, station.station_code
                    )));
                }
                report
                    .stations
                    .push(writer::insert_station(tx, station, load_date)?);
            }

            for instrument in self.instruments() {
                let response_id = writer::response_id_by_file(tx, &instrument.dfile)?;
                if response_id.is_none() {
                    warn!(
                        "Response file {} of instrument {} is not in the catalog",
                        instrument.dfile, instrument.instrument_name
                    );
                }
                report.instruments.push(writer::insert_instrument(
                    tx,
                    instrument,
                    response_id,
                    load_date,
                )?);
            }

            let mut checked = HashSet::new();
            for channel in self.channels() {
                for (kind, id) in [
                    (EntityKind::Station, channel.station_id),
                    (EntityKind::Instrument, channel.instrument_id),
                ] {
                    if checked.insert((kind, id)) && !writer::entity_exists(tx, kind, id)? {
                        return Err(Error::entity_not_found(kind, id));
                    }
                }
                let (sitechan_id, sensor_id) = writer::insert_channel(tx, channel, load_date)?;
                report.sitechans.push(sitechan_id);
                report.sensors.push(sensor_id);
            }

            Ok(report)
        })?;

        info!(
            "Committed {} staged rows ({} rows written)",
            self.rows.len(),
            report.total_rows()
        );
        self.rows.clear();
        Ok(report)
    }

    fn stations(&self) -> impl Iterator<Item = &StationDraft> {
        self.rows.iter().filter_map(|row| match row {
            StagedRow::Station(draft) => Some(draft),
            _ => None,
        })
    }

    fn instruments(&self) -> impl Iterator<Item = &InstrumentDraft> {
        self.rows.iter().filter_map(|row| match row {
            StagedRow::Instrument(draft) => Some(draft),
            _ => None,
        })
    }

    fn responses(&self) -> impl Iterator<Item = &Response> {
        self.rows.iter().filter_map(|row| match row {
            StagedRow::Response(response) => Some(response),
            _ => None,
        })
    }

    fn channels(&self) -> impl Iterator<Item = &ChannelDraft> {
        self.rows.iter().filter_map(|row| match row {
            StagedRow::Channel(draft) => Some(draft),
            _ => None,
        })
    }
}
