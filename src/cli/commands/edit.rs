//! Edit command implementations: add-station, add-instrument, connect-instrument
//!
//! Each command stages its rows and pushes them in one transaction, or with
//! `--dry-run` prints what would be committed.

use super::shared::{emit, open_catalog, to_json};
use crate::app::models::{Response, ResponseKind};
use crate::app::services::catalog::CatalogStore;
use crate::app::services::staging::{
    ConnectInstrument, InstrumentDraft, PushReport, StagedRow, StagingArea, StationDraft,
};
use crate::cli::args::{AddInstrumentArgs, AddStationArgs, ConnectInstrumentArgs, OutputFormat};
use crate::config::Config;
use crate::constants::DEFAULT_RESPONSE_DIR;
use crate::{Error, Result};
use colored::*;
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

pub fn run_add_station(args: AddStationArgs, format: OutputFormat, config: &Config) -> Result<()> {
    let store = open_catalog(config)?;
    let dry_run = args.dry_run;

    let draft = station_draft(args);
    if store.station_exists(&draft.network, &draft.station_code)? {
        return Err(Error::data_validation(format!(
            "Station {}.{} already exists in the catalog",
            draft.network, draft.station_code
        )));
    }

    let mut staging = StagingArea::new();
    staging.stage_station(draft)?;
    finish(&store, staging, dry_run, format)
}

pub fn run_add_instrument(
    args: AddInstrumentArgs,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    args.validate()?;
    let store = open_catalog(config)?;
    let dry_run = args.dry_run;

    let response = match &args.response_file {
        Some(path) => Some(read_response(path)?),
        None => None,
    };
    let draft = instrument_draft(args, response.as_ref())?;

    let mut staging = StagingArea::new();
    staging.stage_instrument(draft, response)?;
    finish(&store, staging, dry_run, format)
}

pub fn run_connect_instrument(
    args: ConnectInstrumentArgs,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    let store = open_catalog(config)?;
    let station = store.station(args.station_id)?;
    let instrument = store.instrument(args.instrument_id)?;
    info!(
        "Connecting {} to {}.{} at {}",
        instrument.instrument_name, station.network, station.station_code, args.on_time.0
    );

    let dry_run = args.dry_run;
    let request = connect_request(args);

    let mut staging = StagingArea::new();
    let count = staging.connect_instrument(&request, &instrument)?;
    debug!("Staged {} channels", count);
    finish(&store, staging, dry_run, format)
}

// =============================================================================
// Draft Construction
// =============================================================================

fn station_draft(args: AddStationArgs) -> StationDraft {
    StationDraft {
        network: args.network.trim().to_uppercase(),
        station_code: args.station_code.trim().to_uppercase(),
        station_name: args.station_name.trim().to_string(),
        on_date: args.on_date,
        latitude: args.latitude,
        longitude: args.longitude,
        elevation: args.elevation,
        station_type: args.station_type.trim().to_lowercase(),
        reference_station: args.reference_station.map(|r| r.trim().to_uppercase()),
        north_offset: args.north_offset,
        east_offset: args.east_offset,
    }
}

/// Build the instrument draft, taking dfile and rsptype from the response when not given
fn instrument_draft(args: AddInstrumentArgs, response: Option<&Response>) -> Result<InstrumentDraft> {
    let dfile = match (args.dfile, response) {
        (Some(dfile), _) => dfile,
        (None, Some(response)) => response.file_name.clone(),
        (None, None) => {
            return Err(Error::configuration(
                "Either --response or --dfile must be given".to_string(),
            ));
        }
    };
    let rsptype = match (args.rsptype, response) {
        (Some(rsptype), _) => rsptype.to_lowercase(),
        (None, Some(response)) => response.kind.format_name().to_string(),
        (None, None) => {
            warn!("No response type given, assuming paz");
            "paz".to_string()
        }
    };

    Ok(InstrumentDraft {
        instrument_name: args.instrument_name.trim().to_string(),
        instrument_type: args.instrument_type.trim().to_string(),
        band: args.band.trim().to_lowercase(),
        digital: args.digital.trim().to_lowercase(),
        samprate: args.samprate,
        ncalib: args.ncalib,
        ncalper: args.ncalper,
        resp_dir: DEFAULT_RESPONSE_DIR.to_string(),
        dfile,
        rsptype,
    })
}

fn connect_request(args: ConnectInstrumentArgs) -> ConnectInstrument {
    ConnectInstrument {
        station_id: args.station_id,
        instrument_id: args.instrument_id,
        channels: args.channels.channels,
        on_time: args.on_time.0,
        emplacement_depth: args.emplacement_depth,
        description: args.description.trim().to_string(),
        tshift: args.tshift,
        instant: args.instant.trim().to_lowercase(),
        calratio: args.calratio,
        calper: args.calper,
    }
}

/// Read a JSON response document
pub fn read_response(path: &Path) -> Result<Response> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::io(
            format!("Failed to read response file {}", path.display()),
            e,
        )
    })?;
    let response: Response = serde_json::from_str(&content).map_err(|e| {
        Error::serialization(format!("Invalid response document {}", path.display()), e)
    })?;

    let size = match &response.kind {
        ResponseKind::Paz { poles, zeros, .. } => poles.len() + zeros.len(),
        ResponseKind::Fap { points } => points.len(),
    };
    debug!(
        "Read {} response {} ({} values) from {}",
        response.kind.format_name(),
        response.file_name,
        size,
        path.display()
    );
    Ok(response)
}

// =============================================================================
// Commit and Report
// =============================================================================

fn finish(
    store: &CatalogStore,
    mut staging: StagingArea,
    dry_run: bool,
    format: OutputFormat,
) -> Result<()> {
    if dry_run {
        info!("Dry run: {} rows staged, nothing committed", staging.len());
        return emit(
            format,
            || Ok(human_staged(staging.rows())),
            || {
                to_json(
                    &json!({ "dry_run": true, "rows": staging.rows() }),
                    "staged rows",
                )
            },
        );
    }

    let report = staging.push(store)?;
    emit(
        format,
        || Ok(human_pushed(&report)),
        || {
            to_json(
                &json!({ "dry_run": false, "committed": report }),
                "push report",
            )
        },
    )
}

fn human_staged(rows: &[StagedRow]) -> String {
    let mut output = format!(
        "{}\n",
        format!("Dry run: {} rows staged, nothing committed", rows.len())
            .bright_yellow()
            .bold()
    );
    for (index, row) in rows.iter().enumerate() {
        let summary = match row {
            StagedRow::Station(s) => format!(
                "{}.{} {} from {} at ({}, {})",
                s.network, s.station_code, s.station_name, s.on_date, s.latitude, s.longitude
            ),
            StagedRow::Instrument(i) => format!(
                "{} ({}) band {} {} Hz, response {} [{}]",
                i.instrument_name, i.instrument_type, i.band, i.samprate, i.dfile, i.rsptype
            ),
            StagedRow::Response(r) => format!("{} ({})", r.file_name, r.kind.format_name()),
            StagedRow::Channel(c) => format!(
                "station {} channel {} instrument {} from {} (hang {}, vang {})",
                c.station_id,
                c.channel_code,
                c.instrument_id,
                c.on_date,
                c.horizontal_angle,
                c.vertical_angle
            ),
        };
        output.push_str(&format!("  {:>2}. {:<10} {}\n", index + 1, row.label(), summary));
    }
    output
}

fn human_pushed(report: &PushReport) -> String {
    let mut output = format!(
        "{}\n",
        format!("Committed {} rows", report.total_rows())
            .bright_green()
            .bold()
    );
    let groups = [
        ("stations", &report.stations),
        ("responses", &report.responses),
        ("instruments", &report.instruments),
        ("sitechans", &report.sitechans),
        ("sensors", &report.sensors),
    ];
    for (label, ids) in groups {
        if !ids.is_empty() {
            let listed: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
            output.push_str(&format!("  {:<12} {}\n", label, listed.join(" ")));
        }
    }
    output
}
