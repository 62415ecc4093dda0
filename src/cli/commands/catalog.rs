//! Catalog command implementations: init, list and response

use super::select::replay;
use super::shared::{emit, open_catalog, to_json};
use crate::app::models::{EntityKind, Id};
use crate::app::services::catalog::{CatalogCounts, CatalogStore};
use crate::app::services::selection::IdSet;
use crate::cli::args::{ListArgs, OutputFormat, ResponseArgs};
use crate::config::Config;
use crate::constants::DATE_FORMAT;
use crate::{Error, Result};
use colored::*;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info};

/// Create the catalog tables and report the row counts
pub fn run_init(format: OutputFormat, config: &Config) -> Result<()> {
    let store = CatalogStore::from_config(&config.catalog);
    let existed = store.exists();
    store.init()?;
    let counts = store.counts()?;

    info!(
        "Catalog ready at {} ({} rows)",
        store.path().display(),
        counts.stations + counts.sitechans + counts.sensors + counts.instruments + counts.responses
    );

    emit(
        format,
        || Ok(human_counts(&store, existed, &counts)),
        || {
            to_json(
                &json!({
                    "catalog": store.path(),
                    "created": !existed,
                    "counts": counts,
                }),
                "catalog summary",
            )
        },
    )
}

fn human_counts(store: &CatalogStore, existed: bool, counts: &CatalogCounts) -> String {
    let status = if existed {
        "Catalog already initialized"
    } else {
        "Catalog created"
    };
    format!(
        "{}: {}\n  stations:    {}\n  sitechans:   {}\n  sensors:     {}\n  instruments: {}\n  responses:   {}",
        status.bright_green().bold(),
        store.path().display(),
        counts.stations,
        counts.sitechans,
        counts.sensors,
        counts.instruments,
        counts.responses
    )
}

// =============================================================================
// List
// =============================================================================

/// One listed catalog row
#[derive(Debug, Clone, Serialize)]
pub struct ListedRow {
    #[serde(skip)]
    pub id: Id,
    pub selected: bool,

    #[serde(skip)]
    pub line: String,

    #[serde(flatten)]
    pub fields: Value,
}

/// List the rows of one entity type, marking the selected ones
pub fn run_list(args: ListArgs, format: OutputFormat, config: &Config) -> Result<()> {
    let store = open_catalog(config)?;
    let manager = replay(&store, &args.actions)?;
    let selected = manager.selected(args.kind);

    let mut rows = list_rows(&store, args.kind, selected)?;
    let total = rows.len();
    if args.selected_only {
        rows.retain(|row| row.selected);
    }
    let shown = rows.len();
    if config.display.max_rows > 0 && rows.len() > config.display.max_rows {
        rows.truncate(config.display.max_rows);
    }
    debug!(
        "Listing {} of {} {} rows ({} matched)",
        rows.len(),
        total,
        args.kind.table_name(),
        shown
    );

    emit(
        format,
        || Ok(human_list(args.kind, &rows, shown)),
        || to_json(&rows, "row listing"),
    )
}

/// Catalog rows of `kind` in id order, flagged by membership in `selected`
pub fn list_rows(store: &CatalogStore, kind: EntityKind, selected: &IdSet) -> Result<Vec<ListedRow>> {
    fn row<T: Serialize>(id: Id, selected: &IdSet, line: String, value: &T) -> Result<ListedRow> {
        let fields = serde_json::to_value(value)
            .map_err(|e| Error::serialization(format!("Failed to serialize row {}", id), e))?;
        Ok(ListedRow {
            id,
            selected: selected.contains(id),
            line,
            fields,
        })
    }

    match kind {
        EntityKind::Station => store
            .stations()?
            .iter()
            .map(|s| {
                let line = format!(
                    "{:>6}  {:<3} {:<6} {:<28} {:<24} {:>9.4} {:>10.4}",
                    s.id,
                    s.network,
                    s.station_code,
                    s.station_name,
                    s.validity().to_string(),
                    s.latitude,
                    s.longitude
                );
                row(s.id, selected, line, s)
            })
            .collect(),
        EntityKind::Sitechan => store
            .sitechans()?
            .iter()
            .map(|c| {
                let line = format!(
                    "{:>6}  station {:<6} {:<4} {:<24} {:<2} {}",
                    c.id,
                    c.station_id,
                    c.channel_code,
                    c.validity().to_string(),
                    c.channel_type,
                    c.description
                );
                row(c.id, selected, line, c)
            })
            .collect(),
        EntityKind::Sensor => store
            .sensors()?
            .iter()
            .map(|s| {
                let line = format!(
                    "{:>6}  sitechan {:<6} instrument {:<6} {:<44} calratio {} calper {}",
                    s.id,
                    s.sitechan_id,
                    s.instrument_id,
                    s.validity().to_string(),
                    s.calratio,
                    s.calper
                );
                row(s.id, selected, line, s)
            })
            .collect(),
        EntityKind::Instrument => store
            .instruments()?
            .iter()
            .map(|i| {
                let line = format!(
                    "{:>6}  {:<24} {:<6} {} {} {:>8} Hz  {} ({})",
                    i.id,
                    i.instrument_name,
                    i.instrument_type,
                    i.band,
                    i.digital,
                    i.samprate,
                    i.dfile,
                    i.rsptype
                );
                row(i.id, selected, line, i)
            })
            .collect(),
    }
}

fn human_list(kind: EntityKind, rows: &[ListedRow], matched: usize) -> String {
    let mut output = format!(
        "{} ({} rows)\n",
        format!("{}s", kind.label()).bright_green().bold(),
        matched
    );
    for row in rows {
        if row.selected {
            output.push_str(&format!("{} {}\n", "*".bright_yellow().bold(), row.line.bright_white()));
        } else {
            output.push_str(&format!("  {}\n", row.line));
        }
    }
    if rows.len() < matched {
        output.push_str(&format!(
            "{}\n",
            format!("... {} more rows not shown (display.max_rows)", matched - rows.len()).bright_black()
        ));
    }
    output
}

// =============================================================================
// Response
// =============================================================================

/// Print the response linked to an instrument
pub fn run_response(args: ResponseArgs, format: OutputFormat, config: &Config) -> Result<()> {
    let store = open_catalog(config)?;
    let instrument = store.instrument(args.instrument_id)?;
    let response = store.response_for_instrument(args.instrument_id)?;

    if response.is_none() {
        info!(
            "Instrument {} has no stored response (dfile {})",
            instrument.id, instrument.dfile
        );
    }

    emit(
        format,
        || {
            Ok(match &response {
                Some(response) => format!(
                    "{} {} ({}), loaded {}\n{}",
                    "Instrument".bright_cyan(),
                    instrument.id,
                    instrument.instrument_name,
                    instrument.load_date.format(DATE_FORMAT),
                    response
                ),
                None => format!(
                    "Instrument {} ({}) has no response stored for '{}'",
                    instrument.id, instrument.instrument_name, instrument.dfile
                ),
            })
        },
        || {
            to_json(
                &json!({
                    "instrument": instrument,
                    "response": response,
                }),
                "response report",
            )
        },
    )
}
