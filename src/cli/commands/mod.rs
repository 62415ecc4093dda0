//! Command implementations for the stationtool CLI
//!
//! Each subcommand lives in its own module:
//! - `catalog`: init, list and response
//! - `select`: scripted selection sessions
//! - `edit`: staging and committing new rows

pub mod catalog;
pub mod edit;
pub mod select;
pub mod shared;

use crate::cli::args::{Args, Commands};
use crate::{Error, Result};
use shared::{load_configuration, log_configuration, setup_logging};
use tracing::debug;

/// Main command runner
///
/// Loads the layered configuration, sets up logging and dispatches to the
/// subcommand handler.
pub fn run(args: Args) -> Result<()> {
    let Args { global, command } = args;
    let command =
        command.ok_or_else(|| Error::configuration("No command given".to_string()))?;

    global.validate()?;
    let config = load_configuration(&global)?;
    setup_logging(&global, &config);
    log_configuration(&global, &config);
    debug!("Running {} command", command.name());

    let format = global.output_format;
    match command {
        Commands::Init => catalog::run_init(format, &config),
        Commands::Select(select_args) => select::run_select(select_args, format, &config),
        Commands::List(list_args) => catalog::run_list(list_args, format, &config),
        Commands::Response(response_args) => {
            catalog::run_response(response_args, format, &config)
        }
        Commands::AddStation(station_args) => {
            edit::run_add_station(station_args, format, &config)
        }
        Commands::AddInstrument(instrument_args) => {
            edit::run_add_instrument(instrument_args, format, &config)
        }
        Commands::ConnectInstrument(connect_args) => {
            edit::run_connect_instrument(connect_args, format, &config)
        }
    }
}
