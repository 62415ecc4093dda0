use anyhow::Context;
use clap::{CommandFactory, Parser};
use stationtool::cli::{args::Args, commands};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and exit
    let Some(name) = args.command.as_ref().map(|command| command.name()) else {
        if let Err(error) = Args::command().print_help() {
            eprintln!("Error: {}", error);
            process::exit(1);
        }
        println!();
        process::exit(0);
    };

    let result = commands::run(args).with_context(|| format!("{} command failed", name));

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            // Print the whole cause chain to stderr
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
