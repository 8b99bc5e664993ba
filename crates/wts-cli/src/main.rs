//! wts-dash - waste transfer station dashboard
//!
//! Loads transfer transactions from a configured source and prints station
//! totals, rankings and recent loads, or exports them to Excel.

mod cli;
mod commands;
mod logging;
mod output;

use clap::Parser;
use cli::Cli;
use logging::{init_logging, LogConfig};

fn main() {
    let cli = Cli::parse();

    init_logging(&LogConfig::from_verbosity(cli.verbose).with_format(cli.log_format));

    if let Err(e) = commands::execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
