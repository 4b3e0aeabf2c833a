//! # flowgate-events
//!
//! A command-line tool for inspecting and transforming binary flow-cytometry
//! event files.
//!
//! ## Usage
//!
//! ```bash
//! # Inspect a file header
//! flowgate-events info events.fgbe
//!
//! # Keep the first 5000 events of every parameter
//! flowgate-events truncate events.fgbe small.fgbe -n 5000
//!
//! # Remove spillover using a matrix from the config file
//! flowgate-events --config panel.toml compensate events.fgbe comp.fgbe
//!
//! # Generate demo data
//! flowgate-events demo demo_events.fgbe
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
