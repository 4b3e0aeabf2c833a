use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod compensate;
mod config;
mod demo;
mod info;
mod truncate;

pub use config::Config;

/// flowgate-events - Binary flow-cytometry event file tool
#[derive(Parser)]
#[command(name = "flowgate-events")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the header of a binary event file
    Info {
        /// Input event file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Copy the first events of a file into a new file
    Truncate {
        /// Input event file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output event file path
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Events to keep per parameter (-1 for all, 0 for header only)
        #[arg(short = 'n', long, allow_hyphen_values = true)]
        max_events: i64,
    },

    /// Apply a spillover matrix from the config file
    Compensate {
        /// Input event file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output event file path
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Matrix name in the config (optional when only one is defined)
        #[arg(short, long)]
        matrix: Option<String>,
    },

    /// Generate a synthetic multi-colour event file for testing
    Demo {
        /// Output event file path
        #[arg(value_name = "OUTPUT", default_value = "demo_events.fgbe")]
        output: PathBuf,

        /// Number of events to generate
        #[arg(short = 'e', long, default_value = "10000")]
        events: usize,

        /// Store 64-bit values instead of 32-bit
        #[arg(long)]
        double: bool,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Info { file, json } => info::run(file, json, &config),
        Commands::Truncate {
            input,
            output,
            max_events,
        } => truncate::run(input, output, max_events, &config),
        Commands::Compensate {
            input,
            output,
            matrix,
        } => compensate::run(input, output, matrix, &config),
        Commands::Demo {
            output,
            events,
            double,
        } => demo::run(output, events, double, &config),
    }
}

/// Section heading, bold when colour output is enabled
fn heading(text: &str) -> String {
    #[cfg(feature = "colorized_output")]
    {
        console::style(text).bold().to_string()
    }
    #[cfg(not(feature = "colorized_output"))]
    {
        text.to_string()
    }
}
