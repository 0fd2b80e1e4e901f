//! CLI interface for trendscout
//!
//! Provides subcommands for:
//! - `run`: Continuous scanning loop
//! - `scan`: Single sweep, then exit
//! - `config`: Show effective configuration

mod run;
mod scan;

pub use run::RunArgs;
pub use scan::ScanArgs;

use crate::config::Mode;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "trendscout")]
#[command(about = "Adaptive crypto signal scanner for KuCoin spot markets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Parameter preset applied on top of the config file
    #[arg(short, long, value_enum, default_value_t = Mode::Balanced)]
    pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scanning loop until interrupted
    Run(RunArgs),
    /// Run a single sweep and exit
    Scan(ScanArgs),
    /// Show effective configuration
    Config,
}
