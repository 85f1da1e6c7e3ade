//! CLI argument definitions.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sonar", version, about = "Ultrasonic presence detector")]
pub struct Cli {
    /// Path to config TOML; built-in defaults are used when the file is absent
    #[arg(long, value_name = "FILE", default_value = "etc/sonar.toml")]
    pub config: PathBuf,

    /// Emit JSON lines instead of human-readable output
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging] level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch for intruders at 2 Hz until Ctrl-C
    Run {
        /// Stop after this many measurement cycles
        #[arg(long, value_name = "N")]
        cycles: Option<u64>,
        /// Replay recorded raw echoes (CSV with an `echo_us` column) instead of the scene
        #[arg(long, value_name = "FILE")]
        trace: Option<PathBuf>,
    },
    /// Take one measurement and report whether the sensor answers
    SelfCheck,
}
