//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Used when `--config` is not given; missing is fine, defaults apply.
pub const DEFAULT_CONFIG: &str = "etc/roller_config.toml";

/// Comma-separated raw readings for the simulated feedback ADC.
pub const SIM_RAW_ENV: &str = "ROLLER_SIM_RAW";

#[derive(Parser, Debug)]
#[command(name = "roller", version, about = "Four-channel linear actuator controller")]
pub struct Cli {
    /// Path to config TOML (typed). Defaults to etc/roller_config.toml when present.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Calibration TOML with soft limits for mot0..mot3; enables limit checks
    #[arg(long, value_name = "FILE")]
    pub calibration: Option<PathBuf>,

    /// Log and report as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG takes precedence
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// PWM frequency in Hz for both drive outputs (clamped to 1200)
    #[arg(long, value_name = "HZ")]
    pub speed: Option<u32>,

    /// Use the simulated rig even when built with hardware support
    #[arg(long, action = ArgAction::SetTrue)]
    pub sim: bool,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute one or more XDY commands in order, then exit
    Run {
        /// e.g. 0I2, 7O1.5, 9I0
        #[arg(required = true, value_name = "CMD")]
        commands: Vec<String>,
    },
    /// Interactive loop reading commands from stdin until EOF or ctrl-C
    Shell,
    /// Read and print all four positions once
    Poll,
    /// Open the rig, drive every output low, read all channels, tear down
    SelfCheck,
}
