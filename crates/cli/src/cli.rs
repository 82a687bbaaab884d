//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// wm-node - world-model monitoring node front end
#[derive(Parser, Debug)]
#[command(
    name = "wm-node",
    author,
    version,
    about = "Monitoring node: frame sources, run scheduler and event log",
    long_about = "Drives a fixed-rate run loop over a synthetic or recorded LiDAR frame\n\
                  source and writes a structured JSONL event log for every run.\n\n\
                  Each run is stamped with configuration and calibration fingerprints."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "WM_NODE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "WM_NODE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a run
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration summary and fingerprints
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "node.toml", env = "WM_NODE_CONFIG")]
    pub config: PathBuf,

    /// Override `output.out_dir`
    #[arg(long, env = "WM_NODE_OUT_DIR")]
    pub out_dir: Option<PathBuf>,

    /// Override `input.max_ticks` (0 = unlimited)
    #[arg(long, env = "WM_NODE_MAX_TICKS")]
    pub max_ticks: Option<i64>,

    /// Override `input.max_run_s` (0 = unlimited)
    #[arg(long, env = "WM_NODE_MAX_RUN_S")]
    pub max_run_s: Option<f64>,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Also log every event through tracing
    #[arg(long)]
    pub mirror_events: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "WM_NODE_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "node.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "node.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
