//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// countfire -- count keys in log lines and fire actions on thresholds.
///
/// Use `countfire <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "countfire", version, about, long_about = None)]
pub struct Cli {
    /// Path to the countfire.toml configuration file.
    ///
    /// When omitted, `./countfire.toml` is used if it exists, otherwise built-in defaults.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Count the input, then evaluate rules and fire actions.
    Run(RunArgs),

    /// Count the input and print the counters only.
    Report(ReportArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- run ----

/// Count the input, then fire rules against the final counters.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Read log lines from this file instead of stdin.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// List the keys that would fire without preparing or executing actions.
    #[arg(long)]
    pub dry_run: bool,
}

// ---- report ----

/// Count the input and print per-node counters.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Read log lines from this file instead of stdin.
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

// ---- config ----

/// Manage countfire configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, parser, rules, actions).
        #[arg(long)]
        section: Option<String>,
    },
}
