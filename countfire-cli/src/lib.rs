//! countfire command-line interface
//!
//! - [`cli`]: clap argument definitions
//! - [`commands`]: `run`, `report`, `config` handlers
//! - [`output`]: text / JSON rendering
//! - [`logging`]: tracing subscriber setup (stderr)
//! - [`error`]: CLI errors and exit codes

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
