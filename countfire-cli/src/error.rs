//! CLI-specific error types and exit code mapping

use std::path::PathBuf;

use countfire_core::error::{ActionError, CountfireError};
use countfire_engine::EngineError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The input file could not be opened.
    #[error("cannot read input {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdin read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from countfire-core.
    #[error("{0}")]
    Core(#[from] CountfireError),

    /// Parser tree / rule engine error.
    #[error("{0}")]
    Engine(#[from] EngineError),

    /// Action prepare or execute error.
    #[error("action error: {0}")]
    Action(#[from] ActionError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                                  |
    /// |------|----------------------------------------------------------|
    /// | 0    | Success                                                  |
    /// | 1    | General / command error                                  |
    /// | 2    | Configuration error (incl. pattern compile, prepare)     |
    /// | 3    | Action execution failed (incl. execute before prepare)   |
    /// | 10   | IO error                                                 |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Command(_) | Self::JsonSerialize(_) => 1,
            Self::Input { .. } | Self::Io(_) => 10,
            Self::Action(e) => action_exit_code(e),
            Self::Engine(EngineError::Action(e)) => action_exit_code(e),
            Self::Engine(EngineError::Io(_)) => 10,
            Self::Engine(_) => 2,
            Self::Core(CountfireError::Action(e)) => action_exit_code(e),
            Self::Core(CountfireError::Io(_)) => 10,
            Self::Core(CountfireError::Config(_) | CountfireError::Engine(_)) => 2,
        }
    }
}

fn action_exit_code(e: &ActionError) -> i32 {
    if e.is_prepare_error() { 2 } else { 3 }
}
