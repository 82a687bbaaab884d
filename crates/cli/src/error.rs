//! Error types for CLI operations.

use contracts::NodeError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration rejected after CLI overrides were applied
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[source] NodeError),

    /// Run could not be started or failed mid-loop
    #[error("Run failed ({kind}): {source}")]
    Run {
        kind: contracts::ErrorKind,
        #[source]
        source: NodeError,
    },

    /// Scheduler worker thread did not complete
    #[error("Scheduler worker aborted: {message}")]
    Worker { message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Wrap a run failure, keeping its kind for the error message
    pub fn run(source: NodeError) -> Self {
        Self::Run {
            kind: source.kind(),
            source,
        }
    }

    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }
}
