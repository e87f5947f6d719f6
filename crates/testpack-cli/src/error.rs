//! Error handling for the testpack CLI.
//!
//! `CliError` wraps the library error, configuration failures and I/O on the
//! output streams. [`cli_error_to_miette`] turns it into a report for `main`.

use std::path::PathBuf;

use miette::Report;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors from the bundler
    #[error(transparent)]
    Bundle(#[from] testpack::Error),

    /// I/O errors, e.g. writing the bundle to stdout
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file given with `--config` doesn't exist
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The merged configuration could not be extracted
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Bundle(e) => Report::new(e),
        CliError::Config(ConfigError::NotFound(path)) => miette::miette!(
            code = "CONFIG_NOT_FOUND",
            help = "Create the file or drop --config to use ./testpack.toml",
            "Config file not found: {}",
            path.display()
        ),
        CliError::Config(e) => miette::miette!(
            code = "INVALID_CONFIG",
            help = "Check testpack.toml and TESTPACK_* variables for field names and types",
            "{}",
            e
        ),
        CliError::Io(e) => miette::miette!("I/O error: {}", e),
    }
}
