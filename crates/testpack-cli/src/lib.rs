//! testpack CLI - bundle JavaScript test files from the command line.
//!
//! - [`cli`] - argument definitions
//! - [`config`] - layered configuration (`testpack.toml`, `TESTPACK_*`, flags)
//! - [`error`] - CLI errors and their miette reports
//! - [`logger`] - tracing setup
//! - [`ui`] - status messages

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result};
