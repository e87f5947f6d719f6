//! # testpack
//!
//! Bundle a directory of JavaScript test files into a single script that runs
//! without module resolution, e.g. in a browser test runner.
//!
//! Entry files are selected with a glob, their CommonJS dependency graph is
//! followed through `require` calls, and the result is emitted in the
//! browser-pack layout: a small `require` prelude followed by a table of
//! module factories.
//!
//! ## Quick Start
//!
//! ### Bundle into memory
//!
//! ```no_run
//! use testpack::{bundle, BundleOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let output = bundle("./lib", BundleOptions::new().pattern("**/test/*.js")).await?;
//! let code = output.as_bytes().expect("no `out` set");
//! println!("{} bytes", code.len());
//! # Ok(()) }
//! ```
//!
//! ### Write to disk
//!
//! ```no_run
//! use testpack::BundleOptions;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let output = BundleOptions::new()
//!     .pattern("index.js")
//!     .out("build/bundle.js")
//!     .bundle("./test/fixtures")
//!     .await?;
//! assert!(output.is_written());
//! # Ok(()) }
//! ```

pub mod bundle;
pub mod discovery;
pub mod graph;
pub mod options;
pub mod pack;
pub mod parser;
pub mod resolver;
pub mod runtime;

pub use bundle::{BundleOutput, bundle, bundle_with_callback, bundle_with_runtime};
pub use graph::{ModuleGraph, ModuleId, PackedModule};
pub use options::{BundleOptions, DEFAULT_IGNORE, DEFAULT_PATTERN, validate_directory};
pub use runtime::{MemoryRuntime, NativeRuntime, Runtime, RuntimeError};

use std::path::PathBuf;

/// Error types for testpack operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Arguments rejected before any work started.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The bundled path is missing or not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Discovery found nothing to bundle.
    #[error("No files found. Pattern: `{pattern}`. Directory: `{}`", .root.display())]
    NoEntries { pattern: String, root: PathBuf },

    /// A module is not valid JavaScript.
    #[error("Parse error in {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// A JSON module is not valid JSON.
    #[error("Invalid JSON in {}: {message}", .path.display())]
    InvalidJson { path: PathBuf, message: String },

    /// A `require` could not be resolved.
    #[error("Cannot find module '{specifier}' from '{}'", .from.display())]
    Unresolved { specifier: String, from: PathBuf },

    /// Reading a module failed.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    /// Module is over the size limit.
    #[error("File too large: {} is {size} bytes (max: {max} bytes)", .path.display())]
    FileTooLarge { path: PathBuf, size: u64, max: u64 },

    /// The dependency graph is over the module limit.
    #[error("Too many modules: more than {max} reached from the entry files")]
    TooManyModules { max: usize },

    /// Writing the bundle failed.
    #[error("Failed to write bundle to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    /// Error from the runtime.
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Result type alias for testpack operations.
pub type Result<T> = std::result::Result<T, Error>;

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::InvalidArgument(_) => "INVALID_ARGUMENT",
            Error::NotADirectory(_) => "NOT_A_DIRECTORY",
            Error::NoEntries { .. } => "NO_ENTRIES",
            Error::Parse { .. } => "PARSE_ERROR",
            Error::InvalidJson { .. } => "INVALID_JSON",
            Error::Unresolved { .. } => "UNRESOLVED_MODULE",
            Error::Read { .. } => "READ_FAILURE",
            Error::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Error::TooManyModules { .. } => "TOO_MANY_MODULES",
            Error::Write { .. } => "WRITE_FAILURE",
            Error::Runtime(_) => "RUNTIME_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::NoEntries { pattern, .. } => Some(Box::new(format!(
                "Check that '{}' matches files relative to the bundled directory and that they are not excluded by an ignore glob.",
                pattern
            ))),
            Error::Unresolved { specifier, .. } => Some(Box::new(format!(
                "Check the path of '{}', install the package, or mark it external.",
                specifier
            ))),
            Error::Write { path, .. } => Some(Box::new(format!(
                "The parent directory of '{}' must exist and be writable.",
                path.display()
            ))),
            Error::Parse { .. } => Some(Box::new(
                "Modules are parsed as CommonJS scripts; ES module syntax is not supported.",
            )),
            _ => None,
        }
    }
}
