//! Command-line interface definition.

use std::path::PathBuf;

use clap::Parser;

/// testpack - bundle JavaScript test files into a single script
#[derive(Parser, Debug, Clone)]
#[command(
    name = "testpack",
    version,
    about = "Bundle JavaScript test files into a single browser-runnable script",
    long_about = "testpack finds the test files under a directory, follows their CommonJS\n\
                  `require` graph and writes one self-contained script that runs every\n\
                  test file in order.\n\n\
                  Options are read from testpack.toml, then TESTPACK_* environment\n\
                  variables, then the command line."
)]
pub struct Cli {
    /// Directory to search for test files
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Glob selecting test files, relative to DIR
    ///
    /// Defaults to `**/test/test*.js`.
    #[arg(short, long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Glob excluding files and directories (repeatable)
    ///
    /// Replaces the default list (`node_modules/**`, `build/**`, `reports/**`).
    #[arg(short, long, value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Write the bundle to FILE instead of stdout
    ///
    /// The parent directory must already exist.
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Package left to the host `require` (repeatable)
    #[arg(short, long, value_name = "NAME")]
    pub external: Vec<String>,

    /// Path to a config file (default: ./testpack.toml when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}
