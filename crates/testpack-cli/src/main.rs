//! testpack CLI entry point.

use clap::Parser;
use miette::Result;
use testpack_cli::{cli, commands, error, logger};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let use_color = logger::should_use_colors(args.no_color);
    console::set_colors_enabled_stderr(use_color);
    logger::init_logger(args.verbose, args.quiet, use_color);

    commands::bundle_execute(args)
        .await
        .map_err(error::cli_error_to_miette)
}
