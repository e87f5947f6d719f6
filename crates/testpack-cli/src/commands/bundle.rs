//! The bundle command.

use std::io::Write;
use std::time::Instant;

use testpack::{BundleOutput, NativeRuntime, Runtime};
use tracing::debug;

use crate::cli::Cli;
use crate::error::Result;
use crate::{config, ui};

/// Bundle `args.dir` and write the result to stdout or `--out`.
pub async fn execute(args: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let options = config::load(&args, &cwd)?;
    debug!("options: {:?}", options);

    let start = Instant::now();
    match testpack::bundle(&args.dir, options).await? {
        BundleOutput::Code(code) => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&code)?;
            stdout.flush()?;
        }
        BundleOutput::Written(path) => {
            if !args.quiet {
                let size = NativeRuntime::new(&cwd)
                    .metadata(&path)
                    .await
                    .map(|m| m.size)
                    .unwrap_or(0);
                ui::success(&format!(
                    "Bundled {} into {} ({}) in {}",
                    args.dir.display(),
                    path.display(),
                    ui::format_size(size),
                    ui::format_duration(start.elapsed())
                ));
            }
        }
    }

    Ok(())
}
