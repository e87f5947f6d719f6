//! The bundle operation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use path_clean::PathClean;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::discovery::collect_entries;
use crate::graph::GraphWalker;
use crate::options::BundleOptions;
use crate::pack;
use crate::resolver::ModuleResolver;
use crate::runtime::{NativeRuntime, Runtime};
use crate::{Error, Result};

/// Outcome of a successful bundle call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleOutput {
    /// The bundle bytes (no `out` option)
    Code(Vec<u8>),
    /// The bundle was written to this path
    Written(PathBuf),
}

impl BundleOutput {
    /// Bundle bytes, if they were returned rather than written
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            BundleOutput::Code(code) => Some(code),
            BundleOutput::Written(_) => None,
        }
    }

    /// Consume the output and return the bundle bytes.
    ///
    /// Returns `None` when the bundle was written to disk.
    ///
    /// # Examples
    ///
    /// ```
    /// use testpack::BundleOutput;
    ///
    /// let output = BundleOutput::Code(b"x".to_vec());
    /// assert_eq!(output.into_bytes(), Some(b"x".to_vec()));
    /// ```
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            BundleOutput::Code(code) => Some(code),
            BundleOutput::Written(_) => None,
        }
    }

    /// Whether the bundle went to the `out` path rather than into memory
    pub fn is_written(&self) -> bool {
        matches!(self, BundleOutput::Written(_))
    }

    /// Path the bundle was written to
    pub fn written_path(&self) -> Option<&Path> {
        match self {
            BundleOutput::Written(path) => Some(path),
            BundleOutput::Code(_) => None,
        }
    }
}

/// Bundle the test files under `dir` using the local filesystem.
///
/// Relative paths (`dir` and `options.out`) are resolved against the process
/// working directory.
///
/// # Arguments
///
/// * `dir` - Directory searched for entry files
/// * `options` - Entry pattern, ignore globs, output path and externals
///
/// # Errors
///
/// Invalid arguments fail with [`Error::InvalidArgument`] before any file is
/// read. Afterwards any discovery, parse, resolution or write failure ends
/// the call; nothing is retried.
///
/// # Examples
///
/// ```no_run
/// use testpack::{bundle, BundleOptions};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let output = bundle("./test/fixtures", BundleOptions::new().pattern("index.js")).await?;
/// assert!(!output.is_written());
/// # Ok(()) }
/// ```
pub async fn bundle(dir: impl AsRef<Path>, options: BundleOptions) -> Result<BundleOutput> {
    let dir = dir.as_ref();
    check_dir(dir)?;
    options.validate()?;

    let runtime = NativeRuntime::from_current_dir()?;
    bundle_with_runtime(dir, options, Arc::new(runtime)).await
}

/// Bundle the test files under `dir`, doing all I/O through `runtime`.
///
/// `dir` is resolved against [`Runtime::get_cwd`]. Use a
/// [`MemoryRuntime`](crate::MemoryRuntime) to bundle files that never touch
/// the disk.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use testpack::{bundle_with_runtime, BundleOptions, MemoryRuntime};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> testpack::Result<()> {
/// let runtime = MemoryRuntime::new("/project");
/// runtime.add_file("test/test.js", "require('../lib.js');");
/// runtime.add_file("lib.js", "module.exports = 1;");
///
/// let output = bundle_with_runtime("/project", BundleOptions::default(), Arc::new(runtime)).await?;
/// assert!(output.as_bytes().is_some());
/// # Ok(()) }
/// ```
pub async fn bundle_with_runtime(
    dir: impl AsRef<Path>,
    options: BundleOptions,
    runtime: Arc<dyn Runtime>,
) -> Result<BundleOutput> {
    let dir = dir.as_ref();
    check_dir(dir)?;
    let patterns = options.compile()?;

    let start = Instant::now();
    let root = runtime.get_cwd()?.join(dir).clean();

    match runtime.metadata(&root).await {
        Ok(metadata) if metadata.is_dir => {}
        _ => return Err(Error::NotADirectory(root)),
    }

    let entries = collect_entries(&root, &patterns, runtime.as_ref()).await?;
    if entries.is_empty() {
        return Err(Error::NoEntries {
            pattern: options.pattern,
            root,
        });
    }
    debug!("{} entry file(s) under {}", entries.len(), root.display());

    let walker = GraphWalker::new(ModuleResolver::new(options.external));
    let graph = walker.walk(&entries, runtime.as_ref()).await?;
    let code = pack::emit(&graph);

    info!(
        "Bundled {} module(s) from {} entry file(s) in {:?}",
        graph.len(),
        graph.entries().len(),
        start.elapsed()
    );

    match options.out {
        None => Ok(BundleOutput::Code(code)),
        Some(out) => {
            runtime
                .write_file(&out, &code)
                .await
                .map_err(|source| Error::Write {
                    path: out.clone(),
                    source,
                })?;
            info!("Wrote {} bytes to {}", code.len(), out.display());
            Ok(BundleOutput::Written(out))
        }
    }
}

/// Bundle on the current tokio runtime and report the result to `callback`.
///
/// Invalid arguments are returned directly and the callback is never called.
/// Otherwise the callback is called exactly once, from the spawned task.
///
/// # Example
///
/// ```no_run
/// use testpack::{bundle_with_callback, BundleOptions};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let handle = bundle_with_callback("./lib", BundleOptions::new(), |result| match result {
///     Ok(output) => println!("{} bytes", output.as_bytes().map_or(0, |b| b.len())),
///     Err(err) => eprintln!("{err}"),
/// })?;
/// handle.await?;
/// # Ok(()) }
/// ```
pub fn bundle_with_callback<F>(
    dir: impl AsRef<Path>,
    options: BundleOptions,
    callback: F,
) -> Result<JoinHandle<()>>
where
    F: FnOnce(Result<BundleOutput>) + Send + 'static,
{
    let dir = dir.as_ref().to_path_buf();
    check_dir(&dir)?;
    options.validate()?;

    let handle = Handle::try_current().map_err(|_| {
        Error::InvalidArgument("bundle_with_callback must be called within a tokio runtime".to_string())
    })?;

    Ok(handle.spawn(async move {
        callback(bundle(dir, options).await);
    }))
}

fn check_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Err(Error::InvalidArgument(
            "directory must be a non-empty path".to_string(),
        ));
    }
    Ok(())
}
