//! Entry file discovery.
//!
//! Walks the bundled directory through the runtime and keeps the files whose
//! path relative to the root matches the entry glob.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::options::CompiledPatterns;
use crate::runtime::{Runtime, RuntimeError};
use crate::{Error, Result};

/// Collect the entry files under `root`, sorted.
///
/// Directories matching an ignore glob are not descended into.
pub(crate) async fn collect_entries(
    root: &Path,
    patterns: &CompiledPatterns,
    runtime: &dyn Runtime,
) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    let mut pending = vec![(root.to_path_buf(), String::new())];

    while let Some((dir, relative_dir)) = pending.pop() {
        let names = runtime.read_dir(&dir).await.map_err(|source| Error::Read {
            path: dir.clone(),
            source,
        })?;

        for name in names {
            let path = dir.join(&name);
            let relative = if relative_dir.is_empty() {
                name
            } else {
                format!("{}/{}", relative_dir, name)
            };

            let metadata = match runtime.metadata(&path).await {
                Ok(metadata) => metadata,
                // Dangling symlinks and entries removed mid-walk
                Err(RuntimeError::FileNotFound(_)) => {
                    debug!("skipping unreadable entry {}", relative);
                    continue;
                }
                Err(source) => return Err(Error::Read { path, source }),
            };

            if metadata.is_dir {
                if patterns.prunes_dir(&relative) {
                    debug!("skipping ignored directory {}", relative);
                    continue;
                }
                pending.push((path, relative));
            } else if metadata.is_file && patterns.is_entry(&relative) {
                debug!("entry {}", relative);
                entries.push(path);
            }
        }
    }

    entries.sort();
    Ok(entries)
}
