//! Module resolution.
//!
//! Node-style resolution of `require` specifiers:
//! 1. Explicit externals are left to the host
//! 2. Relative and absolute paths, with extension and index fallbacks
//! 3. Bare specifiers through `node_modules`, nearest directory first

mod extensions;
mod packages;

pub use extensions::{EXTENSIONS, resolve_with_extensions, try_extensions, try_index_files};
pub use packages::{resolve_package, split_package_specifier};

use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::runtime::Runtime;
use crate::{Error, Result};

/// Outcome of resolving a specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A file to bundle
    Local(PathBuf),
    /// Left to the host `require`
    External(String),
}

/// Check if a specifier is explicitly marked as external.
///
/// `react` matches `react` and `react/jsx-runtime`, not `react-dom`.
pub fn is_external(specifier: &str, external: &[String]) -> bool {
    external.iter().any(|ext| {
        specifier == ext
            || specifier
                .strip_prefix(ext.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// Module resolver.
#[derive(Debug, Clone, Default)]
pub struct ModuleResolver {
    external: Vec<String>,
}

impl ModuleResolver {
    pub fn new(external: Vec<String>) -> Self {
        Self { external }
    }

    /// Resolve `specifier` as required from the file `from`.
    pub async fn resolve(
        &self,
        specifier: &str,
        from: &Path,
        runtime: &dyn Runtime,
    ) -> Result<Resolved> {
        if is_external(specifier, &self.external) {
            return Ok(Resolved::External(specifier.to_string()));
        }

        let from_dir = from.parent().unwrap_or(Path::new(""));
        let found = if is_path_specifier(specifier) {
            let candidate = from_dir.join(specifier).clean();
            if names_directory(specifier) {
                try_index_files(&candidate, runtime).await
            } else {
                resolve_with_extensions(&candidate, runtime).await
            }
        } else {
            resolve_package(specifier, from_dir, runtime).await
        };

        found.map(Resolved::Local).ok_or_else(|| Error::Unresolved {
            specifier: specifier.to_string(),
            from: from.to_path_buf(),
        })
    }
}

fn is_path_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || Path::new(specifier).is_absolute()
}

/// `.`, `..` and specifiers ending in `/` only ever name a directory.
fn names_directory(specifier: &str) -> bool {
    specifier == "." || specifier == ".." || specifier.ends_with('/')
}
