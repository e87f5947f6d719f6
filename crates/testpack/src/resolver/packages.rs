//! `node_modules` package resolution.

use std::path::{Path, PathBuf};

use path_clean::PathClean;
use serde::Deserialize;

use super::extensions::{resolve_with_extensions, try_index_files};
use crate::runtime::Runtime;

/// The `package.json` fields that select a package's entry file.
#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    /// Browser builds win over `main`; only the string form is honoured.
    #[serde(default)]
    browser: Option<serde_json::Value>,
    #[serde(default)]
    main: Option<String>,
}

impl PackageJson {
    fn entry(&self) -> Option<&str> {
        match &self.browser {
            Some(serde_json::Value::String(browser)) => Some(browser.as_str()),
            _ => self.main.as_deref(),
        }
    }
}

/// Split `@scope/name/sub/path` into `("@scope/name", Some("sub/path"))`.
pub fn split_package_specifier(specifier: &str) -> (&str, Option<&str>) {
    let name_len = if specifier.starts_with('@') {
        specifier
            .match_indices('/')
            .nth(1)
            .map(|(idx, _)| idx)
            .unwrap_or(specifier.len())
    } else {
        specifier.find('/').unwrap_or(specifier.len())
    };

    let (name, rest) = specifier.split_at(name_len);
    let subpath = rest.strip_prefix('/').filter(|s| !s.is_empty());
    (name, subpath)
}

/// Look up a bare specifier in `node_modules`, walking up from `from_dir`.
pub async fn resolve_package(
    specifier: &str,
    from_dir: &Path,
    runtime: &dyn Runtime,
) -> Option<PathBuf> {
    let (name, subpath) = split_package_specifier(specifier);

    let mut current = Some(from_dir);
    while let Some(dir) = current {
        let package_dir = dir.join("node_modules").join(name);
        if runtime.exists(&package_dir) {
            let found = match subpath {
                Some(subpath) => resolve_with_extensions(&package_dir.join(subpath), runtime).await,
                None => resolve_package_entry(&package_dir, runtime).await,
            };
            if found.is_some() {
                return found;
            }
        }
        current = dir.parent();
    }

    None
}

async fn resolve_package_entry(package_dir: &Path, runtime: &dyn Runtime) -> Option<PathBuf> {
    let manifest = package_dir.join("package.json");
    if let Ok(bytes) = runtime.read_file(&manifest).await {
        // A malformed manifest falls through to the index files, as Node does
        let package: PackageJson = serde_json::from_slice(&bytes).unwrap_or_default();
        if let Some(entry) = package.entry() {
            let candidate = package_dir.join(entry).clean();
            if let Some(found) = resolve_with_extensions(&candidate, runtime).await {
                return Some(found);
            }
        }
    }
    try_index_files(package_dir, runtime).await
}
