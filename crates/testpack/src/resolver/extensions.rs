//! Extension and index file resolution.

use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// Extensions tried, in order, when a specifier names no existing file.
pub const EXTENSIONS: &[&str] = &["js", "json"];

async fn is_file(path: &Path, runtime: &dyn Runtime) -> bool {
    runtime.exists(path)
        && runtime
            .metadata(path)
            .await
            .map(|metadata| metadata.is_file)
            .unwrap_or(false)
}

/// Try the path as-is, then with each extension appended.
pub async fn try_extensions(base_path: &Path, runtime: &dyn Runtime) -> Option<PathBuf> {
    if is_file(base_path, runtime).await {
        return Some(base_path.to_path_buf());
    }

    // Appended rather than replaced: `./add.spec` must find `add.spec.js`
    for ext in EXTENSIONS {
        let mut with_ext = base_path.as_os_str().to_owned();
        with_ext.push(".");
        with_ext.push(ext);
        let with_ext = PathBuf::from(with_ext);
        if is_file(&with_ext, runtime).await {
            return Some(with_ext);
        }
    }

    None
}

/// Try `index.<ext>` inside a directory.
pub async fn try_index_files(dir_path: &Path, runtime: &dyn Runtime) -> Option<PathBuf> {
    for ext in EXTENSIONS {
        let index = dir_path.join(format!("index.{}", ext));
        if is_file(&index, runtime).await {
            return Some(index);
        }
    }
    None
}

/// Resolve a file or directory path with extension and index fallbacks.
pub async fn resolve_with_extensions(candidate: &Path, runtime: &dyn Runtime) -> Option<PathBuf> {
    if let Some(resolved) = try_extensions(candidate, runtime).await {
        return Some(resolved);
    }
    try_index_files(candidate, runtime).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MemoryRuntime;

    #[tokio::test]
    async fn test_exact_then_extension_then_index() {
        let runtime = MemoryRuntime::new("/p");
        runtime.add_file("add.js", "");
        runtime.add_file("add.spec.js", "");
        runtime.add_file("data.json", "{}");
        runtime.add_file("lib/index.js", "");

        assert_eq!(
            resolve_with_extensions(Path::new("/p/add.js"), &runtime).await,
            Some(PathBuf::from("/p/add.js"))
        );
        assert_eq!(
            resolve_with_extensions(Path::new("/p/add"), &runtime).await,
            Some(PathBuf::from("/p/add.js"))
        );
        assert_eq!(
            resolve_with_extensions(Path::new("/p/add.spec"), &runtime).await,
            Some(PathBuf::from("/p/add.spec.js"))
        );
        assert_eq!(
            resolve_with_extensions(Path::new("/p/data"), &runtime).await,
            Some(PathBuf::from("/p/data.json"))
        );
        assert_eq!(
            resolve_with_extensions(Path::new("/p/lib"), &runtime).await,
            Some(PathBuf::from("/p/lib/index.js"))
        );
        assert_eq!(
            resolve_with_extensions(Path::new("/p/nope"), &runtime).await,
            None
        );
    }
}
