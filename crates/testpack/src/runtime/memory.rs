//! In-memory runtime.
//!
//! Holds a virtual file tree. Directories exist implicitly as ancestors of the
//! files added, or explicitly through [`MemoryRuntime::add_dir`].

use async_trait::async_trait;
use parking_lot::RwLock;
use path_clean::PathClean;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};

use super::{FileMetadata, Runtime, RuntimeError, RuntimeResult};

#[derive(Debug, Default)]
struct Tree {
    files: FxHashMap<PathBuf, Vec<u8>>,
    dirs: FxHashSet<PathBuf>,
}

impl Tree {
    fn insert_ancestors(&mut self, path: &Path) {
        let mut current = path.parent();
        while let Some(dir) = current {
            if !self.dirs.insert(dir.to_path_buf()) {
                break;
            }
            current = dir.parent();
        }
    }
}

/// Runtime backed by an in-memory file tree.
#[derive(Debug)]
pub struct MemoryRuntime {
    tree: RwLock<Tree>,
    cwd: PathBuf,
}

impl Default for MemoryRuntime {
    fn default() -> Self {
        Self::new("/")
    }
}

impl MemoryRuntime {
    /// Create an empty runtime. Relative paths are resolved against `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        let cwd = cwd.into().clean();
        let mut tree = Tree::default();
        tree.dirs.insert(cwd.clone());
        tree.insert_ancestors(&cwd);
        Self {
            tree: RwLock::new(tree),
            cwd,
        }
    }

    /// Add (or replace) a file, creating its ancestor directories
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = self.normalize(path.as_ref());
        let mut tree = self.tree.write();
        tree.insert_ancestors(&path);
        tree.files.insert(path, content.into());
    }

    /// Add an empty directory
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize(path.as_ref());
        let mut tree = self.tree.write();
        tree.insert_ancestors(&path);
        tree.dirs.insert(path);
    }

    /// Contents of a file, if present
    pub fn file(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let path = self.normalize(path.as_ref());
        self.tree.read().files.get(&path).cloned()
    }

    fn normalize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.clean()
        } else {
            self.cwd.join(path).clean()
        }
    }
}

#[async_trait]
impl Runtime for MemoryRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let normalized = self.normalize(path);
        self.tree
            .read()
            .files
            .get(&normalized)
            .cloned()
            .ok_or(RuntimeError::FileNotFound(normalized))
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        let normalized = self.normalize(path);
        let mut tree = self.tree.write();

        let parent_exists = normalized
            .parent()
            .is_some_and(|parent| tree.dirs.contains(parent));
        if !parent_exists {
            return Err(RuntimeError::Io(format!(
                "Failed to write {}: parent directory does not exist",
                normalized.display()
            )));
        }
        if tree.dirs.contains(&normalized) {
            return Err(RuntimeError::Io(format!(
                "Failed to write {}: is a directory",
                normalized.display()
            )));
        }

        tree.files.insert(normalized, content.to_vec());
        Ok(())
    }

    async fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        let normalized = self.normalize(path);
        let tree = self.tree.read();

        if let Some(content) = tree.files.get(&normalized) {
            return Ok(FileMetadata {
                size: content.len() as u64,
                is_dir: false,
                is_file: true,
            });
        }
        if tree.dirs.contains(&normalized) {
            return Ok(FileMetadata {
                size: 0,
                is_dir: true,
                is_file: false,
            });
        }
        Err(RuntimeError::FileNotFound(normalized))
    }

    fn exists(&self, path: &Path) -> bool {
        let normalized = self.normalize(path);
        let tree = self.tree.read();
        tree.files.contains_key(&normalized) || tree.dirs.contains(&normalized)
    }

    async fn read_dir(&self, path: &Path) -> RuntimeResult<Vec<String>> {
        let normalized = self.normalize(path);
        let tree = self.tree.read();
        if !tree.dirs.contains(&normalized) {
            return Err(RuntimeError::FileNotFound(normalized));
        }

        let children = tree
            .files
            .keys()
            .chain(tree.dirs.iter())
            .filter(|p| p.parent() == Some(normalized.as_path()))
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .map(str::to_string);

        let mut names: Vec<String> = children.collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        Ok(self.cwd.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_files_imply_directories() {
        let runtime = MemoryRuntime::new("/project");
        runtime.add_file("test/test.js", "x");

        assert!(runtime.exists(Path::new("/project/test")));
        let meta = runtime.metadata(Path::new("test")).await.unwrap();
        assert!(meta.is_dir);

        let names = runtime.read_dir(Path::new("/project")).await.unwrap();
        assert_eq!(names, vec!["test".to_string()]);
    }

    #[tokio::test]
    async fn test_write_requires_parent() {
        let runtime = MemoryRuntime::new("/project");

        runtime
            .write_file(Path::new("bundle.js"), b"ok")
            .await
            .unwrap();
        assert_eq!(runtime.file("/project/bundle.js"), Some(b"ok".to_vec()));

        let err = runtime
            .write_file(Path::new("missing/bundle.js"), b"nope")
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Io(_)));
    }

    #[tokio::test]
    async fn test_relative_and_absolute_paths_agree() {
        let runtime = MemoryRuntime::new("/project");
        runtime.add_file("./lib/../index.js", "content");

        let content = runtime
            .read_file(Path::new("/project/index.js"))
            .await
            .unwrap();
        assert_eq!(content, b"content");
    }
}
