//! Dependency graph walking.
//!
//! Breadth-first traversal from the entry files. Every reachable module is
//! parsed once; ids are assigned after the walk so they only depend on the set
//! of files, not on traversal order.

use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::parser::ModuleParser;
use crate::resolver::{ModuleResolver, Resolved};
use crate::runtime::Runtime;
use crate::{Error, Result};

/// Default maximum number of modules reachable from the entries.
pub const DEFAULT_MAX_MODULES: usize = 100_000;

/// Numeric module id, 1-based.
pub type ModuleId = u32;

/// A module in the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedModule {
    pub id: ModuleId,
    pub path: PathBuf,
    pub source: String,
    /// Bundled `require` specifiers and the ids they resolve to
    pub deps: BTreeMap<String, ModuleId>,
    pub is_entry: bool,
}

/// The modules of a bundle, ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleGraph {
    modules: Vec<PackedModule>,
    entries: Vec<ModuleId>,
}

impl ModuleGraph {
    /// Modules ordered by id
    pub fn modules(&self) -> &[PackedModule] {
        &self.modules
    }

    /// Entry ids in discovery order
    pub fn entries(&self) -> &[ModuleId] {
        &self.entries
    }

    /// Number of modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Look up a module by path
    pub fn module(&self, path: &Path) -> Option<&PackedModule> {
        self.modules.iter().find(|m| m.path == path)
    }
}

struct WalkedModule {
    source: String,
    resolved: Vec<(String, Resolved)>,
}

/// Graph walker that traverses the dependency graph.
#[derive(Debug, Clone)]
pub struct GraphWalker {
    resolver: ModuleResolver,
    parser: ModuleParser,
    max_modules: usize,
}

impl GraphWalker {
    /// Create a walker that resolves `require` calls with `resolver`.
    ///
    /// The module limit starts at [`DEFAULT_MAX_MODULES`].
    pub fn new(resolver: ModuleResolver) -> Self {
        Self {
            resolver,
            parser: ModuleParser,
            max_modules: DEFAULT_MAX_MODULES,
        }
    }

    /// Set the maximum number of modules the walk may reach
    pub fn with_max_modules(mut self, max_modules: usize) -> Self {
        self.max_modules = max_modules;
        self
    }

    /// Walk the graph reachable from `entries`.
    ///
    /// # Arguments
    ///
    /// * `entries` - Absolute paths of the entry files, in execution order
    /// * `runtime` - Filesystem the modules are read from
    ///
    /// # Errors
    ///
    /// The first parse, read or resolution failure ends the walk.
    /// [`Error::TooManyModules`] is returned once the module limit is reached.
    pub async fn walk(&self, entries: &[PathBuf], runtime: &dyn Runtime) -> Result<ModuleGraph> {
        let mut walked: FxHashMap<PathBuf, WalkedModule> = FxHashMap::default();
        let mut queued: FxHashSet<PathBuf> = FxHashSet::default();
        let mut queue = VecDeque::new();

        for entry in entries {
            if queued.insert(entry.clone()) {
                queue.push_back(entry.clone());
            }
        }

        while let Some(current) = queue.pop_front() {
            if walked.len() >= self.max_modules {
                return Err(Error::TooManyModules {
                    max: self.max_modules,
                });
            }

            debug!("module {}", current.display());
            let module = self.parser.process_module(&current, runtime).await?;

            let mut resolved = Vec::with_capacity(module.requires.len());
            for specifier in module.requires {
                let target = self.resolver.resolve(&specifier, &current, runtime).await?;
                if let Resolved::Local(path) = &target {
                    if queued.insert(path.clone()) {
                        queue.push_back(path.clone());
                    }
                }
                resolved.push((specifier, target));
            }

            walked.insert(
                current,
                WalkedModule {
                    source: module.source,
                    resolved,
                },
            );
        }

        Ok(assign_ids(walked, entries))
    }
}

fn assign_ids(walked: FxHashMap<PathBuf, WalkedModule>, entries: &[PathBuf]) -> ModuleGraph {
    let mut paths: Vec<&PathBuf> = walked.keys().collect();
    paths.sort();

    let ids: FxHashMap<&PathBuf, ModuleId> = paths
        .iter()
        .enumerate()
        .map(|(idx, path)| (*path, idx as ModuleId + 1))
        .collect();

    let entry_set: FxHashSet<&PathBuf> = entries.iter().collect();
    let modules = paths
        .iter()
        .map(|path| {
            let module = &walked[*path];
            let deps = module
                .resolved
                .iter()
                .filter_map(|(specifier, target)| match target {
                    Resolved::Local(dep) => Some((specifier.clone(), ids[dep])),
                    Resolved::External(_) => None,
                })
                .collect();
            PackedModule {
                id: ids[*path],
                path: (*path).clone(),
                source: module.source.clone(),
                deps,
                is_entry: entry_set.contains(*path),
            }
        })
        .collect();

    let mut seen = FxHashSet::default();
    let entries = entries
        .iter()
        .filter(|entry| seen.insert(*entry))
        .filter_map(|entry| ids.get(entry).copied())
        .collect();

    ModuleGraph { modules, entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MemoryRuntime;

    fn walker() -> GraphWalker {
        GraphWalker::new(ModuleResolver::default())
    }

    #[tokio::test]
    async fn test_ids_follow_sorted_paths() {
        let runtime = MemoryRuntime::new("/p");
        runtime.add_file("test/test.js", "var z = require('../z.js'); var a = require('../a.js');");
        runtime.add_file("z.js", "module.exports = 'z';");
        runtime.add_file("a.js", "module.exports = 'a';");

        let graph = walker()
            .walk(&[PathBuf::from("/p/test/test.js")], &runtime)
            .await
            .unwrap();

        let paths: Vec<_> = graph.modules().iter().map(|m| m.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/p/a.js"),
                PathBuf::from("/p/test/test.js"),
                PathBuf::from("/p/z.js"),
            ]
        );
        assert_eq!(graph.entries(), &[2]);

        let entry = graph.module(Path::new("/p/test/test.js")).unwrap();
        assert!(entry.is_entry);
        assert_eq!(entry.deps.get("../a.js"), Some(&1));
        assert_eq!(entry.deps.get("../z.js"), Some(&3));
    }

    #[tokio::test]
    async fn test_cycles_and_shared_dependencies() {
        let runtime = MemoryRuntime::new("/p");
        runtime.add_file("a.js", "require('./b.js');");
        runtime.add_file("b.js", "require('./a.js'); require('./c.js');");
        runtime.add_file("c.js", "");
        runtime.add_file("d.js", "require('./c.js');");

        let graph = walker()
            .walk(&[PathBuf::from("/p/a.js"), PathBuf::from("/p/d.js")], &runtime)
            .await
            .unwrap();

        assert_eq!(graph.len(), 4);
        assert_eq!(graph.entries(), &[1, 4]);
        let b = graph.module(Path::new("/p/b.js")).unwrap();
        assert_eq!(b.deps.get("./a.js"), Some(&1));
        assert_eq!(b.deps.get("./c.js"), Some(&3));
    }

    #[tokio::test]
    async fn test_externals_are_not_bundled() {
        let runtime = MemoryRuntime::new("/p");
        runtime.add_file("test.js", "var tape = require('tape'); require('./a.js');");
        runtime.add_file("a.js", "");

        let graph = GraphWalker::new(ModuleResolver::new(vec!["tape".to_string()]))
            .walk(&[PathBuf::from("/p/test.js")], &runtime)
            .await
            .unwrap();

        assert_eq!(graph.len(), 2);
        let entry = graph.module(Path::new("/p/test.js")).unwrap();
        assert_eq!(entry.deps.len(), 1);
        assert!(!entry.deps.contains_key("tape"));
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let runtime = MemoryRuntime::new("/p");
        runtime.add_file("test.js", "require('./missing.js');");
        runtime.add_file("bad.js", "require('./broken.js');");
        runtime.add_file("broken.js", "function (");

        let err = walker()
            .walk(&[PathBuf::from("/p/test.js")], &runtime)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unresolved { .. }));

        let err = walker()
            .walk(&[PathBuf::from("/p/bad.js")], &runtime)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Parse { ref path, .. } if path == Path::new("/p/broken.js")));
    }

    #[tokio::test]
    async fn test_max_modules() {
        let runtime = MemoryRuntime::new("/p");
        runtime.add_file("a.js", "require('./b.js');");
        runtime.add_file("b.js", "");

        let err = walker()
            .with_max_modules(1)
            .walk(&[PathBuf::from("/p/a.js")], &runtime)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TooManyModules { max: 1 }));
    }
}
