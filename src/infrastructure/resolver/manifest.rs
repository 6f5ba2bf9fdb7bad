//! Manifest-backed dependency resolver
//!
//! Serves dependencies from a manifest of direct edges written by an
//! external bundler or analyzer:
//!
//! ```json
//! { "page.11ty.js": ["lib/helper.js"], "lib/helper.js": ["lib/fmt.js"] }
//! ```
//!
//! Relative paths are anchored at the project root. `resolve` returns the
//! transitive closure in breadth-first order. The manifest can be reloaded
//! or extended while shared, so a running session sees the analyzer's
//! latest output.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use indexmap::IndexSet;
use tracing::debug;

use crate::domain::ports::{DependencyResolver, ResolveError, ResolveOptions};
use crate::domain::value_objects::normalize_lexically;

type Edges = HashMap<PathBuf, Vec<PathBuf>>;

#[derive(Debug)]
pub struct ManifestResolver {
    root: PathBuf,
    edges: RwLock<Edges>,
}

impl ManifestResolver {
    /// Empty manifest anchored at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            edges: RwLock::new(HashMap::new()),
        }
    }

    /// Build from `(entry, direct dependencies)` pairs.
    pub fn from_edges<I, E, D>(root: impl Into<PathBuf>, edges: I) -> Self
    where
        I: IntoIterator<Item = (E, Vec<D>)>,
        E: AsRef<Path>,
        D: AsRef<Path>,
    {
        let resolver = Self::new(root);
        for (entry, deps) in edges {
            resolver.insert(entry, &deps);
        }
        resolver
    }

    /// Read a JSON manifest.
    pub fn from_json_file(path: &Path, root: impl Into<PathBuf>) -> Result<Self, ResolveError> {
        let resolver = Self::new(root);
        resolver.reload(path)?;
        Ok(resolver)
    }

    /// Replace every edge with the contents of a JSON manifest.
    pub fn reload(&self, path: &Path) -> Result<(), ResolveError> {
        let content = std::fs::read_to_string(path).map_err(|err| ResolveError::Unreadable {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let raw: HashMap<String, Vec<String>> =
            serde_json::from_str(&content).map_err(|err| ResolveError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;

        let edges: Edges = raw
            .into_iter()
            .map(|(entry, deps)| {
                let deps = deps.iter().map(|dep| self.anchor(Path::new(dep))).collect();
                (self.anchor(Path::new(&entry)), deps)
            })
            .collect();
        debug!(manifest = %path.display(), entries = edges.len(), "dependency manifest loaded");
        *self.edges.write().unwrap_or_else(|e| e.into_inner()) = edges;
        Ok(())
    }

    /// Add to the direct dependencies of `entry`.
    pub fn insert<D: AsRef<Path>>(&self, entry: impl AsRef<Path>, deps: &[D]) {
        let entry = self.anchor(entry.as_ref());
        let deps: Vec<PathBuf> = deps.iter().map(|dep| self.anchor(dep.as_ref())).collect();
        self.edges
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(entry)
            .or_default()
            .extend(deps);
    }

    pub fn len(&self) -> usize {
        self.edges.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn anchor(&self, path: &Path) -> PathBuf {
        normalize_lexically(&self.root.join(path))
    }
}

impl DependencyResolver for ManifestResolver {
    fn resolve(&self, entry: &Path, options: &ResolveOptions) -> Result<Vec<PathBuf>, ResolveError> {
        let entry = normalize_lexically(&options.base_directory.join(entry));
        let edges = self.edges.read().unwrap_or_else(|e| e.into_inner());

        let mut found: IndexSet<PathBuf> = IndexSet::new();
        let mut queue: VecDeque<&PathBuf> = VecDeque::new();
        if let Some(direct) = edges.get(&entry) {
            queue.extend(direct);
        }

        while let Some(dep) = queue.pop_front() {
            if *dep == entry || options.is_excluded(dep) || !found.insert(dep.clone()) {
                continue;
            }
            if let Some(next) = edges.get(dep) {
                queue.extend(next);
            }
        }

        Ok(found.into_iter().collect())
    }
}
