//! DependencyResolver port - abstraction over static import analysis
//!
//! Given an entry script, a resolver returns every file the entry
//! references, transitively. The domain never parses scripts itself; the
//! analysis is provided by an implementation of this trait.

use std::path::{Component, Path, PathBuf};

/// Options passed to every resolver call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Directory that relative references are resolved against
    pub base_directory: PathBuf,
    /// Directory names whose contents are never reported (vendored code)
    pub exclude_dirs: Vec<String>,
}

impl ResolveOptions {
    pub fn new(base_directory: impl Into<PathBuf>) -> Self {
        Self {
            base_directory: base_directory.into(),
            exclude_dirs: vec!["node_modules".to_string()],
        }
    }

    pub fn with_exclude_dirs(mut self, exclude_dirs: Vec<String>) -> Self {
        self.exclude_dirs = exclude_dirs;
        self
    }

    /// Whether any component of `path` is an excluded directory.
    pub fn is_excluded(&self, path: &Path) -> bool {
        path.components().any(|component| match component {
            Component::Normal(name) => self
                .exclude_dirs
                .iter()
                .any(|excluded| name == excluded.as_str()),
            _ => false,
        })
    }
}

/// Dependency analysis errors
#[derive(Debug)]
pub enum ResolveError {
    /// Entry file could not be read
    Unreadable { path: PathBuf, message: String },
    /// Entry file could not be parsed
    Parse { path: PathBuf, message: String },
    /// Analyzer backend failure
    Other(anyhow::Error),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::Unreadable { path, message } => {
                write!(f, "cannot read {}: {}", path.display(), message)
            }
            ResolveError::Parse { path, message } => {
                write!(f, "cannot parse {}: {}", path.display(), message)
            }
            ResolveError::Other(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<anyhow::Error> for ResolveError {
    fn from(err: anyhow::Error) -> Self {
        ResolveError::Other(err)
    }
}

/// Static dependency analyzer
///
/// Implementations:
/// - `ManifestResolver` - dependency manifest produced by an external analyzer
/// - test doubles with fixed dependency lists
pub trait DependencyResolver: Send + Sync {
    /// Return the files `entry` references, transitively, excluding `entry`
    /// itself and anything under `options.exclude_dirs`.
    fn resolve(&self, entry: &Path, options: &ResolveOptions) -> Result<Vec<PathBuf>, ResolveError>;
}
