//! ModuleLoader port - loading and forgetting template modules
//!
//! A loader turns an absolute path into a `ModuleValue` and keeps loaded
//! modules cached until told to forget them. Loading is split into
//! strategies so a modern loader can fall back to a legacy one.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::entities::ModuleValue;

/// Failure of a single load strategy, classified by cause
#[derive(Error, Debug)]
pub enum StrategyError {
    /// The strategy cannot handle this module's format
    #[error("unsupported module format for {}: {reason}", path.display())]
    Unsupported { path: PathBuf, reason: String },

    /// The strategy found nothing at this path
    #[error("module not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The module was found but failed while being evaluated
    #[error("module {} failed during evaluation: {source}", path.display())]
    Evaluation {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl StrategyError {
    /// True for failures that mean "wrong loader", not "broken module".
    pub fn is_format_mismatch(&self) -> bool {
        matches!(
            self,
            StrategyError::Unsupported { .. } | StrategyError::NotFound { .. }
        )
    }
}

/// When a failed primary load is retried with the legacy strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Retry on every primary failure, including errors raised while the
    /// module evaluates
    #[default]
    AnyFailure,
    /// Retry only when the primary strategy cannot handle the module
    UnsupportedOnly,
}

impl FallbackPolicy {
    pub fn should_fall_back(self, err: &StrategyError) -> bool {
        match self {
            FallbackPolicy::AnyFailure => true,
            FallbackPolicy::UnsupportedOnly => err.is_format_mismatch(),
        }
    }
}

/// Failure of a full module load
#[derive(Error, Debug)]
pub enum ModuleLoadError {
    /// The primary strategy failed and fallback was not permitted
    #[error(transparent)]
    Primary(StrategyError),

    /// Both the primary and the legacy strategy failed
    #[error("could not load module {}: {primary}; legacy loader also failed", path.display())]
    Exhausted {
        path: PathBuf,
        primary: StrategyError,
        #[source]
        legacy: StrategyError,
    },
}

/// One way of loading a module
pub trait ModuleStrategy: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    /// Load and evaluate the module at `path`
    fn load(&self, path: &Path) -> Result<ModuleValue, StrategyError>;

    /// Drop any state the strategy keeps for `path`
    fn forget(&self, _path: &Path) {}
}

impl<T: ModuleStrategy + ?Sized> ModuleStrategy for std::sync::Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn load(&self, path: &Path) -> Result<ModuleValue, StrategyError> {
        (**self).load(path)
    }

    fn forget(&self, path: &Path) {
        (**self).forget(path)
    }
}

/// Loader used by the watch set and the template cache
pub trait ModuleLoader: Send + Sync {
    /// Load the module at an absolute path, from cache when possible
    fn load(&self, path: &Path) -> Result<ModuleValue, ModuleLoadError>;

    /// Forget a loaded module so the next `load` re-reads the file
    fn forget(&self, path: &Path);
}
