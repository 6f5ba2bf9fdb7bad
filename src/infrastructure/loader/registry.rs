//! In-process module registry
//!
//! The modern tier: template modules are registered as factories keyed by
//! absolute path. A factory runs each time the module is evaluated, so a
//! module forgotten by the loader is rebuilt from scratch on its next load.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::domain::entities::ModuleValue;
use crate::domain::ports::{ModuleStrategy, StrategyError};

/// Evaluates a registered module.
pub type ModuleFactory = Arc<dyn Fn() -> anyhow::Result<ModuleValue> + Send + Sync>;

#[derive(Default)]
pub struct ModuleRegistry {
    factories: RwLock<HashMap<PathBuf, ModuleFactory>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the module at `path`.
    pub fn register(
        &self,
        path: impl Into<PathBuf>,
        factory: impl Fn() -> anyhow::Result<ModuleValue> + Send + Sync + 'static,
    ) {
        self.factories
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.into(), Arc::new(factory));
    }

    pub fn unregister(&self, path: &Path) -> bool {
        self.factories
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(path)
            .is_some()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.factories
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(path)
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let factories = self.factories.read().unwrap_or_else(|e| e.into_inner());
        f.debug_set().entries(factories.keys()).finish()
    }
}

impl ModuleStrategy for ModuleRegistry {
    fn name(&self) -> &'static str {
        "registry"
    }

    fn load(&self, path: &Path) -> Result<ModuleValue, StrategyError> {
        let factory = self
            .factories
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
            .ok_or_else(|| StrategyError::Unsupported {
                path: path.to_path_buf(),
                reason: "no module registered for this path".to_string(),
            })?;

        factory().map_err(|source| StrategyError::Evaluation {
            path: path.to_path_buf(),
            source,
        })
    }
}
