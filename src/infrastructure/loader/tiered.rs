//! Tiered module loader
//!
//! Loads through a primary strategy and retries with a legacy strategy
//! according to the configured `FallbackPolicy`. Successful loads are kept
//! in a module cache until `forget` drops them. `forget` also bumps the
//! path's generation, so a load that was already running when the path was
//! forgotten returns its value without caching it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::domain::entities::ModuleValue;
use crate::domain::ports::{FallbackPolicy, ModuleLoadError, ModuleLoader, ModuleStrategy};

#[derive(Default)]
struct ModuleCache {
    modules: HashMap<PathBuf, ModuleValue>,
    generations: HashMap<PathBuf, u64>,
}

impl ModuleCache {
    fn generation(&self, path: &Path) -> u64 {
        self.generations.get(path).copied().unwrap_or(0)
    }
}

pub struct TieredModuleLoader {
    primary: Box<dyn ModuleStrategy>,
    legacy: Box<dyn ModuleStrategy>,
    policy: FallbackPolicy,
    cache: Mutex<ModuleCache>,
}

impl TieredModuleLoader {
    pub fn new(primary: impl ModuleStrategy + 'static, legacy: impl ModuleStrategy + 'static) -> Self {
        Self {
            primary: Box::new(primary),
            legacy: Box::new(legacy),
            policy: FallbackPolicy::default(),
            cache: Mutex::new(ModuleCache::default()),
        }
    }

    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    pub fn is_cached(&self, path: &Path) -> bool {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .modules
            .contains_key(path)
    }

    fn load_uncached(&self, path: &Path) -> Result<ModuleValue, ModuleLoadError> {
        let primary = match self.primary.load(path) {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !self.policy.should_fall_back(&primary) {
            return Err(ModuleLoadError::Primary(primary));
        }

        warn!(
            path = %path.display(),
            primary = self.primary.name(),
            legacy = self.legacy.name(),
            error = %primary,
            "primary module load failed, falling back to legacy loader"
        );

        self.legacy
            .load(path)
            .map_err(|legacy| ModuleLoadError::Exhausted {
                path: path.to_path_buf(),
                primary,
                legacy,
            })
    }
}

impl ModuleLoader for TieredModuleLoader {
    fn load(&self, path: &Path) -> Result<ModuleValue, ModuleLoadError> {
        let generation = {
            let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(value) = cache.modules.get(path) {
                return Ok(value.clone());
            }
            cache.generation(path)
        };

        let value = self.load_uncached(path)?;
        debug!(path = %path.display(), kind = value.kind_name(), "module loaded");

        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if cache.generation(path) == generation {
            cache.modules.insert(path.to_path_buf(), value.clone());
        } else {
            debug!(path = %path.display(), "module forgotten during load, not cached");
        }
        Ok(value)
    }

    fn forget(&self, path: &Path) {
        {
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            cache.modules.remove(path);
            *cache.generations.entry(path.to_path_buf()).or_insert(0) += 1;
        }
        self.primary.forget(path);
        self.legacy.forget(path);
    }
}

impl std::fmt::Debug for TieredModuleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredModuleLoader")
            .field("primary", &self.primary.name())
            .field("legacy", &self.legacy.name())
            .field("policy", &self.policy)
            .finish()
    }
}
