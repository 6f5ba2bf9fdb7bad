//! Configuration type definitions

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::entities::WatchSetOptions;
use crate::domain::ports::FallbackPolicy;
use crate::error::KilnResult;

use super::loader::{self, ConfigWarning};

/// Watch configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Discover and watch the dependencies of script templates
    #[serde(default = "default_true")]
    pub javascript_dependencies: bool,

    /// Extensions analyzed for dependencies
    #[serde(default = "default_script_extensions")]
    pub script_extensions: Vec<String>,

    /// Directories never reported as dependencies
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// Quiet period before a batch of changes is processed
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            javascript_dependencies: true,
            script_extensions: default_script_extensions(),
            exclude_dirs: default_exclude_dirs(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_script_extensions() -> Vec<String> {
    vec!["js".to_string(), "cjs".to_string()]
}

fn default_exclude_dirs() -> Vec<String> {
    vec!["node_modules".to_string()]
}

fn default_debounce_ms() -> u64 {
    100
}

/// Module loading configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ModulesConfig {
    #[serde(default)]
    pub fallback: FallbackPolicy,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub modules: ModulesConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> KilnResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> KilnResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Load from project config, user config, or defaults
    pub fn load_or_default(project_root: Option<&Path>) -> Self {
        loader::load_or_default(project_root)
    }

    /// Apply environment variable overrides (KILN_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }

    /// Dependency discovery options for a `WatchSet`
    pub fn watch_set_options(&self) -> WatchSetOptions {
        WatchSetOptions {
            watch_javascript_dependencies: self.watch.javascript_dependencies,
            script_extensions: self.watch.script_extensions.clone(),
            exclude_dirs: self.watch.exclude_dirs.clone(),
        }
    }
}
