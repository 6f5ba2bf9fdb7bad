//! Isolated project directory for scenario tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kiln::{
    Config, DependencyResolver, ManifestResolver, ModuleLoader, ModuleRegistry, ModuleValue,
    ProjectPaths, RawFileModules, RebuildCycle, TemplateModules, TieredModuleLoader, WatchSet,
};
use tempfile::TempDir;

/// Route `tracing` output through the test harness (`RUST_LOG=kiln=debug`).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A temporary site: files on disk, modules registered in-process and a
/// dependency manifest standing in for the external analyzer.
pub struct Site {
    pub dir: TempDir,
    pub registry: Arc<ModuleRegistry>,
    pub manifest: Arc<ManifestResolver>,
    pub loader: Arc<TieredModuleLoader>,
    pub config: Config,
}

impl Site {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        init_tracing();
        let dir = tempfile::tempdir().expect("tempdir");
        let registry = Arc::new(ModuleRegistry::new());
        let loader = Arc::new(
            TieredModuleLoader::new(Arc::clone(&registry), RawFileModules::new())
                .with_policy(config.modules.fallback),
        );
        let manifest = Arc::new(ManifestResolver::new(dir.path()));
        Self {
            dir,
            registry,
            manifest,
            loader,
            config,
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn paths(&self) -> ProjectPaths {
        ProjectPaths::new(self.dir.path())
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
        std::fs::write(&path, content).expect("write file");
        path
    }

    /// Register the in-process module for a file.
    pub fn register(
        &self,
        relative: &str,
        factory: impl Fn() -> anyhow::Result<ModuleValue> + Send + Sync + 'static,
    ) {
        self.registry.register(self.path(relative), factory);
    }

    /// Record that `entry` imports `deps` directly.
    pub fn imports(&self, entry: &str, deps: &[&str]) {
        self.manifest.insert(entry, deps);
    }

    pub fn module_loader(&self) -> Arc<dyn ModuleLoader> {
        Arc::clone(&self.loader) as Arc<dyn ModuleLoader>
    }

    pub fn resolver(&self) -> Arc<dyn DependencyResolver> {
        Arc::clone(&self.manifest) as Arc<dyn DependencyResolver>
    }

    pub fn watch_set(&self) -> WatchSet {
        WatchSet::new(self.paths(), self.resolver(), self.module_loader())
            .with_options(self.config.watch_set_options())
    }

    pub fn templates(&self) -> Arc<TemplateModules> {
        Arc::new(TemplateModules::new(self.paths(), self.module_loader()))
    }

    pub fn rebuild_cycle(&self) -> RebuildCycle {
        RebuildCycle::new(self.watch_set(), self.templates())
    }
}
