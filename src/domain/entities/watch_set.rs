//! WatchSet entity
//!
//! The authoritative set of paths a build/watch session watches. Direct
//! targets and discovered script dependencies live in one ordered set so a
//! single watcher subscription covers both; the dependency flag lets the
//! orchestrator decide which changes need module-cache invalidation.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexSet;
use tracing::debug;

use crate::domain::ports::{DependencyResolver, ModuleLoader, ResolveOptions};
use crate::domain::services::collect_dependencies;
use crate::domain::value_objects::{add_leading_dot_slash, ProjectPaths};
use crate::error::KilnResult;

/// Anything accepted where one or more targets are expected.
pub trait IntoTargets {
    fn into_targets(self) -> Vec<String>;
}

impl IntoTargets for &str {
    fn into_targets(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoTargets for String {
    fn into_targets(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoTargets for &String {
    fn into_targets(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl<S: AsRef<str>> IntoTargets for Vec<S> {
    fn into_targets(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

impl<S: AsRef<str>> IntoTargets for &[S] {
    fn into_targets(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

impl<S: AsRef<str>, const N: usize> IntoTargets for [S; N] {
    fn into_targets(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

impl<T: IntoTargets> IntoTargets for Option<T> {
    fn into_targets(self) -> Vec<String> {
        self.map(IntoTargets::into_targets).unwrap_or_default()
    }
}

/// Knobs for dependency discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSetOptions {
    /// Discover and watch script dependencies at all
    pub watch_javascript_dependencies: bool,
    /// Extensions (without dot) of files analyzed for dependencies
    pub script_extensions: Vec<String>,
    /// Directory names never reported as dependencies
    pub exclude_dirs: Vec<String>,
}

impl Default for WatchSetOptions {
    fn default() -> Self {
        Self {
            watch_javascript_dependencies: true,
            script_extensions: vec!["js".to_string(), "cjs".to_string()],
            exclude_dirs: vec!["node_modules".to_string()],
        }
    }
}

/// Paths watched during one build/watch session
pub struct WatchSet {
    paths: ProjectPaths,
    resolver: Arc<dyn DependencyResolver>,
    loader: Arc<dyn ModuleLoader>,
    options: WatchSetOptions,
    targets: IndexSet<String>,
    dependencies: IndexSet<String>,
    new_targets: IndexSet<String>,
    /// dependency -> entry files whose analysis reported it
    dependents: HashMap<String, IndexSet<String>>,
}

impl WatchSet {
    pub fn new(
        paths: ProjectPaths,
        resolver: Arc<dyn DependencyResolver>,
        loader: Arc<dyn ModuleLoader>,
    ) -> Self {
        Self {
            paths,
            resolver,
            loader,
            options: WatchSetOptions::default(),
            targets: IndexSet::new(),
            dependencies: IndexSet::new(),
            new_targets: IndexSet::new(),
            dependents: HashMap::new(),
        }
    }

    pub fn with_options(mut self, options: WatchSetOptions) -> Self {
        self.options = options;
        self
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    pub fn watch_javascript_dependencies(&self) -> bool {
        self.options.watch_javascript_dependencies
    }

    pub fn set_watch_javascript_dependencies(&mut self, watch: bool) {
        self.options.watch_javascript_dependencies = watch;
    }

    /// Whether a file's extension makes it eligible for dependency analysis.
    pub fn is_script(&self, path: &str) -> bool {
        crate::domain::value_objects::has_extension(path, &self.options.script_extensions)
    }

    fn add_raw(&mut self, targets: impl IntoIterator<Item = String>, is_dependency: bool) {
        let mut added = 0usize;
        for target in targets {
            let path = add_leading_dot_slash(&target);
            if !self.targets.contains(&path) {
                self.new_targets.insert(path.clone());
                added += 1;
            }
            if is_dependency {
                self.dependencies.insert(path.clone());
            }
            self.targets.insert(path);
        }
        if added > 0 {
            debug!(added, is_dependency, total = self.targets.len(), "watch targets added");
        }
    }

    /// Add targets without dependency tagging.
    pub fn add(&mut self, targets: impl IntoTargets) {
        self.add_raw(targets.into_targets(), false);
    }

    /// Add targets, expanding directories into recursive globs first.
    pub fn add_and_make_glob(&mut self, targets: impl IntoTargets) {
        let globs: Vec<String> = targets
            .into_targets()
            .iter()
            .map(|target| self.paths.recursive_glob(target))
            .collect();
        self.add_raw(globs, false);
    }

    /// Discover the script dependencies of `targets` and watch them.
    ///
    /// The first analysis failure aborts the whole call; nothing is added.
    pub fn add_dependencies(
        &mut self,
        targets: impl IntoTargets,
        filter: Option<&dyn Fn(&str) -> bool>,
    ) -> KilnResult<()> {
        if !self.options.watch_javascript_dependencies {
            debug!("javascript dependency watching disabled, skipping analysis");
            return Ok(());
        }

        let files = targets.into_targets();
        let resolve_options = ResolveOptions::new(self.paths.root())
            .with_exclude_dirs(self.options.exclude_dirs.clone());
        let mut collected = collect_dependencies(
            self.resolver.as_ref(),
            &self.paths,
            &files,
            &self.options.script_extensions,
            &resolve_options,
        )?;

        if let Some(filter) = filter {
            collected.retain(|path| filter(path));
        }

        for (dependency, entries) in collected.iter() {
            self.dependents
                .entry(add_leading_dot_slash(dependency))
                .or_default()
                .extend(entries.iter().cloned());
        }
        self.add_raw(collected.into_paths(), true);
        Ok(())
    }

    pub fn is_watched(&self, path: &str) -> bool {
        self.targets.contains(&add_leading_dot_slash(path))
    }

    pub fn is_javascript_dependency(&self, path: &str) -> bool {
        self.dependencies.contains(&add_leading_dot_slash(path))
    }

    /// Entry files whose dependency analysis reported `path`.
    pub fn dependents_of(&self, path: &str) -> Vec<String> {
        self.dependents
            .get(&add_leading_dot_slash(path))
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Start a new cycle: forget which targets are new.
    pub fn reset(&mut self) {
        self.new_targets.clear();
    }

    pub fn targets(&self) -> Vec<String> {
        self.targets.iter().cloned().collect()
    }

    pub fn dependencies(&self) -> Vec<String> {
        self.dependencies.iter().cloned().collect()
    }

    pub fn new_targets_since_last_reset(&self) -> Vec<String> {
        self.new_targets.iter().cloned().collect()
    }

    /// Make the loader forget every dependency module so the next load
    /// reflects what is on disk.
    pub fn invalidate_dependency_cache(&self) {
        for path in &self.dependencies {
            self.loader.forget(&self.paths.absolute(path));
        }
        debug!(
            count = self.dependencies.len(),
            "dependency module cache invalidated"
        );
    }
}

impl std::fmt::Debug for WatchSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSet")
            .field("root", &self.paths.root())
            .field("options", &self.options)
            .field("targets", &self.targets)
            .field("dependencies", &self.dependencies)
            .field("new_targets", &self.new_targets)
            .finish()
    }
}
