//! Rebuild cycle
//!
//! Applies one batch of changed paths to the watch set and the template
//! cache:
//!
//! 1. start a new cycle on the watch set
//! 2. changed script dependencies: the loader forgets every dependency
//!    module once, and each template that imports a changed dependency
//!    is evicted
//! 3. every changed file is evicted from the template cache and the
//!    module loader
//! 4. changed scripts still on disk are re-analyzed so new imports join
//!    the watch set

use std::sync::Arc;

use indexmap::IndexSet;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::entities::WatchSet;
use crate::domain::value_objects::add_leading_dot_slash;
use crate::error::KilnResult;

use super::templates::TemplateModules;

type DependencyFilter = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Outcome of one rebuild cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Changed paths, normalized and deduplicated
    pub changed: Vec<String>,
    /// Changed paths that are script dependencies
    pub dependency_changes: Vec<String>,
    /// Templates evicted from the cache
    pub invalidated: Vec<String>,
    /// Targets added by re-analysis, to be subscribed by the watcher
    pub new_targets: Vec<String>,
}

impl CycleReport {
    pub fn is_noop(&self) -> bool {
        self.invalidated.is_empty() && self.new_targets.is_empty()
    }
}

/// Incremental rebuild policy over a watch set and template cache
pub struct RebuildCycle {
    watch_set: WatchSet,
    templates: Arc<TemplateModules>,
    filter: Option<DependencyFilter>,
}

impl RebuildCycle {
    pub fn new(watch_set: WatchSet, templates: Arc<TemplateModules>) -> Self {
        Self {
            watch_set,
            templates,
            filter: None,
        }
    }

    /// Filter applied to dependencies discovered during re-analysis.
    pub fn with_dependency_filter(
        mut self,
        filter: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn watch_set(&self) -> &WatchSet {
        &self.watch_set
    }

    pub fn watch_set_mut(&mut self) -> &mut WatchSet {
        &mut self.watch_set
    }

    pub fn templates(&self) -> &Arc<TemplateModules> {
        &self.templates
    }

    pub fn apply<S: AsRef<str>>(&mut self, changed: &[S]) -> KilnResult<CycleReport> {
        let changed: IndexSet<String> = changed
            .iter()
            .map(|path| add_leading_dot_slash(path.as_ref()))
            .collect();

        self.watch_set.reset();

        let dependency_changes: Vec<String> = changed
            .iter()
            .filter(|path| self.watch_set.is_javascript_dependency(path))
            .cloned()
            .collect();

        let mut invalidated: IndexSet<String> = IndexSet::new();
        let mut reanalyze: IndexSet<String> = IndexSet::new();

        if !dependency_changes.is_empty() {
            self.watch_set.invalidate_dependency_cache();
            for dependency in &dependency_changes {
                for entry in self.watch_set.dependents_of(dependency) {
                    self.templates.invalidate(&entry);
                    invalidated.insert(entry.clone());
                    reanalyze.insert(entry);
                }
            }
        }

        for path in &changed {
            if self.templates.is_cached(path) {
                invalidated.insert(path.clone());
            }
            // also drops modules that loaded but never became a template
            self.templates.invalidate(path);
            if self.watch_set.is_script(path) {
                reanalyze.insert(path.clone());
            }
        }

        let paths = self.watch_set.paths().clone();
        let existing: Vec<String> = reanalyze
            .into_iter()
            .filter(|path| paths.absolute(path).is_file())
            .collect();
        if !existing.is_empty() {
            debug!(count = existing.len(), "re-analyzing changed scripts");
            let filter = self.filter.as_deref().map(|f| f as &dyn Fn(&str) -> bool);
            self.watch_set.add_dependencies(existing, filter)?;
        }

        let report = CycleReport {
            changed: changed.into_iter().collect(),
            dependency_changes,
            invalidated: invalidated.into_iter().collect(),
            new_targets: self.watch_set.new_targets_since_last_reset(),
        };
        info!(
            changed = report.changed.len(),
            dependencies = report.dependency_changes.len(),
            invalidated = report.invalidated.len(),
            new_targets = report.new_targets.len(),
            "rebuild cycle complete"
        );
        Ok(report)
    }
}

impl std::fmt::Debug for RebuildCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RebuildCycle")
            .field("watch_set", &self.watch_set)
            .field("templates", &self.templates)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}
