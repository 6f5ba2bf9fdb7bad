//! Dependency Collector Domain Service
//!
//! Runs the dependency resolver over a list of entry files and merges the
//! results into one deduplicated, target-normalized list.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::domain::ports::{DependencyResolver, ResolveOptions};
use crate::domain::value_objects::{has_extension, ProjectPaths};
use crate::error::{KilnError, KilnResult};

/// Dependencies found for a batch of entry files, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedDependencies {
    /// dependency target -> entry targets that reference it
    entries: IndexMap<String, IndexSet<String>>,
}

impl CollectedDependencies {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Keep only dependencies accepted by `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|path, _| keep(path));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &IndexSet<String>)> {
        self.entries.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn into_paths(self) -> Vec<String> {
        self.entries.into_keys().collect()
    }
}

/// Resolve dependencies of every script in `files`.
///
/// Files without one of `extensions` are skipped. The entry file itself
/// and excluded directories never appear in the result. The first
/// resolver failure is returned as-is.
pub fn collect_dependencies(
    resolver: &dyn DependencyResolver,
    paths: &ProjectPaths,
    files: &[String],
    extensions: &[String],
    options: &ResolveOptions,
) -> KilnResult<CollectedDependencies> {
    let mut collected = CollectedDependencies::default();
    let mut analyzed = HashSet::new();

    for file in files.iter().filter(|file| has_extension(file, extensions)) {
        let entry = paths.absolute(file);
        let entry_target = paths.to_target(&entry);
        if !analyzed.insert(entry_target.clone()) {
            continue;
        }

        let found = resolver
            .resolve(&entry, options)
            .map_err(|source| KilnError::DependencyResolution {
                file: file.clone(),
                source,
            })?;
        debug!(file = %entry_target, found = found.len(), "resolved script dependencies");

        for dependency in found {
            if options.is_excluded(&dependency) {
                continue;
            }
            let target = paths.to_target(&dependency);
            if target == entry_target {
                continue;
            }
            collected
                .entries
                .entry(target)
                .or_default()
                .insert(entry_target.clone());
        }
    }

    Ok(collected)
}
