//! Property tests for the watch set.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use proptest::prelude::*;

use kiln::{
    DependencyResolver, ModuleLoadError, ModuleLoader, ModuleValue, ProjectPaths, ResolveError,
    ResolveOptions, StrategyError, WatchSet,
};

/// Resolver answering from a fixed graph under `/site`.
struct GraphResolver(HashMap<PathBuf, Vec<PathBuf>>);

impl DependencyResolver for GraphResolver {
    fn resolve(&self, entry: &Path, _: &ResolveOptions) -> Result<Vec<PathBuf>, ResolveError> {
        Ok(self.0.get(entry).cloned().unwrap_or_default())
    }
}

struct NoModules;

impl ModuleLoader for NoModules {
    fn load(&self, path: &Path) -> Result<ModuleValue, ModuleLoadError> {
        Err(ModuleLoadError::Primary(StrategyError::NotFound {
            path: path.to_path_buf(),
        }))
    }

    fn forget(&self, _path: &Path) {}
}

fn file_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-c]{1,2}\\.(js|md)").unwrap()
}

fn graph() -> impl Strategy<Value = HashMap<PathBuf, Vec<PathBuf>>> {
    proptest::collection::hash_map(
        file_name(),
        proptest::collection::vec(file_name(), 0..4),
        0..6,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .map(|(entry, deps)| {
                (
                    Path::new("/site").join(&entry),
                    deps.iter()
                        .filter(|dep| **dep != entry)
                        .map(|dep| Path::new("/site").join(dep))
                        .collect(),
                )
            })
            .collect()
    })
}

fn watch_set(graph: HashMap<PathBuf, Vec<PathBuf>>) -> WatchSet {
    WatchSet::new(
        ProjectPaths::new("/site"),
        Arc::new(GraphResolver(graph)),
        Arc::new(NoModules),
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: adding the same targets twice changes nothing.
    #[test]
    fn property_add_is_idempotent(files in proptest::collection::vec(file_name(), 0..8)) {
        let mut set = watch_set(HashMap::new());
        set.add(files.clone());
        let targets = set.targets();
        set.reset();
        set.add(files);
        prop_assert_eq!(set.targets(), targets);
        prop_assert!(set.new_targets_since_last_reset().is_empty());
    }

    /// PROPERTY: dependencies are always a subset of targets, and targets
    /// hold no duplicates.
    #[test]
    fn property_dependencies_subset_of_targets(
        graph in graph(),
        direct in proptest::collection::vec(file_name(), 0..4),
        entries in proptest::collection::vec(file_name(), 0..6),
    ) {
        let mut set = watch_set(graph);
        set.add(direct);
        set.add_dependencies(entries, None).unwrap();

        let targets = set.targets();
        for dependency in set.dependencies() {
            prop_assert!(targets.contains(&dependency));
        }
        let unique: std::collections::HashSet<_> = targets.iter().collect();
        prop_assert_eq!(unique.len(), targets.len());
    }

    /// PROPERTY: new targets are exactly those added since the last reset.
    #[test]
    fn property_new_targets_since_reset(
        before in proptest::collection::vec(file_name(), 0..6),
        after in proptest::collection::vec(file_name(), 0..6),
    ) {
        let mut set = watch_set(HashMap::new());
        set.add(before);
        let existing = set.targets();
        set.reset();
        set.add(after);

        let new_targets = set.new_targets_since_last_reset();
        for target in set.targets() {
            prop_assert_eq!(new_targets.contains(&target), !existing.contains(&target));
        }
    }

    /// PROPERTY: with dependency watching disabled, analysis never adds targets.
    #[test]
    fn property_disabled_analysis_adds_nothing(
        graph in graph(),
        entries in proptest::collection::vec(file_name(), 0..6),
    ) {
        let mut set = watch_set(graph);
        set.set_watch_javascript_dependencies(false);
        set.add_dependencies(entries, None).unwrap();
        prop_assert!(set.targets().is_empty());
    }
}
