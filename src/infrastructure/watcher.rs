//! Filesystem watcher over the current target list
//!
//! Wraps a `notify` recommended watcher. Glob targets subscribe their
//! literal base directory recursively; plain targets subscribe the path
//! itself. Targets that do not exist yet are skipped and picked up by a
//! later `subscribe` call.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

use crate::domain::value_objects::{glob_base, is_glob, ProjectPaths};
use crate::error::KilnResult;

pub struct TargetWatcher {
    watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    subscribed: HashSet<PathBuf>,
}

impl TargetWatcher {
    pub fn new() -> KilnResult<Self> {
        let (tx, rx) = channel();
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;
        Ok(Self {
            watcher,
            events: rx,
            subscribed: HashSet::new(),
        })
    }

    /// Subscribe every target not yet watched. Returns how many new
    /// subscriptions were made.
    pub fn subscribe(&mut self, paths: &ProjectPaths, targets: &[String]) -> KilnResult<usize> {
        let mut added = 0;
        for target in targets {
            let (path, mode) = if is_glob(target) {
                (paths.absolute(glob_base(target)), RecursiveMode::Recursive)
            } else {
                (paths.absolute(target), RecursiveMode::NonRecursive)
            };

            if self.subscribed.contains(&path) {
                continue;
            }
            if !path.exists() {
                debug!(target = %target, "watch target does not exist yet, skipping");
                continue;
            }

            self.watcher.watch(&path, mode)?;
            self.subscribed.insert(path);
            added += 1;
        }
        if added > 0 {
            debug!(added, total = self.subscribed.len(), "watcher subscriptions added");
        }
        Ok(added)
    }

    pub fn is_subscribed(&self, path: &std::path::Path) -> bool {
        self.subscribed.contains(path)
    }

    /// Wait up to `timeout` for the next event; return the paths it touched.
    ///
    /// Access events are ignored. Backend errors are logged and yield
    /// no paths.
    pub fn poll(&self, timeout: Duration) -> Vec<PathBuf> {
        match self.events.recv_timeout(timeout) {
            Ok(Ok(event)) if matches!(event.kind, EventKind::Access(_)) => Vec::new(),
            Ok(Ok(event)) => event.paths,
            Ok(Err(err)) => {
                warn!(error = %err, "file watcher reported an error");
                Vec::new()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => Vec::new(),
        }
    }

    /// Discard queued events until `window` passes.
    pub fn drain(&self, window: Duration) {
        let end = std::time::Instant::now() + window;
        while std::time::Instant::now() < end {
            let _ = self.events.recv_timeout(Duration::from_millis(50));
        }
    }
}

impl std::fmt::Debug for TargetWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetWatcher")
            .field("subscribed", &self.subscribed)
            .finish()
    }
}
