//! Watch Use Case implementation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::application::rebuild::{CycleReport, RebuildCycle};
use crate::domain::value_objects::is_glob;
use crate::error::KilnResult;
use crate::infrastructure::watcher::TargetWatcher;

use super::cache::ContentHashes;
use super::event::{WatchEvent, WatchOptions, WatcherState};

/// Watch Use Case
///
/// Owns the rebuild cycle for the lifetime of a watch session.
pub struct WatchUseCase {
    cycle: RebuildCycle,
    options: WatchOptions,
}

impl WatchUseCase {
    pub fn new(cycle: RebuildCycle, options: WatchOptions) -> Self {
        Self { cycle, options }
    }

    pub fn cycle(&self) -> &RebuildCycle {
        &self.cycle
    }

    pub fn into_cycle(self) -> RebuildCycle {
        self.cycle
    }

    /// Start watching (blocking)
    ///
    /// Blocks until the running flag is set to false. A failing rebuild
    /// cycle is reported as an `Error` event and watching continues.
    pub fn start<F>(&mut self, running: Arc<AtomicBool>, on_event: F) -> KilnResult<()>
    where
        F: Fn(WatchEvent),
    {
        let paths = self.cycle.watch_set().paths().clone();
        let targets = self.cycle.watch_set().targets();

        on_event(WatchEvent::WatchStarted {
            root: paths.root().display().to_string(),
            watching: targets.clone(),
        });

        let mut watcher = TargetWatcher::new()?;
        watcher.subscribe(&paths, &targets)?;

        let mut hashes = ContentHashes::new();
        for target in targets.iter().filter(|t| !is_glob(t)) {
            hashes.seed(&paths.absolute(target));
        }

        // notify may replay events for files that existed at subscription
        watcher.drain(self.options.startup_cooldown);
        info!(targets = targets.len(), root = %paths.root().display(), "watching");

        let mut state = WatcherState::new(self.options.debounce);
        while running.load(Ordering::SeqCst) {
            for path in watcher.poll(self.options.poll_interval) {
                if path.is_dir() || !hashes.observe(&path) {
                    continue;
                }
                state.add_change(paths.to_target(&path));
            }

            if state.should_flush() {
                let changes = state.take_changes();
                for path in &changes {
                    on_event(WatchEvent::FileChanged { path: path.clone() });
                }
                match self.cycle.apply(&changes) {
                    Ok(report) => {
                        if let Err(err) = watcher.subscribe(&paths, &report.new_targets) {
                            warn!(error = %err, "could not subscribe new watch targets");
                            on_event(WatchEvent::Error {
                                message: err.to_string(),
                            });
                        }
                        on_event(cycle_complete(report));
                    }
                    Err(err) => {
                        warn!(error = %err, "rebuild cycle failed");
                        on_event(WatchEvent::Error {
                            message: err.to_string(),
                        });
                    }
                }
            }
        }

        on_event(WatchEvent::Shutdown);
        Ok(())
    }
}

fn cycle_complete(report: CycleReport) -> WatchEvent {
    WatchEvent::CycleComplete {
        changed: report.changed.len(),
        invalidated: report.invalidated,
        new_targets: report.new_targets,
    }
}

/// Watch with `cycle` until `running` is cleared, returning the cycle.
pub fn watch(
    cycle: RebuildCycle,
    options: WatchOptions,
    running: Arc<AtomicBool>,
    on_event: impl Fn(WatchEvent),
) -> KilnResult<RebuildCycle> {
    let mut use_case = WatchUseCase::new(cycle, options);
    use_case.start(running, on_event)?;
    Ok(use_case.into_cycle())
}
