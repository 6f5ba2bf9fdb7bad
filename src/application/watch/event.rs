//! Watch options, NDJSON events and debounce state

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use crate::config::Config;

/// Debounce duration in milliseconds
pub const DEBOUNCE_MS: u64 = 100;

/// Timing knobs for the watch loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    /// Quiet period after the last change before a cycle runs
    pub debounce: Duration,
    /// Events received this soon after subscribing are discarded
    pub startup_cooldown: Duration,
    /// How long each poll waits for a watcher event
    pub poll_interval: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEBOUNCE_MS),
            startup_cooldown: Duration::from_millis(500),
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl WatchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            debounce: Duration::from_millis(config.watch.debounce_ms),
            ..Self::default()
        }
    }

    /// Set the startup cooldown
    pub fn with_startup_cooldown(mut self, cooldown: Duration) -> Self {
        self.startup_cooldown = cooldown;
        self
    }

    /// Set the debounce window
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// Events emitted by the watch loop, one JSON object per line
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchEvent {
    /// Subscriptions are in place
    WatchStarted { root: String, watching: Vec<String> },
    /// File changed
    FileChanged { path: String },
    /// Rebuild cycle applied
    CycleComplete {
        changed: usize,
        invalidated: Vec<String>,
        new_targets: Vec<String>,
    },
    /// A cycle or watcher backend failed
    Error { message: String },
    /// The loop exited
    Shutdown,
}

impl WatchEvent {
    /// One NDJSON line, tagged with `"command": "watch"`.
    pub fn to_json(&self) -> String {
        let mut line = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(fields)) => fields,
            _ => serde_json::Map::from_iter([("event".to_string(), "error".into())]),
        };
        line.insert("command".to_string(), "watch".into());
        serde_json::Value::Object(line).to_string()
    }
}

/// Debounce state: changed targets accumulate until the debounce window
/// has passed without a new change.
#[derive(Debug)]
pub struct WatcherState {
    debounce: Duration,
    pending: BTreeSet<String>,
    last_change_at: Option<Instant>,
}

impl Default for WatcherState {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEBOUNCE_MS))
    }
}

impl WatcherState {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending: BTreeSet::new(),
            last_change_at: None,
        }
    }

    pub fn add_change(&mut self, target: String) {
        self.pending.insert(target);
        self.last_change_at = Some(Instant::now());
    }

    /// True once changes are pending and the window has elapsed
    pub fn should_flush(&self) -> bool {
        self.has_pending()
            && self
                .last_change_at
                .is_some_and(|at| at.elapsed() >= self.debounce)
    }

    /// Drain the batch, sorted
    pub fn take_changes(&mut self) -> Vec<String> {
        self.last_change_at = None;
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
