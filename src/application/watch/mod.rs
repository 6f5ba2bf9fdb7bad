//! Watch Use Case
//!
//! Continuous watching with incremental rebuilds. It orchestrates:
//! - File system monitoring (via `TargetWatcher` over `notify`)
//! - Debouncing (100ms default)
//! - Content-hash filtering of editor save noise
//! - Rebuild cycles that invalidate exactly the affected templates
//!
//! ## Usage
//!
//! ```ignore
//! let mut use_case = WatchUseCase::new(cycle, WatchOptions::from_config(&config));
//! use_case.start(running, |event| println!("{}", event.to_json()))?;
//! ```

mod cache;
mod event;
mod use_case;


pub use cache::{compute_content_hash, ContentHashes};
pub use event::{WatchEvent, WatchOptions, WatcherState, DEBOUNCE_MS};
pub use use_case::{watch, WatchUseCase};
