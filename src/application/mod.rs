//! Application Layer
//!
//! Use cases that orchestrate the rebuild flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `TemplateModules` - Memoized template adapters, data extraction, compilation
//! - `RebuildCycle` - Applies a batch of changed paths to watch set and template cache
//! - `WatchUseCase` - Watches targets and drives rebuild cycles

pub mod rebuild;
pub mod templates;
pub mod watch;

pub use rebuild::{CycleReport, RebuildCycle};
pub use templates::{CompiledTemplate, TemplateModules};
pub use watch::{
    compute_content_hash, watch, ContentHashes, WatchEvent, WatchOptions, WatchUseCase,
    WatcherState, DEBOUNCE_MS,
};
