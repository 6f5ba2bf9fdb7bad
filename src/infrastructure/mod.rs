//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `loader/` - Module loader (tiered cache) and load strategies
//! - `resolver/` - Dependency resolver backed by an analyzer manifest
//! - `watcher` - `notify` subscription over watch targets

pub mod loader;
pub mod resolver;
pub mod watcher;

// Re-export for convenience
pub use loader::{ModuleFactory, ModuleRegistry, RawFileModules, TieredModuleLoader};
pub use resolver::ManifestResolver;
pub use watcher::TargetWatcher;
