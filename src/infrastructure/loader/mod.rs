//! Module loader implementations
//!
//! - `TieredModuleLoader` - module cache over a primary and a legacy strategy
//! - `ModuleRegistry` - modules registered in-process as factories
//! - `RawFileModules` - file contents exported as a literal

mod raw_file;
mod registry;
mod tiered;

pub use raw_file::RawFileModules;
pub use registry::{ModuleFactory, ModuleRegistry};
pub use tiered::TieredModuleLoader;
