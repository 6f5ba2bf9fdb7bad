//! Configuration module for Kiln
//!
//! Configuration hierarchy:
//! 1. Environment variables (KILN_*) (highest priority)
//! 2. Project config (kiln.toml in the project root)
//! 3. User config (<config dir>/kiln/config.toml)
//! 4. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::ConfigWarning;
pub use types::{Config, ModulesConfig, WatchConfig};

// Re-export FallbackPolicy from domain layer
pub use crate::domain::ports::FallbackPolicy;
