//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod dependency_resolver;
pub mod module_loader;

pub use dependency_resolver::{DependencyResolver, ResolveError, ResolveOptions};
pub use module_loader::{
    FallbackPolicy, ModuleLoadError, ModuleLoader, ModuleStrategy, StrategyError,
};
