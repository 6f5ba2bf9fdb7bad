//! Kiln - incremental rebuild and watch core
//!
//! Kiln keeps the set of paths a static-site build watches, including the
//! script modules its JavaScript templates import, and a cache of loaded
//! template modules normalized behind one render interface. When a watched
//! file changes, a rebuild cycle evicts exactly the templates that depend
//! on it and picks up newly imported files.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;


// Re-exports for convenience
pub use application::{
    watch, CompiledTemplate, CycleReport, RebuildCycle, TemplateModules, WatchEvent, WatchOptions,
    WatchUseCase,
};
pub use config::{Config, ConfigWarning, FallbackPolicy};
pub use domain::entities::{
    ClassDef, Deferred, HelperRegistry, IntoTargets, ModuleValue, RenderAdapter, Rendered,
    SharedAdapter, TemplateObject, WatchSet, WatchSetOptions,
};
pub use domain::ports::{
    DependencyResolver, ModuleLoadError, ModuleLoader, ModuleStrategy, ResolveError,
    ResolveOptions, StrategyError,
};
pub use domain::value_objects::ProjectPaths;
pub use error::{KilnError, KilnResult};
pub use infrastructure::{
    ManifestResolver, ModuleRegistry, RawFileModules, TargetWatcher, TieredModuleLoader,
};
