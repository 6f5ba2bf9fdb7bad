//! Domain Layer
//!
//! The core of Kiln: the watch-target set, template module shapes and the
//! ports the rest of the crate plugs into.
//!
//! ## Structure
//!
//! - `entities/` - `WatchSet`, `ModuleValue`, `RenderAdapter`
//! - `value_objects/` - Path normalization (`ProjectPaths`)
//! - `services/` - Dependency collection, shape classification
//! - `ports/` - `DependencyResolver`, `ModuleLoader`, `ModuleStrategy`
//!
//! ## Design Principles
//!
//! 1. **No watcher I/O** - Filesystem watching lives in infrastructure
//! 2. **Pure classification** - Export shapes are decided in one function
//! 3. **Ports & Adapters** - Analysis and module loading go through traits

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
