//! Domain Entities
//!
//! Core domain entities that have identity and lifecycle.
//! - `WatchSet` - Paths watched during a build/watch session
//! - `ModuleValue` - The export of a loaded template module
//! - `RenderAdapter` - A template normalized to the render capability

mod module_value;
mod render_adapter;
mod watch_set;

pub use module_value::{
    json_kind, render_fn, ClassDef, Constructor, DataFn, DataSource, Deferred, HelperFn,
    ModuleValue, RenderFn, Rendered, TemplateObject,
};
pub use render_adapter::{HelperRegistry, RenderAdapter, ShapeKind, SharedAdapter};
pub use watch_set::{IntoTargets, WatchSet, WatchSetOptions};
