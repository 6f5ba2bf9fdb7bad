//! Domain Services
//!
//! Stateless operations over domain entities.

mod dependency_collector;
mod shape_classifier;

pub use dependency_collector::{collect_dependencies, CollectedDependencies};
pub use shape_classifier::{classify, ModuleShape};
