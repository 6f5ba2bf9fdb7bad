//! Dependency resolver implementations
//!
//! - `ManifestResolver` - serves a dependency manifest written by an external analyzer

mod manifest;

pub use manifest::ManifestResolver;
