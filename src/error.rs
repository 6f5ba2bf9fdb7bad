//! Error types for Kiln
//!
//! Library errors use `thiserror`. User-supplied code (render functions,
//! data functions, helpers, module factories) reports failures through
//! `anyhow`, which is wrapped here together with the template path.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ports::{ModuleLoadError, ResolveError};

/// Result type alias for Kiln operations
pub type KilnResult<T> = Result<T, KilnError>;

/// Main error type for Kiln operations
#[derive(Error, Debug)]
pub enum KilnError {
    /// The loaded module matches none of the recognized export shapes
    #[error("no template returned from {path} (does the module export a template?)")]
    TemplateNotDefined { path: String },

    /// Declared `data` is not a key/value object
    #[error("invalid data format returned from {path}: expected an object, found {found}")]
    InvalidDataFormat { path: String, found: &'static str },

    /// Static dependency analysis failed for one entry file
    #[error("dependency analysis failed for {file}: {source}")]
    DependencyResolution {
        file: String,
        #[source]
        source: ResolveError,
    },

    /// Both module load strategies failed
    #[error(transparent)]
    ModuleLoad(#[from] ModuleLoadError),

    /// Template code failed while rendering or producing data
    #[error("template {path} failed: {source}")]
    Render {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    /// Invalid configuration file
    #[error("invalid config in {}: {message}", file.display())]
    Config { file: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File watcher backend error
    #[error("watcher error: {0}")]
    Watcher(#[from] notify::Error),
}
