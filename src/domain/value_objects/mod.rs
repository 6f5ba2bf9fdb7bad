//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

pub mod template_path;

pub use template_path::{
    add_leading_dot_slash, glob_base, has_extension, is_glob, normalize_lexically, ProjectPaths,
};
