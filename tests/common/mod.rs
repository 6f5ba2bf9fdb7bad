//! Common test utilities for Kiln scenario tests.
//!
//! This module provides:
//! - `Site`: an isolated project directory with a module registry
//! - Fixtures: reusable script sources

#![allow(dead_code)]

pub mod fixtures;
pub mod site;

pub use fixtures::*;
pub use site::*;
