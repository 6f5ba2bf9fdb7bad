//! Raw file module strategy
//!
//! The legacy tier: a module's export is simply the file's contents, as
//! text when it is valid UTF-8 and as bytes otherwise.

use std::io::ErrorKind;
use std::path::Path;

use crate::domain::entities::ModuleValue;
use crate::domain::ports::{ModuleStrategy, StrategyError};

#[derive(Debug, Clone, Copy, Default)]
pub struct RawFileModules;

impl RawFileModules {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleStrategy for RawFileModules {
    fn name(&self) -> &'static str {
        "raw-file"
    }

    fn load(&self, path: &Path) -> Result<ModuleValue, StrategyError> {
        let bytes = std::fs::read(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => StrategyError::NotFound {
                path: path.to_path_buf(),
            },
            ErrorKind::IsADirectory => StrategyError::Unsupported {
                path: path.to_path_buf(),
                reason: "path is a directory".to_string(),
            },
            _ => StrategyError::Evaluation {
                path: path.to_path_buf(),
                source: err.into(),
            },
        })?;

        Ok(match String::from_utf8(bytes) {
            Ok(text) => ModuleValue::Text(text),
            Err(err) => ModuleValue::Bytes(err.into_bytes()),
        })
    }
}
