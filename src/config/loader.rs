//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::ports::FallbackPolicy;
use crate::error::{KilnError, KilnResult};

use super::types::Config;

/// Project config file name, relative to the project root
pub const PROJECT_CONFIG_FILE: &str = "kiln.toml";

/// Non-fatal configuration warning (e.g. an unknown key).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// Parse `path`, returning the config plus a warning for every key serde
/// did not consume.
pub fn load_with_warnings(path: &Path) -> KilnResult<(Config, Vec<ConfigWarning>)> {
    let source = fs::read_to_string(path)?;
    let config_error = |message: String| KilnError::Config {
        file: path.to_path_buf(),
        message,
    };

    let mut ignored = Vec::new();
    let config: Config =
        serde_ignored::deserialize(toml::de::Deserializer::new(&source), |key_path| {
            ignored.push(key_path.to_string());
        })
        .map_err(|err| config_error(err.to_string()))?;

    let warnings = ignored
        .iter()
        .map(|key_path| unknown_key_warning(path, &source, key_path))
        .collect();
    Ok((config, warnings))
}

fn unknown_key_warning(file: &Path, source: &str, key_path: &str) -> ConfigWarning {
    let key = key_path.rsplit('.').next().unwrap_or(key_path);
    ConfigWarning {
        key: key.to_string(),
        file: file.to_path_buf(),
        line: line_of(source, key),
        suggestion: closest_known_key(key).map(str::to_string),
    }
}

/// Load from project config, user config, or defaults
pub fn load_or_default(project_root: Option<&Path>) -> Config {
    let mut candidates = Vec::new();
    if let Some(root) = project_root {
        candidates.push(root.join(PROJECT_CONFIG_FILE));
    }
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("kiln/config.toml"));
    }

    for candidate in candidates {
        if !candidate.exists() {
            continue;
        }
        match load_with_warnings(&candidate) {
            Ok((config, warnings)) => {
                for warning in &warnings {
                    warn!(
                        key = %warning.key,
                        file = %warning.file.display(),
                        suggestion = warning.suggestion.as_deref().unwrap_or(""),
                        "unknown config key"
                    );
                }
                debug!(file = %candidate.display(), "loaded config");
                return with_env_overrides(config);
            }
            Err(err) => {
                warn!(file = %candidate.display(), error = %err, "ignoring unreadable config");
            }
        }
    }

    with_env_overrides(Config::default())
}

/// Apply environment variable overrides (KILN_* prefix)
pub fn with_env_overrides(mut config: Config) -> Config {
    // KILN_WATCH_JS_DEPENDENCIES
    if let Ok(val) = std::env::var("KILN_WATCH_JS_DEPENDENCIES") {
        config.watch.javascript_dependencies = val.to_lowercase() != "false" && val != "0";
    }

    // KILN_SCRIPT_EXTENSIONS (comma-separated)
    if let Ok(exts) = std::env::var("KILN_SCRIPT_EXTENSIONS") {
        let parsed: Vec<String> = exts
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !parsed.is_empty() {
            config.watch.script_extensions = parsed;
        }
    }

    // KILN_MODULE_FALLBACK
    if let Ok(policy) = std::env::var("KILN_MODULE_FALLBACK") {
        config.modules.fallback = match policy.to_lowercase().as_str() {
            "unsupported-only" | "unsupported_only" => FallbackPolicy::UnsupportedOnly,
            _ => FallbackPolicy::AnyFailure,
        };
    }

    config
}

fn line_of(source: &str, key: &str) -> Option<usize> {
    source
        .lines()
        .enumerate()
        .find(|(_, line)| line.trim_start().starts_with(key))
        .map(|(index, _)| index + 1)
}

const KNOWN_KEYS: &[&str] = &[
    "watch",
    "javascript_dependencies",
    "script_extensions",
    "exclude_dirs",
    "debounce_ms",
    "modules",
    "fallback",
];

/// Nearest known key within an edit distance of two.
fn closest_known_key(unknown: &str) -> Option<&'static str> {
    KNOWN_KEYS
        .iter()
        .map(|known| (*known, edit_distance(unknown, known)))
        .filter(|(_, distance)| *distance <= 2)
        .min_by_key(|(_, distance)| *distance)
        .map(|(known, _)| known)
}

/// Levenshtein distance over chars, single row.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == *cb {
                diagonal
            } else {
                1 + diagonal.min(above).min(row[j])
            };
            diagonal = above;
        }
    }

    row[b.len()]
}
