//! Configuration for the formatter integration.
//!
//! Settings keep the camelCase names they have always had in editor
//! configuration, so the same object round-trips through a `.wpifmt.toml`
//! file, LSP initialization options, and `workspace/didChangeConfiguration`
//! payloads. Later sources replace earlier ones wholesale.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name looked up when no explicit configuration path is given.
pub const CONFIG_FILE_NAME: &str = ".wpifmt.toml";

/// Default formatter executable.
pub const DEFAULT_TOOL: &str = "wpiformat";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// User-facing settings, named exactly as in the editor configuration.
///
/// Unknown keys are rejected rather than defaulted, so a payload that wraps
/// the settings in a section name is not mistaken for an empty settings
/// object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Config {
    /// Run the formatter whenever an eligible document is saved.
    pub run_format_on_save: bool,
    /// Save the document before an explicitly requested format run.
    pub save_on_format_request: bool,
    /// Rewrite CRLF line endings to LF as part of every save.
    #[serde(rename = "forceLFOnSave")]
    pub force_lf_on_save: bool,
    /// File name globs exempt from line-ending normalization.
    #[serde(rename = "ignoreForceLFSaveFiles")]
    pub ignore_force_lf_save_files: Vec<String>,
    /// Formatter executable; a bare name is resolved on PATH.
    pub tool: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            run_format_on_save: true,
            save_on_format_request: false,
            force_lf_on_save: false,
            ignore_force_lf_save_files: Vec::new(),
            tool: DEFAULT_TOOL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit TOML file.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load configuration for a run rooted at `dir`.
    ///
    /// With an explicit `path` the file must exist and parse. Otherwise the
    /// nearest `.wpifmt.toml` found walking upward from `dir` is used, and
    /// built-in defaults apply when none exists.
    pub fn load(path: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        match path {
            Some(explicit) => Self::load_file(explicit),
            None => match discover_config_file(dir) {
                Some(found) => Self::load_file(&found),
                None => Ok(Self::default()),
            },
        }
    }

    /// Replace this configuration from a JSON settings payload, as delivered
    /// in LSP initialization options or a configuration-change notification.
    /// Returns whether the payload was a recognizable settings object.
    pub fn apply_json(&mut self, value: &serde_json::Value) -> bool {
        match serde_json::from_value::<Config>(value.clone()) {
            Ok(config) => {
                *self = config;
                true
            }
            Err(e) => {
                log::warn!("ignoring unrecognized settings payload: {e}");
                false
            }
        }
    }
}

/// Walk upward from `dir` looking for [`CONFIG_FILE_NAME`].
pub fn discover_config_file(dir: &Path) -> Option<PathBuf> {
    for ancestor in dir.ancestors() {
        let candidate = ancestor.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}
