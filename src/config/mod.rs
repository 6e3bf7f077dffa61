//! Configuration module
//!
//! Loads user settings and resolves resources that ship next to the
//! executable.

pub mod settings;

use std::path::{Path, PathBuf};

pub use settings::{RawSettings, Settings, TargetProfile};

/// Default settings file name
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Directory holding the running executable, or the working directory if
/// it cannot be determined
pub fn base_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Resolve a resource path. Absolute paths are kept as they are; relative
/// ones are taken from `base`.
pub fn resource_path(base: &Path, relative: &Path) -> PathBuf {
    if relative.is_absolute() {
        relative.to_path_buf()
    } else {
        base.join(relative)
    }
}

/// Settings file to load: the explicit argument if given, otherwise
/// `config.json` next to the executable
pub fn config_path(arg: Option<&str>) -> PathBuf {
    match arg {
        Some(path) => PathBuf::from(path),
        None => base_dir().join(CONFIG_FILE_NAME),
    }
}
