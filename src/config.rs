// ABOUTME: Configuration loading and validation for the guest-manager binary.
// ABOUTME: Reads GUEST_MANAGER_* environment variables; the data directory must be absolute.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GUEST_MANAGER_HOME must be an absolute path, got {0:?}")]
    RelativeHome(String),

    #[error("{0} is set but empty")]
    Empty(&'static str),
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Directory holding the persisted keys.
    pub home: PathBuf,
    /// Default destination for backup and CSV files.
    pub export_dir: PathBuf,
}

impl ManagerConfig {
    /// Load configuration from the process environment.
    ///
    /// Environment variables:
    /// - GUEST_MANAGER_HOME: data directory (default: ~/.guest-manager)
    /// - GUEST_MANAGER_EXPORT_DIR: where export/csv write files (default: current directory)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let home = match lookup("GUEST_MANAGER_HOME") {
            Some(raw) if raw.is_empty() => return Err(ConfigError::Empty("GUEST_MANAGER_HOME")),
            Some(raw) => {
                let path = PathBuf::from(&raw);
                if !path.is_absolute() {
                    return Err(ConfigError::RelativeHome(raw));
                }
                path
            }
            None => lookup("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".guest-manager"),
        };

        let export_dir = match lookup("GUEST_MANAGER_EXPORT_DIR") {
            Some(raw) if raw.is_empty() => {
                return Err(ConfigError::Empty("GUEST_MANAGER_EXPORT_DIR"));
            }
            Some(raw) => PathBuf::from(raw),
            None => PathBuf::from("."),
        };

        Ok(Self { home, export_dir })
    }
}
