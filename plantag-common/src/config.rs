//! Configuration loading and identity store path resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable consulted for the identity store location
pub const STORE_ENV_VAR: &str = "PLANTAG_STORE";

/// File name of the identity store snapshot inside the data directory
pub const STORE_FILE_NAME: &str = "identity_store.json";

/// Logging section of the TOML configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive (overridden by `RUST_LOG`)
    pub level: String,
    /// Emit ANSI colour codes
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            ansi: true,
        }
    }
}

/// Top-level TOML configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Identity store snapshot path
    pub store_path: Option<PathBuf>,
    /// Optional TOML file holding the structural codification table
    pub codification_file: Option<PathBuf>,
    /// Number of identity resolves between store flushes
    pub flush_every: usize,
    /// Worker count for parallel batches
    pub workers: usize,
    /// Discipline code used when nothing else resolves one
    pub default_discipline: String,
    /// Entity code used when nothing else resolves one
    pub default_entity: String,
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            codification_file: None,
            flush_every: 500,
            workers: 4,
            default_discipline: "ME".to_string(),
            default_entity: "SDE".to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.flush_every == 0 {
            return Err(Error::Config("flush_every must be at least 1".to_string()));
        }
        if self.workers == 0 {
            return Err(Error::Config("workers must be at least 1".to_string()));
        }
        if self.default_discipline.trim().is_empty() {
            return Err(Error::Config("default_discipline must not be empty".to_string()));
        }
        if self.default_entity.trim().is_empty() {
            return Err(Error::Config("default_entity must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Load and validate a TOML configuration file
///
/// A missing file yields the defaults; an unreadable or invalid file is an error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
    config.validate()?;

    tracing::info!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Write configuration atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Serialization(format!("Serialize TOML failed: {}", e)))?;
    write_atomic(path, content.as_bytes())
}

/// Write bytes to `path` through a sibling temp file and a rename
///
/// Readers never observe a half-written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    std::fs::write(&temp_path, bytes)?;
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(Error::Io(e));
    }
    Ok(())
}

/// Identity store path resolution, priority order:
/// 1. Caller-supplied argument (highest priority)
/// 2. Environment variable
/// 3. TOML config `store_path`
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_store_path(
    cli_arg: Option<&str>,
    env_var_name: &str,
    config: Option<&TomlConfig>,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = config.and_then(|c| c.store_path.clone()) {
        return path;
    }

    default_store_path()
}

/// Get OS-dependent default store path
pub fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("plantag"))
        .unwrap_or_else(|| PathBuf::from("./plantag_data"))
        .join(STORE_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(TomlConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_flush_rejected() {
        let config = TomlConfig {
            flush_every: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_default_store_path_file_name() {
        assert!(default_store_path().ends_with(STORE_FILE_NAME));
    }
}
