//! Configuration management for the archive localizer
//!
//! Every setting has a default, so no configuration file is needed. When one
//! exists it is read from the first of these locations:
//!
//! 1. `archive-localizer.toml` next to the executable
//! 2. `<user config dir>/archive-localizer/config.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::page::encoding::resolve_encoding;
use crate::app::{ClientConfig, PageConfig};
use crate::constants::{encoding, files, http, state};
use crate::errors::{ConfigError, ConfigResult};

/// Log levels accepted in `[logging] level`
const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// State file settings
    pub state: StateConfigToml,
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Page rewriting settings
    pub page: PageConfigToml,
    /// Run loop settings
    pub run: RunConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly state configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StateConfigToml {
    /// State file path (default: `state.json` next to the executable)
    pub file: Option<PathBuf>,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// User agent sent with every request
    pub user_agent: String,
    /// Request timeout in seconds (None = no timeout)
    pub request_timeout_secs: Option<u64>,
    /// Connect timeout in seconds (None = no timeout)
    pub connect_timeout_secs: Option<u64>,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            user_agent: http::USER_AGENT.to_string(),
            request_timeout_secs: None,
            connect_timeout_secs: None,
        }
    }
}

/// TOML-friendly page configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfigToml {
    /// Encoding label of pages that are not UTF-8
    pub source_encoding: String,
    /// Embed the download time in image filenames
    pub include_timestamp: bool,
    /// Suffix appended to a page's file name before it is overwritten
    pub backup_suffix: String,
}

impl Default for PageConfigToml {
    fn default() -> Self {
        Self {
            source_encoding: encoding::DEFAULT_SOURCE_ENCODING.to_string(),
            include_timestamp: true,
            backup_suffix: files::BACKUP_FILE_SUFFIX.to_string(),
        }
    }
}

/// TOML-friendly run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfigToml {
    /// Ask before stopping on Ctrl-C when running in a terminal
    pub confirm_stop: bool,
}

impl Default for RunConfigToml {
    fn default() -> Self {
        Self { confirm_stop: true }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads the first configuration file found, or the defaults
    ///
    /// Returns the configuration and the file it came from.
    pub async fn load() -> ConfigResult<(Self, Option<PathBuf>)> {
        for path in Self::search_paths()? {
            if path.is_file() {
                let config = Self::load_from_file(&path).await?;
                config.validate()?;
                return Ok((config, Some(path)));
            }
        }

        debug!("No config file found, using defaults");
        Ok((Self::default(), None))
    }

    /// Loads configuration from a TOML file
    pub async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        toml::from_str(&content).map_err(|source| ConfigError::InvalidFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Locations searched for a configuration file, in order
    fn search_paths() -> ConfigResult<Vec<PathBuf>> {
        let mut paths = vec![executable_dir()?.join(files::CONFIG_FILE_NAME)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(files::CONFIG_DIR_NAME).join("config.toml"));
        }
        Ok(paths)
    }

    /// Checks values that serde cannot check
    pub fn validate(&self) -> ConfigResult<()> {
        if resolve_encoding(&self.page.source_encoding).is_none() {
            return Err(ConfigError::InvalidValue {
                field: "page.source_encoding".to_string(),
                value: self.page.source_encoding.clone(),
                reason: "Unknown encoding label".to_string(),
            });
        }

        let suffix = &self.page.backup_suffix;
        if suffix.is_empty() || suffix.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue {
                field: "page.backup_suffix".to_string(),
                value: suffix.clone(),
                reason: "Must be non-empty and must not contain path separators".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                value: self.logging.level.clone(),
                reason: format!("Expected one of {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Path of the state file
    pub fn state_file(&self) -> ConfigResult<PathBuf> {
        match &self.state.file {
            Some(path) => Ok(path.clone()),
            None => Ok(executable_dir()?.join(state::STATE_FILE_NAME)),
        }
    }

    /// Runtime HTTP client configuration
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            user_agent: self.client.user_agent.clone(),
            request_timeout: self.client.request_timeout_secs.map(Duration::from_secs),
            connect_timeout: self.client.connect_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Runtime page transformer configuration
    pub fn page_config(&self) -> ConfigResult<PageConfig> {
        let source_encoding = resolve_encoding(&self.page.source_encoding).ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "page.source_encoding".to_string(),
                value: self.page.source_encoding.clone(),
                reason: "Unknown encoding label".to_string(),
            }
        })?;

        Ok(PageConfig {
            source_encoding,
            backup_suffix: self.page.backup_suffix.clone(),
        })
    }
}

/// Directory containing the running executable
pub fn executable_dir() -> ConfigResult<PathBuf> {
    let exe = std::env::current_exe().map_err(ConfigError::ExecutableDir)?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        ConfigError::ExecutableDir(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "executable has no parent directory",
        ))
    })
}
