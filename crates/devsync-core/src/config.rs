//! Configuration module for devsync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for devsync.
///
/// Missing sections and fields fall back to their defaults, so a config file
/// only needs the values it overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub agent: AgentConfig,
    pub logging: LoggingConfig,
}

/// Volume discovery and resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Compose file read when no explicit volume paths are given.
    pub compose_file: PathBuf,
    /// Fail instead of skipping volumes that cannot be classified.
    pub strict: bool,
}

/// Sync agent folder configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Directory the rendered `folders.json` is written to.
    pub config_dir: PathBuf,
    /// Seconds between full rescans of each watched folder.
    pub rescan_interval_s: u32,
    /// Seconds the agent's watcher accumulates changes before syncing.
    pub fs_watcher_delay_s: u32,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path`, or `Ok(None)` when there is no file there.
    ///
    /// Unlike a missing file, an unreadable or malformed one is an error.
    pub fn load_if_present(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/devsync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("devsync")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            compose_file: PathBuf::from("docker-compose.yml"),
            strict: false,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            config_dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("devsync")
                .join("agent"),
            rescan_interval_s: 3600,
            fs_watcher_delay_s: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"agent.rescan_interval_s"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- sync ---
        if self.sync.compose_file.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "sync.compose_file".into(),
                message: "must not be empty".into(),
            });
        }

        // --- agent ---
        if self.agent.config_dir.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "agent.config_dir".into(),
                message: "must not be empty".into(),
            });
        }
        if self.agent.rescan_interval_s == 0 {
            errors.push(ValidationError {
                field: "agent.rescan_interval_s".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.agent.fs_watcher_delay_s == 0 {
            errors.push(ValidationError {
                field: "agent.fs_watcher_delay_s".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use devsync_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .sync_compose_file(PathBuf::from("compose.yaml"))
///     .sync_strict(true)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- sync ---

    pub fn sync_compose_file(mut self, path: PathBuf) -> Self {
        self.config.sync.compose_file = path;
        self
    }

    pub fn sync_strict(mut self, strict: bool) -> Self {
        self.config.sync.strict = strict;
        self
    }

    // --- agent ---

    pub fn agent_config_dir(mut self, dir: PathBuf) -> Self {
        self.config.agent.config_dir = dir;
        self
    }

    pub fn agent_rescan_interval_s(mut self, seconds: u32) -> Self {
        self.config.agent.rescan_interval_s = seconds;
        self
    }

    pub fn agent_fs_watcher_delay_s(mut self, seconds: u32) -> Self {
        self.config.agent.fs_watcher_delay_s = seconds;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
