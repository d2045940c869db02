/// Configuration system for repo2source
///
/// Supports loading from multiple sources with priority:
/// CLI args > Environment variables > Config file > Defaults
use crate::error::{ConfigError, Repo2SourceError};
use crate::indexer::DEFAULT_EXCLUDE_PATTERNS;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Parser service configuration
    #[serde(default)]
    pub parser: ParserConfig,

    /// Which repository files become model entries
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Where and how models are written
    #[serde(default)]
    pub output: OutputConfig,

    /// Repository-level parallelism
    #[serde(default)]
    pub workers: WorkerConfig,
}

/// Parser service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Parser service address, `host:port` or a full URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Timeout in seconds for a single file's parse call
    #[serde(default = "default_parse_timeout")]
    pub timeout_secs: u64,
}

/// File selection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Maximum file size to include (in bytes)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Glob patterns for vendored or generated files that are never source
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Number of prefix directories above each model file
    #[serde(default)]
    pub shard_depth: usize,

    /// Rebuild models whose file already exists
    #[serde(default)]
    pub overwrite_existing: bool,
}

/// Worker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Repositories transformed concurrently
    #[serde(default = "default_num_workers")]
    pub num_workers: usize,
}

// Default value functions
fn default_endpoint() -> String {
    "0.0.0.0:9432".to_string()
}

fn default_parse_timeout() -> u64 {
    50
}

fn default_max_file_size() -> u64 {
    1_048_576 // 1 MB
}

fn default_exclude_patterns() -> Vec<String> {
    DEFAULT_EXCLUDE_PATTERNS
        .iter()
        .map(|p| p.to_string())
        .collect()
}

fn default_num_workers() -> usize {
    1
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_parse_timeout(),
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            shard_depth: 0,
            overwrite_existing: false,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            num_workers: default_num_workers(),
        }
    }
}

impl ParserConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, Repo2SourceError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default location or create default
    pub fn load_or_default() -> Result<Self, Repo2SourceError> {
        let config_path = crate::paths::PlatformPaths::default_config_path();

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::debug!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), Repo2SourceError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::SaveFailed(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Repo2SourceError> {
        if self.parser.endpoint.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "parser.endpoint".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        if self.parser.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "parser.timeout_secs".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.selection.max_file_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "selection.max_file_size".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.workers.num_workers == 0 {
            return Err(ConfigError::InvalidValue {
                key: "workers.num_workers".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("REPO2SOURCE_ENDPOINT") {
            self.parser.endpoint = endpoint;
        }

        if let Ok(timeout) = std::env::var("REPO2SOURCE_TIMEOUT")
            && let Ok(secs) = timeout.parse()
        {
            self.parser.timeout_secs = secs;
        }

        if let Ok(max_size) = std::env::var("REPO2SOURCE_MAX_FILE_SIZE")
            && let Ok(size) = max_size.parse()
        {
            self.selection.max_file_size = size;
        }

        if let Ok(depth) = std::env::var("REPO2SOURCE_SHARD_DEPTH")
            && let Ok(depth) = depth.parse()
        {
            self.output.shard_depth = depth;
        }

        if let Ok(overwrite) = std::env::var("REPO2SOURCE_OVERWRITE") {
            let v = overwrite.trim().to_lowercase();
            self.output.overwrite_existing = matches!(v.as_str(), "1" | "true" | "yes" | "on");
        }

        if let Ok(workers) = std::env::var("REPO2SOURCE_WORKERS")
            && let Ok(workers) = workers.parse()
        {
            self.workers.num_workers = workers;
        }
    }

    /// Create a new Config with defaults and environment overrides
    pub fn new() -> Result<Self, Repo2SourceError> {
        let mut config = Self::load_or_default()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}
