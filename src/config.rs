/// Configuration system for diff-context
///
/// Supports loading from multiple sources with priority:
/// CLI args > Environment variables > Config file > Defaults
use crate::error::{ConfigError, ContextError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Limits applied by the AST context extractors
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Multi-file scheduling
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// Limits applied by the AST context extractors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Snippets longer than this many characters are hard-truncated
    #[serde(default = "default_max_snippet_chars")]
    pub max_snippet_chars: usize,

    /// Units spanning more lines than this are windowed around added lines
    #[serde(default = "default_max_block_lines")]
    pub max_block_lines: usize,

    /// Maximum syntax tree depth visited during traversal
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Deadline for parsing one source text or component descriptor
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Lines shown before and after each added line in a windowed snippet
    #[serde(default = "default_window_radius")]
    pub window_radius: usize,
}

/// Multi-file scheduling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuntimeConfig {
    /// Number of files analyzed concurrently by `extract_many`
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

// Default value functions
fn default_max_snippet_chars() -> usize {
    6_000
}

fn default_max_block_lines() -> usize {
    120
}

fn default_max_depth() -> usize {
    512
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_window_radius() -> usize {
    8
}

fn default_concurrency() -> usize {
    4
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_snippet_chars: default_max_snippet_chars(),
            max_block_lines: default_max_block_lines(),
            max_depth: default_max_depth(),
            timeout_ms: default_timeout_ms(),
            window_radius: default_window_radius(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

impl AnalysisConfig {
    /// Parse deadline as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validate the analysis limits. The four extraction limits must be
    /// positive; a zero window radius shows only the added lines.
    pub fn validate(&self) -> Result<(), ContextError> {
        let checks: [(&str, u64); 4] = [
            ("analysis.max_snippet_chars", self.max_snippet_chars as u64),
            ("analysis.max_block_lines", self.max_block_lines as u64),
            ("analysis.max_depth", self.max_depth as u64),
            ("analysis.timeout_ms", self.timeout_ms),
        ];

        for (key, value) in checks {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: "must be greater than 0".to_string(),
                }
                .into());
            }
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, ContextError> {
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
    pub fn load_or_default() -> Result<Self, ContextError> {
        let config_path = crate::paths::PlatformPaths::default_config_path();

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::info!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), ContextError> {
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
    pub fn validate(&self) -> Result<(), ContextError> {
        self.analysis.validate()?;

        if self.runtime.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                key: "runtime.concurrency".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Apply environment variable overrides. Unparsable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = env_number("DIFF_CONTEXT_MAX_SNIPPET_CHARS") {
            self.analysis.max_snippet_chars = v;
        }

        if let Some(v) = env_number("DIFF_CONTEXT_MAX_BLOCK_LINES") {
            self.analysis.max_block_lines = v;
        }

        if let Some(v) = env_number("DIFF_CONTEXT_MAX_DEPTH") {
            self.analysis.max_depth = v;
        }

        if let Some(v) = env_number("DIFF_CONTEXT_TIMEOUT_MS") {
            self.analysis.timeout_ms = v;
        }

        if let Some(v) = env_number("DIFF_CONTEXT_WINDOW_RADIUS") {
            self.analysis.window_radius = v;
        }

        if let Some(v) = env_number("DIFF_CONTEXT_CONCURRENCY") {
            self.runtime.concurrency = v;
        }
    }

    /// Create a new Config with defaults and environment overrides
    pub fn new() -> Result<Self, ContextError> {
        let mut config = Self::load_or_default()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
