//! Production configuration system
//!
//! Provides centralized configuration management with:
//! - Environment variable support
//! - Config file loading (optional)
//! - Runtime defaults
//! - Validation and type safety

use crate::averager::Formula;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{info, warn};

const LOG_FORMATS: [&str; 2] = ["pretty", "json"];
const LOG_OUTPUTS: [&str; 3] = ["console", "file", "both"];
const MAX_LOOKBACK_DAYS: i64 = 365 * 100;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Oura API configuration
    pub api: ApiConfig,

    /// Analysis defaults
    pub analysis: AnalysisConfig,

    /// Output configuration
    pub output: OutputConfig,

    /// Paths configuration
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub tags_url: String,
    pub summary_base_url: String,
    pub timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub default_formula: Formula,
    pub lookback_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub json_pretty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub log_directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "WARN".to_string(),
                format: "pretty".to_string(),
                output: "console".to_string(),
            },
            api: ApiConfig {
                tags_url: "https://api.ouraring.com/v2/usercollection/tag".to_string(),
                summary_base_url: "https://api.ouraring.com/v1".to_string(),
                timeout_secs: 30,
                access_token: None,
            },
            analysis: AnalysisConfig {
                default_formula: Formula::Mean,
                lookback_days: 365 * 2,
            },
            output: OutputConfig { json_pretty: true },
            paths: PathsConfig {
                log_directory: PathBuf::from("logs"),
            },
        }
    }
}

impl Config {
    /// Load configuration from environment, file, and defaults
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        let config_paths = [
            PathBuf::from("oura-tags.toml"),
            PathBuf::from(".oura-tags.toml"),
            dirs::config_dir()
                .map(|d| d.join("oura-tags").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.is_file() {
                info!(config_file = %path.display(), "Loading configuration from file");
                config = Self::load_from_file(path)?;
                break;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // Logging overrides
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        // API overrides
        if let Ok(val) = env::var("OURA_ACCESS_TOKEN") {
            if !val.trim().is_empty() {
                self.api.access_token = Some(val);
            }
        }
        if let Ok(val) = env::var("OURA_TAGS_URL") {
            self.api.tags_url = val;
        }
        if let Ok(val) = env::var("OURA_SUMMARY_BASE_URL") {
            self.api.summary_base_url = val;
        }
        if let Ok(val) = env::var("OURA_TIMEOUT_SECS") {
            self.api.timeout_secs = val.parse().context("Invalid OURA_TIMEOUT_SECS")?;
        }

        // Analysis overrides
        if let Ok(val) = env::var("OURA_TAGS_FORMULA") {
            self.analysis.default_formula = val.parse().context("Invalid OURA_TAGS_FORMULA")?;
        }
        if let Ok(val) = env::var("OURA_TAGS_LOOKBACK_DAYS") {
            self.analysis.lookback_days = val.parse().context("Invalid OURA_TAGS_LOOKBACK_DAYS")?;
        }

        // Path overrides
        if let Ok(val) = env::var("OURA_TAGS_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.api.timeout_secs == 0 {
            return Err(anyhow::anyhow!("API timeout must be greater than 0 seconds"));
        }

        if self.analysis.lookback_days < 2 {
            return Err(anyhow::anyhow!(
                "Lookback must cover at least 2 days, got {}",
                self.analysis.lookback_days
            ));
        }

        if self.analysis.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(anyhow::anyhow!(
                "Lookback must not exceed {} days, got {}",
                MAX_LOOKBACK_DAYS,
                self.analysis.lookback_days
            ));
        }

        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Unknown log format '{}', expected one of {:?}",
                self.logging.format,
                LOG_FORMATS
            ));
        }

        if !LOG_OUTPUTS.contains(&self.logging.output.as_str()) {
            return Err(anyhow::anyhow!(
                "Unknown log output '{}', expected one of {:?}",
                self.logging.output,
                LOG_OUTPUTS
            ));
        }

        if self.analysis.lookback_days > 365 * 10 {
            warn!(
                lookback_days = self.analysis.lookback_days,
                "Lookback is very long, API requests may be slow"
            );
        }

        Ok(())
    }

    /// Save current configuration to file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!(path = %path.display(), "Configuration saved to file");

        Ok(())
    }

    /// Render as TOML, leaving the access token out
    pub fn to_toml(&self) -> Result<String> {
        let mut redacted = self.clone();
        redacted.api.access_token = None;
        toml::to_string_pretty(&redacted).context("Failed to serialize configuration")
    }
}

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration instance, falling back to defaults when loading fails
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| {
        Config::load().unwrap_or_else(|e| {
            eprintln!("Warning: {:#}. Using default configuration.", e);
            Config::default()
        })
    })
}
