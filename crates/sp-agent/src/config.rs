//! Agent configuration, loadable from TOML.

use std::path::Path;

use serde::Deserialize;
use sp_inference::LlmConfig;

/// Top-level configuration for the agent binary.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Run the reflection pass after every classification.
    #[serde(default = "default_run_reflection")]
    pub run_reflection: bool,
    /// Language-model endpoint settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Instance catalog settings.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Process-log settings.
    #[serde(default)]
    pub log: LogConfig,
}

fn default_run_reflection() -> bool {
    true
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            run_reflection: default_run_reflection(),
            llm: LlmConfig::default(),
            catalog: CatalogConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// Where the instance catalog lives and how it is pooled.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// CSV fixture loaded at startup.
    #[serde(default = "default_csv_path")]
    pub csv_path: String,
    /// SQLite database file (created if missing).
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Connection pool bound.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_csv_path() -> String {
    "data/instance_catalog.csv".into()
}
fn default_database_path() -> String {
    "stackpilot.db".into()
}
fn default_max_connections() -> u32 {
    5
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            database_path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Process-log destination.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Directory for the rotating log files.
    #[serde(default = "default_log_dir")]
    pub dir: String,
}

fn default_log_dir() -> String {
    "logs".into()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
        }
    }
}

impl AgentConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }
}
