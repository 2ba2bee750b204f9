// src/environment.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub dataset_path: PathBuf,
    pub log_path: PathBuf,
    pub provider: ProviderConfig,
    #[serde(default)]
    pub stream: StreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub plan_model: String,
    pub narration_model: String,
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,
    #[serde(default = "default_plan_temperature")]
    pub plan_temperature: f32,
    #[serde(default = "default_narration_temperature")]
    pub narration_temperature: f32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Upper bound for a single event write to the client
    pub write_timeout_ms: u64,
    /// Events buffered between the pipeline task and the response body
    pub channel_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            write_timeout_ms: 30_000,
            channel_capacity: 32,
        }
    }
}

impl StreamConfig {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

fn default_transcription_model() -> String {
    "whisper-1".to_string()
}

fn default_plan_temperature() -> f32 {
    0.1
}

fn default_narration_temperature() -> f32 {
    0.7
}

fn default_request_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: EnvironmentConfig,
    production: EnvironmentConfig,
}

impl EnvironmentConfig {
    /// Load configuration for the current environment from `config_path`
    pub fn load(config_path: &Path) -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        if !config_path.exists() {
            anyhow::bail!(
                "{} not found. Cannot start without configuration.",
                config_path.display()
            );
        }

        let config_content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::from_yaml(&config_content, &environment)
    }

    pub fn get_environment() -> String {
        std::env::var("CANDIDATE_QUERY_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    pub fn from_yaml(content: &str, environment: &str) -> Result<Self> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse configuration")?;

        let env_config = match environment {
            "production" => config_file.production,
            _ => config_file.local,
        };

        Ok(Self {
            dataset_path: Self::resolve_path(&env_config.dataset_path)?,
            log_path: Self::resolve_path(&env_config.log_path)?,
            ..env_config
        })
    }

    fn resolve_path(path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            let current_dir = std::env::current_dir().context("Failed to get current directory")?;
            Ok(current_dir.join(path))
        }
    }
}
