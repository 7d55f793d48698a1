// src/core/config_manager.rs
//! Configuration: optional config.yaml per environment, then env overrides

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::core::analysis_client::DEFAULT_TIMEOUT_SECS;
use crate::extraction::text_extractor::DEFAULT_TIMEOUT_MS;

pub const CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_STORAGE_PATH: &str = ".resume-radar/storage.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub api_base_url: String,
    pub storage_path: PathBuf,
    pub extraction_timeout_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            extraction_timeout_ms: DEFAULT_TIMEOUT_MS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    local: Option<EnvironmentConfig>,
    production: Option<EnvironmentConfig>,
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: String,
    pub settings: EnvironmentConfig,
}

impl ConfigManager {
    /// Load configuration for the current environment from `config.yaml` in
    /// the working directory, if present.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::parse_config(&content, &environment)?
        } else {
            EnvironmentConfig::default()
        };

        if let Ok(url) = std::env::var("RESUME_RADAR_API_URL") {
            settings.api_base_url = url;
        }
        if let Ok(path) = std::env::var("RESUME_RADAR_STORAGE") {
            settings.storage_path = PathBuf::from(path);
        }

        settings.storage_path = Self::resolve_path(&settings.storage_path)?;

        Ok(Self {
            environment,
            settings,
        })
    }

    fn get_environment() -> String {
        std::env::var("RESUME_RADAR_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    /// Pick the section for `environment`; a missing section means defaults.
    pub fn parse_config(content: &str, environment: &str) -> Result<EnvironmentConfig> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config.yaml")?;

        let section = match environment {
            "production" => config_file.production,
            _ => config_file.local,
        };

        Ok(section.unwrap_or_default())
    }

    fn resolve_path(path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            let current_dir = std::env::current_dir().context("Failed to get current directory")?;
            Ok(current_dir.join(path))
        }
    }

    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_millis(self.settings.extraction_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.settings.request_timeout_secs)
    }
}
