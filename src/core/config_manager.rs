// src/core/config_manager.rs
//! Unified configuration management: defaults, optional YAML file, environment

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

const DEFAULT_CONFIG_FILE: &str = "job_finder.yaml";
const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;
const DEFAULT_LOG_FILE: &str = "/tmp/job_finder.log";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub service: ServiceConfig,
    pub environment: EnvironmentConfig,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api_base_url: String,
    pub poll_interval: Duration,
    /// `None` means requests may hang indefinitely; a hung poll only delays its own tick.
    pub request_timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub export_dir: PathBuf,
    pub log_file: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api_base_url: Option<String>,
    poll_interval_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    export_dir: Option<PathBuf>,
    log_file: Option<PathBuf>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                api_base_url: DEFAULT_API_BASE_URL.to_string(),
                poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
                request_timeout: None,
            },
            environment: EnvironmentConfig {
                export_dir: PathBuf::from("."),
                log_file: PathBuf::from(DEFAULT_LOG_FILE),
            },
        }
    }
}

impl ConfigManager {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` for environment variables
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        let config_path = lookup("JOB_FINDER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if let Some(file) = Self::read_config_file(&config_path)? {
            config.apply_file(file)?;
        }

        config.apply_env(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn read_config_file(path: &Path) -> Result<Option<ConfigFile>> {
        if !path.exists() {
            return Ok(None);
        }

        info!("Loading configuration file: {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let file: ConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(file))
    }

    fn apply_file(&mut self, file: ConfigFile) -> Result<()> {
        if let Some(url) = file.api_base_url {
            self.service.api_base_url = url;
        }
        if let Some(secs) = file.poll_interval_secs {
            self.service.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = file.request_timeout_secs {
            self.service.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(dir) = file.export_dir {
            self.environment.export_dir = dir;
        }
        if let Some(path) = file.log_file {
            self.environment.log_file = path;
        }
        Ok(())
    }

    fn apply_env(&mut self, lookup: &impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("JOB_FINDER_API_URL") {
            self.service.api_base_url = url;
        }
        if let Some(raw) = lookup("JOB_FINDER_POLL_INTERVAL_SECS") {
            let secs = raw
                .parse::<u64>()
                .context("JOB_FINDER_POLL_INTERVAL_SECS must be a whole number of seconds")?;
            self.service.poll_interval = Duration::from_secs(secs);
        }
        if let Some(dir) = lookup("JOB_FINDER_EXPORT_DIR") {
            self.environment.export_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("JOB_FINDER_LOG_FILE") {
            self.environment.log_file = PathBuf::from(path);
        }
        Ok(())
    }

    /// Apply command-line overrides on top of the loaded configuration
    pub fn with_overrides(mut self, api_url: Option<String>, export_dir: Option<PathBuf>) -> Self {
        if let Some(url) = api_url {
            self.service.api_base_url = normalize_base_url(&url);
        }
        if let Some(dir) = export_dir {
            self.environment.export_dir = dir;
        }
        self
    }

    fn validate(&mut self) -> Result<()> {
        self.service.api_base_url = normalize_base_url(&self.service.api_base_url);
        if self.service.api_base_url.is_empty() {
            anyhow::bail!("api_base_url must not be empty");
        }
        if self.service.poll_interval.is_zero() {
            anyhow::bail!("poll interval must be at least one second");
        }
        Ok(())
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
