//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports TOML and JSON formats
//!
//! ## Environment Variables
//! - `HARVESTER_LISTEN_ADDR`: HTTP listen address
//! - `HARVESTER_DB_PATH`: Database file path (required)
//! - `HARVESTER_DB_POOL_SIZE`: Connection pool size
//! - `HARVESTER_REWARDS_BASE_URL`: Rewards API base URL
//! - `HARVESTER_REQUEST_TIMEOUT_SECS`: Per-call deadline for remote calls
//! - `HARVESTER_HARVEST_CRON`: Cron expression for the harvest job
//! - `HARVESTER_BONUS_CARDS_CRON`: Cron expression for the bonus-card job
//! - `HARVESTER_JOB_TIMEOUT_SECS`: Timeout for one job cycle
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.toml` or `./config.json`
//! 2. `./harvester.toml` or `./harvester.json`
//! 3. `../config.toml` or `../config.json`

use std::path::{Path, PathBuf};

use harvester_domain::{HarvesterError, Result};
use serde::Deserialize;

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

/// Database settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Remote rewards API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RewardsConfig {
    #[serde(default = "default_rewards_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Job scheduling settings.
#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    #[serde(default = "default_harvest_cron")]
    pub harvest_cron: String,
    #[serde(default = "default_bonus_cards_cron")]
    pub bonus_cards_cron: String,
    #[serde(default = "default_job_timeout_secs")]
    pub job_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { listen_addr: default_listen_addr() }
    }
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            base_url: default_rewards_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            harvest_cron: default_harvest_cron(),
            bonus_cards_cron: default_bonus_cards_cron(),
            job_timeout_secs: default_job_timeout_secs(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HarvesterConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub rewards: RewardsConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".into()
}

fn default_pool_size() -> u32 {
    4
}

fn default_rewards_base_url() -> String {
    "https://tiantang.mogencloud.com".into()
}

fn default_request_timeout_secs() -> u64 {
    30
}

// 08:00 and 08:30 every day.
fn default_harvest_cron() -> String {
    "0 0 8 * * *".into()
}

fn default_bonus_cards_cron() -> String {
    "0 30 8 * * *".into()
}

fn default_job_timeout_secs() -> u64 {
    120
}

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `HarvesterError::Config` if configuration cannot be loaded from
/// either source.
pub fn load() -> Result<HarvesterConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// `HARVESTER_DB_PATH` must be present; every other variable falls back to
/// its default.
///
/// # Errors
/// Returns `HarvesterError::Config` if required variables are missing or
/// have invalid values.
pub fn load_from_env() -> Result<HarvesterConfig> {
    let db_path = env_var("HARVESTER_DB_PATH")?;
    let pool_size = env_parsed("HARVESTER_DB_POOL_SIZE", default_pool_size())?;

    Ok(HarvesterConfig {
        server: ServerConfig {
            listen_addr: env_or("HARVESTER_LISTEN_ADDR", default_listen_addr()),
        },
        database: DatabaseConfig { path: db_path, pool_size },
        rewards: RewardsConfig {
            base_url: env_or("HARVESTER_REWARDS_BASE_URL", default_rewards_base_url()),
            request_timeout_secs: env_parsed(
                "HARVESTER_REQUEST_TIMEOUT_SECS",
                default_request_timeout_secs(),
            )?,
        },
        jobs: JobsConfig {
            harvest_cron: env_or("HARVESTER_HARVEST_CRON", default_harvest_cron()),
            bonus_cards_cron: env_or("HARVESTER_BONUS_CARDS_CRON", default_bonus_cards_cron()),
            job_timeout_secs: env_parsed(
                "HARVESTER_JOB_TIMEOUT_SECS",
                default_job_timeout_secs(),
            )?,
        },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Supports TOML and
/// JSON (detected by file extension).
///
/// # Errors
/// Returns `HarvesterError::Config` if the file is missing or invalid.
pub fn load_from_file(path: Option<PathBuf>) -> Result<HarvesterConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(HarvesterError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            HarvesterError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| HarvesterError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<HarvesterConfig> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(contents)
            .map_err(|e| HarvesterError::Config(format!("Invalid TOML config: {e}"))),
        Some("json") => serde_json::from_str(contents)
            .map_err(|e| HarvesterError::Config(format!("Invalid JSON config: {e}"))),
        other => Err(HarvesterError::Config(format!(
            "Unsupported config format: {other:?}"
        ))),
    }
}

fn probe_config_paths() -> Option<PathBuf> {
    const CANDIDATES: [&str; 6] = [
        "config.toml",
        "config.json",
        "harvester.toml",
        "harvester.json",
        "../config.toml",
        "../config.json",
    ];

    CANDIDATES.iter().map(PathBuf::from).find(|p| p.exists())
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| HarvesterError::Config(format!("Missing environment variable: {name}")))
}

fn env_or(name: &str, default: String) -> String {
    std::env::var(name).unwrap_or(default)
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|e| HarvesterError::Config(format!("Invalid value for {name}: {e}"))),
        Err(_) => Ok(default),
    }
}
