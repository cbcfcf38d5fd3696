//! Configuration loading for searchmig.
//!
//! Layered config: defaults -> config file -> env vars. The config file
//! lives under the platform config dir (e.g. `~/.config/searchmig/config.toml`
//! on Linux); environment variables use the `SEARCHMIG_` prefix.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::TypesError;

/// Reindex tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReindexSettings {
    /// Documents per bulk request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Attempts for a transient engine failure before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Upper bound for exponential backoff between attempts (ms)
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_batch_size() -> usize {
    100
}

fn default_max_retries() -> u32 {
    3
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for ReindexSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl ReindexSettings {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be > 0".to_string());
        }
        if self.max_retries == 0 {
            return Err("max_retries must be > 0".to_string());
        }
        if self.max_backoff_ms == 0 {
            return Err("max_backoff_ms must be > 0".to_string());
        }
        Ok(())
    }
}

/// Main application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the RocksDB metadata store directory
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Reindex tuning
    #[serde(default)]
    pub reindex: ReindexSettings,
}

fn default_db_path() -> String {
    ProjectDirs::from("", "", "searchmig")
        .map(|p| p.data_local_dir().join("db"))
        .unwrap_or_else(|| PathBuf::from("./data"))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level(),
            reindex: ReindexSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file under the platform config dir
    /// 3. Explicitly passed config file (optional)
    /// 4. Environment variables (SEARCHMIG_*)
    pub fn load(explicit_config_path: Option<&str>) -> Result<Self, TypesError> {
        let config_dir = ProjectDirs::from("", "", "searchmig")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("db_path", default_db_path())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("reindex.batch_size", default_batch_size() as i64)
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("reindex.max_retries", default_max_retries() as i64)
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("reindex.max_backoff_ms", default_max_backoff_ms() as i64)
            .map_err(|e| TypesError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = explicit_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("SEARCHMIG")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| TypesError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| TypesError::Config(e.to_string()))?;

        settings.reindex.validate().map_err(TypesError::Config)?;

        Ok(settings)
    }

    /// Expand a leading `~/` in db_path to the home directory.
    pub fn expanded_db_path(&self) -> PathBuf {
        if let Some(rest) = self.db_path.strip_prefix("~/") {
            if let Ok(home) = std::env::var("HOME") {
                return PathBuf::from(home).join(rest);
            }
        }
        PathBuf::from(&self.db_path)
    }
}
