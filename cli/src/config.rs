//! Application configuration with TOML file support.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use votecheck_utils::LogFormat;
use votecheck_verification::WorkflowOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// How officer credentials are checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Argon2id hashes from the officer and operator directory files.
    #[default]
    Directory,
    /// Accept any non-empty password after a fixed delay. Demos only.
    Simulated,
}

/// Configuration for the `votecheck` binary.
///
/// Loaded from a TOML file via [`AppConfig::from_toml_file`]; every field
/// has a default, so an empty file is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the LMDB record store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in MiB.
    #[serde(default = "default_map_size_mib")]
    pub map_size_mib: usize,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub auth_mode: AuthMode,

    /// Password directory for election officers.
    #[serde(default = "default_officers_file")]
    pub officers_file: PathBuf,

    /// Password directory for dashboard operators.
    #[serde(default = "default_operators_file")]
    pub operators_file: PathBuf,

    /// Delay of the simulated authenticator.
    #[serde(default = "default_simulated_auth_delay_ms")]
    pub simulated_auth_delay_ms: u64,

    /// Percent added per progress tick while processing.
    #[serde(default = "default_progress_step")]
    pub progress_step: u8,

    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./votecheck_data")
}

fn default_map_size_mib() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_officers_file() -> PathBuf {
    PathBuf::from("officers.toml")
}

fn default_operators_file() -> PathBuf {
    PathBuf::from("operators.toml")
}

fn default_simulated_auth_delay_ms() -> u64 {
    1000
}

fn default_progress_step() -> u8 {
    10
}

fn default_progress_interval_ms() -> u64 {
    300
}

// ── Impl ───────────────────────────────────────────────────────────────

impl AppConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("AppConfig is always serializable to TOML")
    }

    /// LMDB map size in bytes.
    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mib.saturating_mul(1024 * 1024)
    }

    pub fn simulated_auth_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_auth_delay_ms)
    }

    pub fn workflow_options(&self) -> WorkflowOptions {
        WorkflowOptions {
            progress_step: self.progress_step,
            progress_interval: Duration::from_millis(self.progress_interval_ms),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size_mib: default_map_size_mib(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            auth_mode: AuthMode::default(),
            officers_file: default_officers_file(),
            operators_file: default_operators_file(),
            simulated_auth_delay_ms: default_simulated_auth_delay_ms(),
            progress_step: default_progress_step(),
            progress_interval_ms: default_progress_interval_ms(),
        }
    }
}
