// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration management.
//!
//! Configuration is stored in `.civreg/config.toml` next to the local
//! registry database:
//! - `server`: base URL of the registry server
//! - `[network]`: request and probe timeouts
//! - `[monitor]`: connectivity polling and debounce
//! - `[sync]`: lease length, background interval and dead-letter threshold
//!
//! Every field has a default, so a config holding only `server` is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};

const WORK_DIR_NAME: &str = ".civreg";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "registry.db";
const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Client configuration stored in `.civreg/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the registry server, e.g. `http://localhost:3000`.
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Timeouts for calls to the registry server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Timeout for a submission or search request (default: 10000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Timeout for a reachability probe (default: 2000).
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

/// Connectivity monitor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Delay between reachability probes (default: 5000).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Consecutive disagreeing probes needed to flip the state (default: 2).
    #[serde(default = "default_settle_samples")]
    pub settle_samples: u32,
}

/// Sync engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Lifetime of the cross-process sync lease (default: 120).
    #[serde(default = "default_lease_secs")]
    pub lease_secs: u64,
    /// Interval between background sync passes in `civregd` (default: 300).
    #[serde(default = "default_background_interval_secs")]
    pub background_interval_secs: u64,
    /// Rejections after which an entry is dead-lettered. 0 = retry forever.
    #[serde(default)]
    pub dead_letter_after: u32,
}

fn default_server() -> String {
    "http://localhost:3000".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_probe_timeout_ms() -> u64 {
    2_000
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_settle_samples() -> u32 {
    2
}

fn default_lease_secs() -> u64 {
    120
}

fn default_background_interval_secs() -> u64 {
    300
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            request_timeout_ms: default_request_timeout_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            poll_interval_ms: default_poll_interval_ms(),
            settle_samples: default_settle_samples(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            lease_secs: default_lease_secs(),
            background_interval_secs: default_background_interval_secs(),
            dead_letter_after: 0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: default_server(),
            network: NetworkConfig::default(),
            monitor: MonitorConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl NetworkConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl SyncConfig {
    pub fn lease(&self) -> Duration {
        Duration::from_secs(self.lease_secs)
    }

    pub fn background_interval(&self) -> Duration {
        Duration::from_secs(self.background_interval_secs)
    }
}

/// Check that a server URL is an absolute http(s) URL.
pub fn validate_server_url(url: &str) -> Result<()> {
    let parsed = reqwest::Url::parse(url).map_err(|e| Error::InvalidServerUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::InvalidServerUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{other}', expected http or https"),
        }),
    }
}

impl Config {
    /// Creates a config pointing at `server`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidServerUrl`] if `server` is not an http(s) URL.
    pub fn new(server: &str) -> Result<Self> {
        validate_server_url(server)?;
        Ok(Config {
            server: server.trim_end_matches('/').to_string(),
            ..Config::default()
        })
    }

    /// Loads configuration from the given `.civreg/` directory.
    ///
    /// `CIVREG_SERVER` overrides the stored server URL.
    pub fn load(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        if let Some(server) = env::server_override() {
            validate_server_url(&server)?;
            config.server = server.trim_end_matches('/').to_string();
        }
        Ok(config)
    }

    /// Saves configuration to the given `.civreg/` directory.
    pub fn save(&self, work_dir: &Path) -> Result<()> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }
}

/// Find the .civreg directory by walking up from `start`
pub fn find_work_dir_from(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let work_dir = current.join(WORK_DIR_NAME);
        if work_dir.join(CONFIG_FILE_NAME).is_file() {
            return Ok(work_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

/// Find the .civreg directory by walking up from the current directory
pub fn find_work_dir() -> Result<PathBuf> {
    find_work_dir_from(&std::env::current_dir()?)
}

/// Get the database path inside a work directory
pub fn get_db_path(work_dir: &Path) -> PathBuf {
    work_dir.join(DB_FILE_NAME)
}

/// Initialize a new .civreg directory at the given path
pub fn init_work_dir(path: &Path, server: &str) -> Result<PathBuf> {
    let work_dir = path.join(WORK_DIR_NAME);

    if work_dir.join(CONFIG_FILE_NAME).exists() {
        return Err(Error::AlreadyInitialized(work_dir.display().to_string()));
    }

    let config = Config::new(server)?;
    fs::create_dir_all(&work_dir)?;
    config.save(&work_dir)?;
    write_gitignore(&work_dir)?;

    Ok(work_dir)
}

/// Write a .gitignore file to the work directory.
///
/// The database and daemon runtime files hold personal data and never belong
/// in version control.
pub fn write_gitignore(work_dir: &Path) -> Result<()> {
    let gitignore_path = work_dir.join(GITIGNORE_FILE_NAME);
    let content = "# Local registry data\nregistry.db\nregistry.db-wal\nregistry.db-shm\n\n# Background worker\ndaemon.log\ndaemon.pid\ndaemon.lock\n";
    fs::write(&gitignore_path, content)?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
