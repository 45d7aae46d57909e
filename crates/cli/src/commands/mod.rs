// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod init;
pub mod pending;
pub mod requeue;
pub mod search;
pub mod status;
pub mod submit;
pub mod sync;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cr_core::Database;
use serde::Serialize;

use crate::config::{find_work_dir_from, get_db_path, Config};
use crate::error::Result;
use crate::sync::{
    ConnectivityMonitor, EngineSettings, HttpApi, HttpProbe, LocalStore, MonitorSettings,
};

/// Holder name prefix for sync leases taken by the CLI.
const LEASE_HOLDER: &str = "civreg";

/// A located `.civreg/` directory and its configuration.
pub struct Context {
    pub work_dir: PathBuf,
    pub config: Config,
}

impl Context {
    /// Find the work directory at or above `base` and load its config.
    pub fn locate(base: &Path) -> Result<Self> {
        let work_dir = find_work_dir_from(base)?;
        let config = Config::load(&work_dir)?;
        Ok(Context { work_dir, config })
    }

    pub fn open_db(&self) -> Result<Database> {
        Ok(Database::open(&get_db_path(&self.work_dir))?)
    }

    pub fn open_store(&self) -> Result<LocalStore> {
        LocalStore::open(&get_db_path(&self.work_dir))
    }

    /// A store opened on first use, for commands that can finish online
    /// without touching local storage.
    pub fn deferred_store(&self) -> LocalStore {
        LocalStore::open_deferred(&get_db_path(&self.work_dir))
    }

    pub fn api(&self) -> Result<Arc<HttpApi>> {
        let api = HttpApi::new(&self.config.server, self.config.network.request_timeout())?;
        Ok(Arc::new(api))
    }

    /// Probe the server once and return a monitor seeded with the result.
    pub async fn monitor(&self) -> Result<ConnectivityMonitor<HttpProbe>> {
        let probe = HttpProbe::new(&self.config.server, self.config.network.probe_timeout())?;
        let settings = MonitorSettings {
            poll_interval: self.config.monitor.poll_interval(),
            settle_samples: self.config.monitor.settle_samples,
        };
        Ok(ConnectivityMonitor::start(probe, settings).await)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings::for_process(
            LEASE_HOLDER,
            self.config.sync.lease(),
            self.config.sync.dead_letter_after,
        )
    }
}

/// Build the runtime that async commands block on.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Runtime::new()?)
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
