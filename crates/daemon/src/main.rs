// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! civregd - the civil registry background sync worker.
//!
//! Replays the pending queue of one `.civreg/` directory on a fixed interval,
//! sharing the database with foreground `civreg` processes. The sync lease in
//! that database keeps the two from draining at the same time.
//!
//! Usage:
//!   civregd [--dir <path>]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crlib::config::{find_work_dir_from, get_db_path, Config};
use crlib::sync::{EngineSettings, HttpApi, LocalStore, SyncEngine};
use tokio_util::sync::CancellationToken;

/// PID filename within the work directory.
const PID_NAME: &str = "daemon.pid";
/// Lock filename for single instance guarantee.
const LOCK_NAME: &str = "daemon.lock";
/// Log filename within the work directory.
const LOG_NAME: &str = "daemon.log";
/// Lease holder prefix, e.g. `civregd-4242`.
const HOLDER: &str = "civregd";
/// Floor for the background interval; a zero interval would spin.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let work_dir = match resolve_work_dir(&args) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    let config = match Config::load(&work_dir) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    setup_logging(&work_dir.join(LOG_NAME));
    tracing::info!("civregd starting, work_dir={}", work_dir.display());

    // Acquire file lock for single instance
    let lock_file = match acquire_lock(&work_dir.join(LOCK_NAME)) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("failed to acquire lock: {}", e);
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let pid_path = work_dir.join(PID_NAME);
    if let Err(e) = write_pid_file(&pid_path) {
        tracing::error!("failed to write PID file: {}", e);
        std::process::exit(1);
    }

    let result = tokio::runtime::Runtime::new()
        .map_err(crlib::Error::from)
        .and_then(|rt| rt.block_on(run(&work_dir, &config)));

    cleanup(&pid_path);
    drop(lock_file);
    match result {
        Ok(()) => tracing::info!("civregd stopped"),
        Err(e) => {
            tracing::error!("civregd failed: {}", e);
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run(work_dir: &Path, config: &Config) -> crlib::Result<()> {
    let store = LocalStore::open(&get_db_path(work_dir))?;
    let api = Arc::new(HttpApi::new(
        &config.server,
        config.network.request_timeout(),
    )?);
    let settings = EngineSettings::for_process(
        HOLDER,
        config.sync.lease(),
        config.sync.dead_letter_after,
    );
    let engine = Arc::new(SyncEngine::new(store, api, settings));

    let interval = config.sync.background_interval().max(MIN_INTERVAL);
    tracing::info!(server = %config.server, ?interval, "background sync running");

    // Signal readiness to a parent process
    println!("READY");
    let _ = std::io::stdout().flush();

    let cancel = CancellationToken::new();
    let worker = tokio::spawn(Arc::clone(&engine).run_background(interval, cancel.clone()));

    shutdown_signal().await;
    tracing::info!("shutting down");
    cancel.cancel();
    let _ = worker.await;
    Ok(())
}

/// Wait for Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut term) = signal(SignalKind::terminate()) {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
            return;
        }
    }
    let _ = tokio::signal::ctrl_c().await;
}

/// Find the `.civreg/` directory from `--dir <path>`, or the current directory.
fn resolve_work_dir(args: &[String]) -> crlib::Result<PathBuf> {
    let start = match parse_dir(args) {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    find_work_dir_from(&start)
}

fn parse_dir(args: &[String]) -> Option<PathBuf> {
    args.iter()
        .position(|a| a == "--dir")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

fn setup_logging(log_path: &Path) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Try to open log file, fall back to stderr
    if let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn acquire_lock(lock_path: &Path) -> std::io::Result<fs::File> {
    use fs2::FileExt;

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(lock_path)?;
    file.try_lock_exclusive().map_err(|_| {
        std::io::Error::other("another civregd is already running for this directory")
    })?;
    Ok(file)
}

fn write_pid_file(pid_path: &Path) -> std::io::Result<()> {
    fs::write(pid_path, format!("{}", std::process::id()))
}

fn cleanup(pid_path: &Path) {
    let _ = fs::remove_file(pid_path);
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
