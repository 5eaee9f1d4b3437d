// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: paths, startup, shutdown.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use av_adapters::{
    DriverError, FileStore, LogNotifyAdapter, StoreError, TracedDriver, TracedNotifyAdapter,
    WebDriver,
};
use av_core::{AvatarConfig, ConfigError, EventBus, SystemClock};
use av_engine::{AvatarRuntime, RuntimeDeps};
use fs2::FileExt;
use thiserror::Error;
use tracing::{info, warn};

/// Daemon runtime with concrete adapter types (wrapped with tracing)
pub type DaemonRuntime = AvatarRuntime<TracedDriver<WebDriver>, FileStore, SystemClock>;

/// Where the daemon keeps its files
#[derive(Debug, Clone)]
pub struct Paths {
    /// TOML configuration; missing means defaults
    pub config_path: PathBuf,
    /// Lock/PID file
    pub lock_path: PathBuf,
    pub log_path: PathBuf,
    /// Interview and credential journal
    pub store_path: PathBuf,
}

impl Paths {
    /// Default layout under the platform state and config directories.
    /// `AVD_STATE_DIR` overrides the state directory.
    pub fn discover(config_path: Option<PathBuf>) -> Result<Self, LifecycleError> {
        let state_dir = state_dir()?;
        let config_path = match config_path {
            Some(path) => path,
            None => dirs::config_dir()
                .map(|d| d.join("avatar").join("config.toml"))
                .unwrap_or_else(|| state_dir.join("config.toml")),
        };
        Ok(Self::under(&state_dir, config_path))
    }

    pub fn under(state_dir: &Path, config_path: PathBuf) -> Self {
        Self {
            config_path,
            lock_path: state_dir.join("avd.pid"),
            log_path: state_dir.join("avd.log"),
            store_path: state_dir.join("store").join("interviews.wal"),
        }
    }
}

/// Daemon state during operation
pub struct DaemonState {
    pub paths: Paths,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub runtime: DaemonRuntime,
    /// When daemon started
    pub start_time: Instant,
}

impl DaemonState {
    /// End every session, stop the runtime and remove the PID file
    pub async fn shutdown(self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");
        self.runtime.shutdown().await;

        if self.paths.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.paths.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        info!(
            uptime_secs = self.start_time.elapsed().as_secs(),
            "Daemon shutdown complete"
        );
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub async fn startup(paths: &Paths, config: &AvatarConfig) -> Result<DaemonState, LifecycleError> {
    match startup_inner(paths, config).await {
        Ok(state) => Ok(state),
        Err(e) => {
            cleanup_on_failure(paths, &e);
            Err(e)
        }
    }
}

async fn startup_inner(paths: &Paths, config: &AvatarConfig) -> Result<DaemonState, LifecycleError> {
    // 1. Acquire lock file FIRST - prevents two daemons sharing one store
    if let Some(parent) = paths.lock_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let lock_file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&paths.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    lock_file.set_len(0)?;
    {
        use std::io::Write;
        let mut writer = &lock_file;
        writeln!(writer, "{}", std::process::id())?;
    }

    // 2. Open the store; replays the journal
    if let Some(parent) = paths.store_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = FileStore::open(&paths.store_path)?;

    // 3. Adapters, wrapped with tracing
    if let Some(dir) = &config.driver.snapshot_dir {
        std::fs::create_dir_all(dir)?;
    }
    let driver = TracedDriver::new(WebDriver::new(
        &config.driver.webdriver_url,
        config.driver.headless,
    )?);
    let notify = TracedNotifyAdapter::new(LogNotifyAdapter::new());

    // 4. Start the runtime (spawns scheduler and forwarders)
    let runtime = AvatarRuntime::start(
        RuntimeDeps {
            driver,
            store,
            notify,
        },
        config,
        SystemClock,
        EventBus::new(),
    );

    info!(
        webdriver = %config.driver.webdriver_url,
        store = %paths.store_path.display(),
        "Daemon started"
    );

    Ok(DaemonState {
        paths: paths.clone(),
        lock_file,
        runtime,
        start_time: Instant::now(),
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(paths: &Paths, error: &LifecycleError) {
    // Another daemon owns the PID file
    if matches!(error, LifecycleError::LockFailed(_)) {
        return;
    }
    if paths.lock_path.exists() {
        let _ = std::fs::remove_file(&paths.lock_path);
    }
}

/// State directory for avd
fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("AVD_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|d| d.join("avatar"))
        .ok_or(LifecycleError::NoStateDir)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
