// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn paths(dir: &Path) -> Paths {
    Paths::under(dir, dir.join("config.toml"))
}

#[test]
fn layout_lives_under_the_state_dir() {
    let paths = Paths::under(Path::new("/var/lib/avd"), PathBuf::from("/etc/avd.toml"));

    assert_eq!(paths.lock_path, Path::new("/var/lib/avd/avd.pid"));
    assert_eq!(paths.log_path, Path::new("/var/lib/avd/avd.log"));
    assert_eq!(paths.store_path, Path::new("/var/lib/avd/store/interviews.wal"));
    assert_eq!(paths.config_path, Path::new("/etc/avd.toml"));
}

#[tokio::test]
async fn startup_takes_the_lock_and_shutdown_releases_it() {
    let dir = tempfile::tempdir().unwrap();
    let paths = paths(dir.path());
    let config = AvatarConfig::default();

    let daemon = startup(&paths, &config).await.unwrap();
    let pid = std::fs::read_to_string(&paths.lock_path).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());
    assert!(paths.store_path.parent().unwrap().is_dir());

    daemon.shutdown().await.unwrap();
    assert!(!paths.lock_path.exists());
}

#[tokio::test]
async fn second_daemon_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let paths = paths(dir.path());
    let config = AvatarConfig::default();

    let first = startup(&paths, &config).await.unwrap();
    let second = startup(&paths, &config).await;

    assert!(matches!(second, Err(LifecycleError::LockFailed(_))));
    // The running daemon's PID file survives the failed attempt
    assert!(paths.lock_path.exists());
    first.shutdown().await.unwrap();
}
