#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::sync::{Mutex, MutexGuard, OnceLock};
use tempfile::TempDir;

pub fn lock_test_env() -> MutexGuard<'static, ()> {
    static TEST_ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    TEST_ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner())
}

/// Write `~/.jobdesk/rc` under `home` with the given role
pub fn write_rc(home: &TempDir, role: &str) {
    let config_dir = home.path().join(".jobdesk");
    fs::create_dir_all(&config_dir).unwrap();
    let db_path = home.path().join("test.db");
    fs::write(
        config_dir.join("rc"),
        format!("data.location={}\nuser.role={}\n", db_path.display(), role),
    )
    .unwrap();
}

/// Temporary home with a fresh ledger, configured for `role`
pub fn setup_test_env(role: &str) -> (TempDir, MutexGuard<'static, ()>) {
    let guard = lock_test_env();
    let temp_dir = TempDir::new().unwrap();
    write_rc(&temp_dir, role);
    (temp_dir, guard)
}

pub fn jobdesk(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("jobdesk").unwrap();
    cmd.env("HOME", home.path());
    cmd.env_remove("RUST_LOG");
    // Wide enough that no column is shortened
    cmd.env("COLUMNS", "240");
    cmd
}

/// Add a job and assert it was created
pub fn add_job(home: &TempDir, name: &str, client: &str, extra: &[&str]) {
    let mut args = vec!["add", name, "--client", client];
    args.extend_from_slice(extra);
    jobdesk(home).args(&args).assert().success();
}
