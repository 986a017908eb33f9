use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;
mod test_env;
use test_env::{jobdesk, lock_test_env, setup_test_env};

#[test]
fn test_user_error_format() {
    let (home, _guard) = setup_test_env("admin");

    jobdesk(&home)
        .args(["add", "  ", "--client", "Acme"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Error:"));
}

#[test]
fn test_invalid_job_id() {
    let (home, _guard) = setup_test_env("admin");

    jobdesk(&home)
        .args(["show", "abc"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("'abc' is not a job ID"));
}

#[test]
fn test_job_not_found() {
    let (home, _guard) = setup_test_env("admin");

    jobdesk(&home)
        .args(["next", "42"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Job not found: 42"));
}

#[test]
fn test_job_number_and_type_are_user_errors() {
    let (home, _guard) = setup_test_env("admin");

    jobdesk(&home)
        .args(["add", "Logo", "--client", "Acme", "--number", "J-00002"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("reserved for generated job numbers"));

    jobdesk(&home)
        .args(["add", "Logo", "--client", "Acme", "--number", "WEB-7"])
        .assert()
        .success();
    jobdesk(&home)
        .args(["add", "Flyer", "--client", "Acme", "--number", "WEB-7"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("'WEB-7' is already taken"));

    jobdesk(&home)
        .args(["add", "Poster", "--client", "Acme", "--type", "print,large"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not a valid type code"));
}

#[test]
fn test_unknown_argument_is_user_error() {
    let (home, _guard) = setup_test_env("admin");

    jobdesk(&home)
        .args(["list", "--bogus"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Error:"));
}

#[test]
fn test_invalid_role_in_config() {
    let _guard = lock_test_env();
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join(".jobdesk");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("rc"), "user.role=owner\n").unwrap();

    jobdesk(&home)
        .args(["list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid user.role 'owner'"));
}

#[test]
fn test_unusable_data_location_is_internal_error() {
    let _guard = lock_test_env();
    let home = TempDir::new().unwrap();
    let blocker = home.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();
    let config_dir = home.path().join(".jobdesk");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("rc"),
        format!("data.location={}\n", blocker.join("jobs.db").display()),
    )
    .unwrap();

    jobdesk(&home)
        .args(["list"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::starts_with("Internal error:"))
        .stderr(predicate::str::contains("Caused by"));
}

#[test]
fn test_version_and_help() {
    let (home, _guard) = setup_test_env("admin");

    jobdesk(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    jobdesk(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("bulk"));
}
