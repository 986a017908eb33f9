use predicates::prelude::*;
mod test_env;
use test_env::{add_job, jobdesk, setup_test_env, write_rc};

#[test]
fn test_add_starts_in_first_status() {
    let (home, _guard) = setup_test_env("admin");
    jobdesk(&home)
        .args(["add", "Logo redesign", "--client", "Acme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created job 1 (J-00001) in 'todo'."));

    jobdesk(&home)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status:      todo (To do, STANDARD)"))
        .stdout(predicate::str::contains("Quick change: in_progress"));
}

#[test]
fn test_next_and_prev_follow_the_chain() {
    let (home, _guard) = setup_test_env("admin");
    add_job(&home, "Brochure", "Acme", &[]);

    jobdesk(&home)
        .args(["next", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Job 1 is now 'in_progress'."));
    jobdesk(&home)
        .args(["next", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Job 1 is now 'review'."));
    jobdesk(&home)
        .args(["prev", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Job 1 is now 'in_progress'."));

    jobdesk(&home)
        .args(["history", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("todo -> in_progress"))
        .stdout(predicate::str::contains("in_progress -> review"))
        .stdout(predicate::str::contains("review -> in_progress"));
}

#[test]
fn test_first_status_has_no_previous() {
    let (home, _guard) = setup_test_env("admin");
    add_job(&home, "Brochure", "Acme", &[]);

    jobdesk(&home)
        .args(["prev", "1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("'todo' has no previous status"));
}

#[test]
fn test_move_rejects_non_adjacent_without_force() {
    let (home, _guard) = setup_test_env("admin");
    add_job(&home, "Brochure", "Acme", &[]);

    jobdesk(&home)
        .args(["move", "1", "delivered"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not a quick-change target"));

    jobdesk(&home)
        .args(["move", "1", "delivered", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Job 1 is now 'delivered'."));
}

#[test]
fn test_force_to_unknown_status_suggests_code() {
    let (home, _guard) = setup_test_env("admin");
    add_job(&home, "Brochure", "Acme", &[]);

    jobdesk(&home)
        .args(["move", "1", "clsoed", "--force"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Did you mean 'closed'?"));
}

#[test]
fn test_terminal_status_has_no_quick_change() {
    let (home, _guard) = setup_test_env("admin");
    add_job(&home, "Brochure", "Acme", &[]);
    jobdesk(&home).args(["move", "1", "closed", "--force"]).assert().success();

    jobdesk(&home)
        .args(["prev", "1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("'closed' is a terminal status"));
    jobdesk(&home)
        .args(["targets", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Quick change: (none)"));
}

#[test]
fn test_staff_may_only_deliver() {
    let (home, _guard) = setup_test_env("admin");
    add_job(&home, "Brochure", "Acme", &["--status", "review"]);
    add_job(&home, "Poster", "Acme", &[]);
    write_rc(&home, "staff");

    jobdesk(&home)
        .args(["next", "2"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no quick change is available from 'todo'"));
    jobdesk(&home)
        .args(["move", "2", "closed", "--force"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Permission denied"));
    jobdesk(&home)
        .args(["targets", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Quick change: delivered"))
        .stdout(predicate::str::contains("Force change").not());

    jobdesk(&home)
        .args(["next", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Job 1 is now 'delivered'."));
}

#[test]
fn test_pay_reschedule_and_assign() {
    let (home, _guard) = setup_test_env("admin");
    jobdesk(&home).args(["users", "add", "alice"]).assert().success();
    add_job(&home, "Brochure", "Acme", &[]);

    jobdesk(&home)
        .args(["pay", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Job 1 marked paid."));
    jobdesk(&home)
        .args(["pay", "1", "--unpaid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Job 1 marked unpaid."));
    jobdesk(&home)
        .args(["reschedule", "1", "2030-05-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Job 1 is due 2030-05-01."));
    jobdesk(&home)
        .args(["reschedule", "1", "none"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Job 1 has no due date."));
    jobdesk(&home)
        .args(["assign", "1", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Assigned alice to job 1."));
    jobdesk(&home)
        .args(["assign", "1", "alcie"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Did you mean 'alice'?"));

    jobdesk(&home)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Assignees:   alice"))
        .stdout(predicate::str::contains("Paid:        no"));
}
