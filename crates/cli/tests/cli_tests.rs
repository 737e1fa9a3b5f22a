use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("roster").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Page through lesson and student subscription listings"));
}

#[test]
fn test_cli_lessons_help() {
    let mut cmd = Command::cargo_bin("roster").unwrap();
    cmd.arg("lessons")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--anchor"))
        .stdout(predicate::str::contains("--past"))
        .stdout(predicate::str::contains("--timezone"));
}

#[test]
fn test_cli_subscriptions_help() {
    let mut cmd = Command::cargo_bin("roster").unwrap();
    cmd.arg("subscriptions")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--student-course"));
}

#[test]
fn test_cli_rejects_unknown_backend() {
    let mut cmd = Command::cargo_bin("roster").unwrap();
    cmd.args(["--backend", "mysql", "lessons"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mysql"));
}

#[test]
fn test_cli_rejects_out_of_range_day() {
    let mut cmd = Command::cargo_bin("roster").unwrap();
    cmd.args(["lessons", "--day", "7"]).assert().failure();
}

#[test]
fn test_cli_requires_database_url() {
    let mut cmd = Command::cargo_bin("roster").unwrap();
    cmd.env_remove("DATABASE_URL")
        .args(["--backend", "postgres", "subscriptions"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DATABASE_URL"));
}
