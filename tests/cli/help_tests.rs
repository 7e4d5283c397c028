use crate::common::lambda_emu;
use predicates::prelude::*;

#[test]
fn help_lists_arguments_and_flags() {
    let dir = tempfile::tempdir().unwrap();
    lambda_emu(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("<HANDLER>"))
        .stdout(predicate::str::contains("<EVENT>"))
        .stdout(predicate::str::contains("--stream"))
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("--verbose"))
        .stdout(predicate::str::contains("--handler-path"));
}

#[test]
fn version_flag_prints_version() {
    let dir = tempfile::tempdir().unwrap();
    lambda_emu(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_arguments_are_usage_errors() {
    let dir = tempfile::tempdir().unwrap();
    lambda_emu(&dir)
        .arg("builtin.echo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<EVENT>"));
}
