use crate::common::{lambda_emu, workspace_with};
use predicates::prelude::*;

#[test]
fn echo_prints_result_line() {
    let (dir, event) = workspace_with("event.json", "{\n  \"x\": 4\n}\n");
    lambda_emu(&dir)
        .arg("builtin.echo")
        .arg(&event)
        .assert()
        .success()
        .stdout("{\"x\":4}\n");
}

#[test]
fn dash_reads_event_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    lambda_emu(&dir)
        .args(["builtin.echo", "-"])
        .write_stdin("[1, 2, 3]")
        .assert()
        .success()
        .stdout("[1,2,3]\n");
}

#[test]
fn verbose_mode_reports_estimates() {
    let (dir, event) = workspace_with("event.json", "\"hi\"");
    lambda_emu(&dir)
        .args(["-v", "builtin.echo"])
        .arg(&event)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Executed builtin.echo\nEstimated...\n"))
        .stdout(predicate::str::contains("...execution clock time:"))
        .stdout(predicate::str::contains("ms bucket)"))
        .stdout(predicate::str::contains("...execution peak RSS memory:"))
        .stdout(predicate::str::contains("bytes)"))
        .stdout(predicate::str::ends_with(
            "----------------------RESULT----------------------\n\"hi\"\n",
        ));
}

#[test]
fn verbose_can_come_from_config() {
    let (dir, event) = workspace_with("event.json", "1");
    std::fs::write(dir.path().join("lambda-emu.toml"), "verbose = true\ntimeout = 5\n").unwrap();

    lambda_emu(&dir)
        .arg("builtin.echo")
        .arg(&event)
        .assert()
        .success()
        .stdout(predicate::str::contains("Executed builtin.echo"));
}

#[test]
fn logs_stay_off_stdout() {
    let (dir, event) = workspace_with("event.json", "null");
    lambda_emu(&dir)
        .args(["--log-level", "debug", "builtin.echo"])
        .arg(&event)
        .assert()
        .success()
        .stdout("null\n")
        .stderr(predicate::str::contains("Starting"));
}

#[test]
fn piped_logs_carry_no_ansi_escapes() {
    let (dir, event) = workspace_with("event.json", "null");
    lambda_emu(&dir)
        .env_remove("NO_COLOR")
        .args(["--log-level", "debug", "builtin.echo"])
        .arg(&event)
        .assert()
        .success()
        .stderr(predicate::str::contains("Starting"))
        .stderr(predicate::str::contains("\u{1b}[").not());
}
