use crate::common::{lambda_emu, workspace_with};
use predicates::prelude::*;

#[test]
fn stream_invokes_once_per_line_with_markers() {
    let (dir, events) = workspace_with("events.ldjson", "{\"n\":1}\n{\"n\":2}\n{\"n\":3}\n");
    let output = lambda_emu(&dir)
        .args(["--stream", "builtin.echo"])
        .arg(&events)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout,
        "Entering stream mode.\n\
         \nObject 1 {\"n\":1}\n{\"n\":1}\n\
         \nObject 2 {\"n\":2}\n{\"n\":2}\n\
         \nObject 3 {\"n\":3}\n{\"n\":3}\n"
    );
}

#[test]
fn stream_skips_blank_lines() {
    let (dir, events) = workspace_with("events.ldjson", "1\n\n2\n   \n");
    lambda_emu(&dir)
        .args(["-s", "builtin.echo"])
        .arg(&events)
        .assert()
        .success()
        .stdout(predicate::str::contains("Object 2 2"))
        .stdout(predicate::str::contains("Object 3").not());
}

#[test]
fn stream_truncates_long_previews() {
    let long = format!("\"{}\"", "a".repeat(100));
    let (dir, events) = workspace_with("events.ldjson", &format!("{}\n", long));
    let expected = format!("Object 1 {}...\n", &long[..65]);

    lambda_emu(&dir)
        .args(["--stream", "builtin.echo"])
        .arg(&events)
        .assert()
        .success()
        .stdout(predicate::str::contains(expected));
}

#[test]
fn bad_record_aborts_the_stream() {
    let (dir, events) = workspace_with("events.ldjson", "1\n{oops\n3\n");
    lambda_emu(&dir)
        .args(["--stream", "builtin.echo"])
        .arg(&events)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Object 2 {oops"))
        .stdout(predicate::str::contains("Object 3").not())
        .stderr(predicate::str::contains("problem parsing your JSON event"));
}

#[test]
fn stream_reads_stdin() {
    let dir = tempfile::tempdir().unwrap();
    lambda_emu(&dir)
        .args(["--stream", "builtin.echo", "-"])
        .write_stdin("true\nfalse\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Object 1 true\ntrue\n"))
        .stdout(predicate::str::contains("Object 2 false\nfalse\n"));
}
