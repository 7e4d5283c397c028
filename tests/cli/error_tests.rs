use crate::common::{lambda_emu, workspace_with};
use predicates::prelude::*;

#[test]
fn unknown_module_exits_with_import_failure() {
    let (dir, event) = workspace_with("event.json", "{}");
    lambda_emu(&dir)
        .arg("nosuchmodule.handler")
        .arg(&event)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("problem finding your function"))
        .stderr(predicate::str::contains("nosuchmodule"));
}

#[test]
fn unknown_function_exits_with_import_failure() {
    let (dir, event) = workspace_with("event.json", "{}");
    lambda_emu(&dir)
        .arg("builtin.missing")
        .arg(&event)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("problem finding your function"));
}

#[test]
fn reference_without_separator_is_rejected() {
    let (dir, event) = workspace_with("event.json", "{}");
    lambda_emu(&dir)
        .arg("echo")
        .arg(&event)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("problem finding your function"));
}

#[test]
fn garbage_library_is_an_import_failure() {
    let (dir, event) = workspace_with("event.json", "{}");
    let lib = dir.path().join(libloading_name("broken"));
    std::fs::write(&lib, b"not a shared object").unwrap();

    lambda_emu(&dir)
        .arg("broken.handler")
        .arg(&event)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("problem finding your function"));
}

#[test]
fn invalid_json_event_is_a_parse_failure() {
    let (dir, event) = workspace_with("event.json", "{x: }");
    lambda_emu(&dir)
        .arg("builtin.echo")
        .arg(&event)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("problem parsing your JSON event"));
}

#[test]
fn missing_event_file_is_a_parse_failure() {
    let dir = tempfile::tempdir().unwrap();
    lambda_emu(&dir)
        .arg("builtin.echo")
        .arg("does-not-exist.json")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("problem parsing your JSON event"));
}

#[test]
fn out_of_range_timeout_is_rejected() {
    let (dir, event) = workspace_with("event.json", "{}");
    lambda_emu(&dir)
        .args(["--timeout", "301", "builtin.echo"])
        .arg(&event)
        .assert()
        .failure()
        .stderr(predicate::str::contains("301"));
}

#[test]
fn invalid_config_file_is_rejected() {
    let (dir, event) = workspace_with("event.json", "{}");
    std::fs::write(dir.path().join("lambda-emu.toml"), "memory = 128\n").unwrap();

    lambda_emu(&dir)
        .arg("builtin.echo")
        .arg(&event)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid configuration"));
}

fn libloading_name(stem: &str) -> String {
    format!(
        "{}{}{}",
        std::env::consts::DLL_PREFIX,
        stem,
        std::env::consts::DLL_SUFFIX
    )
}
