use crate::common::{lambda_emu, workspace_with};
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

/// Build `demos/mathlib` once and return the directory holding its cdylib.
///
/// A separate target directory keeps the nested build off the lock held by
/// the outer `cargo test`.
fn mathlib_dir() -> &'static Path {
    static DIR: OnceLock<PathBuf> = OnceLock::new();
    DIR.get_or_init(|| {
        let target_dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join("mathlib");
        let status = Command::new(env!("CARGO"))
            .args(["build", "--quiet", "-p", "mathlib", "--manifest-path"])
            .arg(Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml"))
            .arg("--target-dir")
            .arg(&target_dir)
            .status()
            .unwrap();
        assert!(status.success(), "building mathlib failed");

        let dir = target_dir.join("debug");
        let library = dir.join(format!(
            "{}mathlib{}",
            std::env::consts::DLL_PREFIX,
            std::env::consts::DLL_SUFFIX
        ));
        assert!(library.is_file(), "missing {}", library.display());
        dir
    })
}

#[test]
fn square_from_library_prints_sixteen() {
    let (dir, event) = workspace_with("event.json", "{\"x\": 4}");
    lambda_emu(&dir)
        .arg("--handler-path")
        .arg(mathlib_dir())
        .arg("mathlib.square")
        .arg(&event)
        .assert()
        .success()
        .stdout("16\n");
}

#[test]
fn sleeping_library_handler_times_out() {
    let (dir, event) = workspace_with("event.json", "{\"seconds\": 5}");
    lambda_emu(&dir)
        .args(["--timeout", "2", "--handler-path"])
        .arg(mathlib_dir())
        .arg("mathlib.sleep")
        .arg(&event)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("timed out"))
        .stderr(predicate::str::contains("2s"));
}

#[test]
fn failing_library_handler_is_an_invocation_failure() {
    let (dir, event) = workspace_with("event.json", "{\"why\": 1}");
    lambda_emu(&dir)
        .arg("--handler-path")
        .arg(mathlib_dir())
        .arg("mathlib.fail")
        .arg(&event)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error running your function"))
        .stderr(predicate::str::contains("refusing"));
}

#[test]
fn missing_library_function_lists_available_handlers() {
    let (dir, event) = workspace_with("event.json", "{}");
    lambda_emu(&dir)
        .arg("--handler-path")
        .arg(mathlib_dir())
        .arg("mathlib.nope")
        .arg(&event)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("problem finding your function"))
        .stderr(predicate::str::contains("square"))
        .stderr(predicate::str::contains("sleep"));
}
