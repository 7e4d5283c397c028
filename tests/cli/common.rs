use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// A `lambda-emu` command isolated from the caller's environment and config.
pub fn lambda_emu(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("lambda-emu").unwrap();
    cmd.current_dir(workdir.path())
        .env_remove("RUST_LOG")
        .env_remove("LAMBDA_EMU_PATH")
        .env_remove("LAMBDA_EMU_TIMEOUT")
        .env("NO_COLOR", "1");
    cmd
}

/// Write `contents` to `name` inside a fresh temp dir.
pub fn workspace_with(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}
