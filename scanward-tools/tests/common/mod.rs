//! Shared helpers for scanner runner integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use scanward_core::config::ToolConfig;

/// Write an executable shell script standing in for a scanner binary.
#[cfg(unix)]
pub fn fake_tool(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write fake tool");
    let mut perms = std::fs::metadata(&path)
        .expect("Failed to stat fake tool")
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("Failed to chmod fake tool");
    path
}

/// Tool settings pointing at `executable` with a short timeout.
pub fn tool_config(executable: &Path, timeout_seconds: u64) -> ToolConfig {
    ToolConfig {
        executable: Some(executable.to_string_lossy().into_owned()),
        timeout_seconds: Some(timeout_seconds),
        ..ToolConfig::default()
    }
}

/// A workspace directory with a couple of files to scan.
pub fn scan_target() -> TempDir {
    let dir = tempfile::Builder::new()
        .prefix("scanward-target-")
        .tempdir()
        .expect("Failed to create scan target");
    std::fs::write(dir.path().join("app.py"), "eval(input())\n").expect("Failed to write file");
    dir
}
