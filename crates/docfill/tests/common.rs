//! Shared helpers for CLI integration tests

#![allow(dead_code)]
#![allow(deprecated)] // cargo_bin is deprecated

use assert_cmd::cargo::CommandCargoExt;
use std::path::Path;
use std::process::Command;

/// docfill running in `dir`, isolated from the caller's configuration
pub fn docfill(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    cmd.current_dir(dir)
        .env_remove("DOCFILL_CONFIG")
        .env_remove("DOCFILL_SOFFICE")
        .env_remove("RUST_LOG");
    cmd
}
