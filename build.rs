// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-env-changed=GEOCAM_VERSION");

    // Packagers can pin the version string
    let version = std::env::var("GEOCAM_VERSION").unwrap_or_else(|_| {
        let pkg = std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());
        match short_commit() {
            Some(hash) => format!("{}-{}", pkg, hash),
            None => pkg,
        }
    });

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// Abbreviated HEAD commit, when building from a git checkout
fn short_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;

    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|hash| !hash.is_empty())
}
