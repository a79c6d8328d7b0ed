//! Stamps the build with `DMT_VERSION` and `DMT_GIT_SHA` for the page footer.
//!
//! Release builds set both; local builds fall back to the package version
//! and `git rev-parse`.

use std::env;
use std::process::Command;

const TRACKED: &[&str] = &["DMT_VERSION", "DMT_GIT_SHA", "GITHUB_SHA"];

fn main() {
    let version = env::var("DMT_VERSION")
        .or_else(|_| env::var("CARGO_PKG_VERSION"))
        .unwrap_or_else(|_| "unknown".into());

    let sha = env::var("DMT_GIT_SHA")
        .ok()
        .or_else(|| env::var("GITHUB_SHA").ok().map(|full| short(&full)))
        .or_else(head_sha)
        .unwrap_or_else(|| "unknown".into());

    println!("cargo:rustc-env=DMT_VERSION={version}");
    println!("cargo:rustc-env=DMT_GIT_SHA={sha}");
    for var in TRACKED {
        println!("cargo:rerun-if-env-changed={var}");
    }
}

/// Seven-character abbreviation, safe on short or non-ASCII input
fn short(sha: &str) -> String {
    sha.chars().take(7).collect()
}

fn head_sha() -> Option<String> {
    let out = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let sha = String::from_utf8(out.stdout).ok()?;
    Some(sha.trim().to_string()).filter(|s| !s.is_empty())
}
