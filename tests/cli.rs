//! Integration tests for the `duo-kbd-brightness` and `duo-multidisplay`
//! binaries.
//!
//! These tests exercise the compiled binaries via `std::process::Command`.
//! They do **not** require the keyboard to be connected: only help output
//! and input validation, which fail before any USB access, are covered.

use std::process::{Command, Output};

/// Helper: run the brightness binary with the given args.
fn brightness(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_duo-kbd-brightness"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute binary")
}

/// Helper: run the monitor binary with the given args.
fn multidisplay(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_duo-multidisplay"))
        .args(args)
        .output()
        .expect("failed to execute binary")
}

// ── Help / usage ──────────────────────────────────────────────────────

#[test]
fn help_lists_brightness_levels() {
    let out = brightness(&["--help"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Brightness levels:"));
    assert!(stdout.contains("medium"));
    assert!(stdout.contains("--verbose"));
}

#[test]
fn monitor_help_shows_interval() {
    let out = multidisplay(&["--help"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("--interval"));
}

// ── Validation (rejected before the device is touched) ───────────────

#[test]
fn missing_level_exits_nonzero() {
    let out = brightness(&[]);
    assert!(!out.status.success());
}

#[test]
fn unknown_level_exits_one() {
    let out = brightness(&["bright"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Invalid brightness level 'bright'"), "stderr: {}", stderr);
    assert!(stderr.contains("off, low, medium, high"));
    assert!(!stderr.contains("Device not found"));
}

#[test]
fn out_of_range_level_exits_one() {
    let out = brightness(&["7"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("between 0 and 3"), "stderr: {}", stderr);
}

#[test]
fn monitor_rejects_non_positive_interval() {
    let out = multidisplay(&["--interval", "0"]);
    assert!(!out.status.success());
}
