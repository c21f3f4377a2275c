// The engine has no step or time bounds of its own; the CLI imposes both by
// stepping the machine externally. These tests pin that caller-level policy.
use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

fn cargo_bin() -> Command { Command::cargo_bin("bfvm").unwrap() }

#[test]
fn test_step_limit_aborts_runaway_loop() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .arg("run").arg("--max-steps").arg("100").arg("+[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("step limit exceeded (100)"));
}

#[test]
fn test_step_limit_env_fallback() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .env("BFVM_MAX_STEPS", "50")
        .arg("run").arg("+[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("step limit exceeded (50)"));
}

#[test]
fn test_wall_clock_timeout_aborts_runaway_loop() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .arg("run").arg("--timeout").arg("200").arg("+[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("wall-clock timeout exceeded (200 ms)"));
}

#[test]
fn test_limits_do_not_fire_for_terminating_programs() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .arg("run").arg("--max-steps").arg("100000").arg("+[-].")
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{0}"))
        .stderr(predicate::str::is_empty());
}
