use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cargo_bin() -> Command { Command::cargo_bin("bfvm").unwrap() }

fn small_valid_program() -> &'static str { "+++." }

fn source_to_tempfile(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn test_run_positional_code_success() {
    cargo_bin()
        .arg("run").arg(small_valid_program())
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{3}"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_run_file_success() {
    let tf = source_to_tempfile(small_valid_program());
    cargo_bin()
        .arg("run").arg("--file").arg(tf.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{3}"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_run_missing_file_fails() {
    cargo_bin()
        .arg("run").arg("--file").arg("/definitely/not/a/real/path.bf")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read code file"));
}

#[test]
fn test_run_comment_characters_are_ignored() {
    // Everything outside ><+-.[] is a comment, including ','
    cargo_bin()
        .arg("run").arg("add two: + and, +then print.")
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{2}"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_run_no_args_shows_usage() {
    cargo_bin()
        .arg("run")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_run_debug_prints_table() {
    cargo_bin()
        .arg("run").arg("--debug").arg(">")
        .assert()
        .success()
        .stdout(predicate::str::contains("STEP | IP")
            .and(predicate::str::contains("Moved pointer head to index 1"))
        )
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_run_debug_suppresses_program_output() {
    cargo_bin()
        .arg("run").arg("--debug").arg("+.")
        .assert()
        .success()
        .stdout(predicate::str::contains("suppressed in debug"));
}

#[test]
fn test_no_coalesce_is_observationally_equivalent() {
    let program = "++++++++[>++++++++<-]>.";

    let coalesced = cargo_bin().arg("run").arg(program).assert().success();
    let single = cargo_bin()
        .arg("run").arg("--no-coalesce").arg(program)
        .assert()
        .success();

    assert_eq!(
        coalesced.get_output().stdout,
        single.get_output().stdout,
        "coalesced and single-step runs must print the same bytes"
    );
}

#[test]
fn test_run_eight_by_eight_outputs_sixty_four() {
    // 8x8 via the classic multiplication loop; 64 is '@'
    cargo_bin()
        .arg("run").arg("++++++++[>++++++++<-]>.")
        .assert()
        .success()
        .stdout(predicate::str::contains("@"));
}
