#![cfg(unix)]

mod common;

use std::fs;

use assert_cmd::Command;
use common::{cat_command, write};
use deltadebug::{ResultSet, RunResult, TEMP_DIR_ENV};
use predicates::prelude::*;

fn deltadebug() -> Command {
    Command::cargo_bin("deltadebug").expect("deltadebug binary")
}

fn manifest(dir: &std::path::Path, skip: bool) -> std::path::PathBuf {
    write(dir, "input.txt", "abcXdefYghi");
    let bug = serde_json::json!([{
        "file": "input.txt",
        "command": cat_command(),
        "stdout": "X",
        "timeout": 5.0,
        "skip": skip,
    }]);
    write(dir, "bugs.json", bug.to_string())
}

#[test]
fn reduce_cuts_the_input_down() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write(dir.path(), "input.txt", "abcdXYefghi");
    let output = dir.path().join("reduced.txt");
    deltadebug()
        .env(TEMP_DIR_ENV, dir.path())
        .arg("reduce")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .args(["--stdout", "XY", "--cache", "hash", "--"])
        .args(cat_command())
        .assert()
        .success()
        .stdout(predicate::str::contains("Reduced input length from 11 to 2"));
    assert_eq!(fs::read(&output).expect("reduced"), b"XY");
    assert_eq!(fs::read(&input).expect("input"), b"abcdXYefghi");
}

#[test]
fn reduce_with_replacement_keeps_offsets() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write(dir.path(), "input.txt", "abcX...Yghi");
    let output = dir.path().join("reduced.txt");
    deltadebug()
        .arg("reduce")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--stdout", "X...Y", "--replace", "0x2e", "--algorithm", "zipmin", "--"])
        .args(cat_command())
        .assert()
        .success();
    assert_eq!(fs::read(&output).expect("reduced"), b"...X...Y...");
}

#[test]
fn reduce_source_text_along_its_syntax_tree() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write(
        dir.path(),
        "main.c",
        "int main(void) {\n    int b = 2;\n    puts(\"x\");\n    return b;\n}\n",
    );
    let output = dir.path().join("reduced.c");
    deltadebug()
        .arg("reduce")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--stdout", "return b;", "--algorithm", "hdd-c:zipmin", "--"])
        .args(cat_command())
        .assert()
        .success()
        .stdout(predicate::str::contains("using HDD with Zipmin using TreeSitterParser for c"));
    assert_eq!(fs::read_to_string(&output).expect("reduced"), "return b;\n");
}

#[test]
fn reduce_refuses_inputs_that_do_not_fail() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write(dir.path(), "input.txt", "abc");
    deltadebug()
        .arg("reduce")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("out"))
        .args(["--stdout", "ZZZ", "--"])
        .args(cat_command())
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not reproduce"));
}

#[test]
fn unknown_algorithms_are_rejected() {
    deltadebug()
        .args(["reduce", "in", "-o", "out", "--stdout", "x", "--algorithm", "bisect", "--", "cat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown algorithm"));
}

#[test]
fn validate_reports_each_bug() {
    let dir = tempfile::tempdir().expect("tempdir");
    let manifest = manifest(dir.path(), false);
    deltadebug()
        .arg("validate")
        .arg("--manifest")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("reproduces"));
}

#[test]
fn bench_stores_one_result_per_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let manifest = manifest(dir.path(), false);
    let results = dir.path().join("results.json");
    deltadebug()
        .arg("bench")
        .arg("--manifest")
        .arg(&manifest)
        .arg("--results")
        .arg(&results)
        .args(["--algorithm", "ddmin", "--algorithm", "zipmin", "--no-fill"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Zipmin").and(predicate::str::contains("Output Size")));

    let stored = ResultSet::load(&results).expect("results");
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|r| r.output_size == 1 && r.input_size == 11));
}

#[test]
fn bench_skips_disabled_bugs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let manifest = manifest(dir.path(), true);
    deltadebug()
        .arg("bench")
        .arg("--manifest")
        .arg(&manifest)
        .assert()
        .success();
}

#[test]
fn show_prints_a_stored_table() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("results.json");
    let mut set = ResultSet::new();
    for (algorithm, output_size) in [("ddmin", 12), ("ProbDD", 14)] {
        set.push(RunResult {
            file: "sample.bin".to_string(),
            algorithm: algorithm.to_string(),
            cache: "None".to_string(),
            input_size: 100,
            output_size,
            count: 40,
            time: 0.5,
        });
    }
    set.store(&path).expect("store");

    deltadebug()
        .arg("show")
        .arg(&path)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("ProbDD")
                .and(predicate::str::contains("0.88"))
                .and(predicate::str::contains("sample.bin").not()),
        );
    deltadebug()
        .args(["show", "--all-columns"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("sample.bin"));
}
