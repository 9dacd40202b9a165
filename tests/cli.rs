// tests/cli.rs

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// Helper to write a fixture file into the test directory
fn write_fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

fn task_arg(input: &Path, dictionary: &Path) -> String {
    format!("{}={}", input.display(), dictionary.display())
}

fn spelltally(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("spelltally").unwrap();
    cmd.current_dir(dir.path()).arg("--no-color");
    cmd
}

#[test]
fn test_help_lists_flags() {
    let mut cmd = Command::cargo_bin("spelltally").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("INPUT=DICTIONARY"))
        .stdout(predicate::str::contains("--log"))
        .stdout(predicate::str::contains("--no-preprocess"))
        .stdout(predicate::str::contains("--format"));
}

#[test]
fn test_batch_reports_misspelling() {
    let dir = tempdir().unwrap();
    let dict = write_fixture(&dir, "dict.txt", "the\nquick\nbrown\nfox\n");
    let doc = write_fixture(&dir, "doc.txt", "The quick brown fox jumps!\n");

    spelltally(&dir)
        .arg(task_arg(&doc, &dict))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Number of files processed: 1"))
        .stdout(predicate::str::contains("Number of spelling errors: 1"))
        .stdout(predicate::str::contains("jumps (1 time)"));
}

#[test]
fn test_no_fail_exits_cleanly() {
    let dir = tempdir().unwrap();
    let dict = write_fixture(&dir, "dict.txt", "cat\n");
    let doc = write_fixture(&dir, "doc.txt", "cta cat\n");

    spelltally(&dir)
        .args(["--no-fail", &task_arg(&doc, &dict)])
        .assert()
        .success();
}

#[test]
fn test_clean_documents_are_not_counted() {
    let dir = tempdir().unwrap();
    let dict = write_fixture(&dir, "dict.txt", "hello world\n");
    let doc = write_fixture(&dir, "doc.txt", "Hello, world!\n");

    spelltally(&dir)
        .arg(task_arg(&doc, &dict))
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of files processed: 0"))
        .stdout(predicate::str::contains("There are no misspelled words"));
}

#[test]
fn test_shared_misspelling_is_counted_across_tasks() {
    let dir = tempdir().unwrap();
    let dict = write_fixture(&dir, "dict.txt", "the cat sat\n");
    let first = write_fixture(&dir, "first.txt", "teh cat sat\n");
    let second = write_fixture(&dir, "second.txt", "the cat sat teh\n");

    spelltally(&dir)
        .args(["--no-fail", &task_arg(&first, &dict), &task_arg(&second, &dict)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of files processed: 2"))
        .stdout(predicate::str::contains("teh (2 times)"));
}

/// Deterministic lowercase word for `n` ("a", "b", ..., "ba", ...)
fn generated_word(mut n: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'a' + (n % 26) as u8);
        n /= 26;
        if n == 0 {
            break;
        }
    }
    letters.reverse();
    String::from_utf8(letters).unwrap()
}

#[test]
fn test_many_tasks_sharing_one_dictionary_see_all_words() {
    let dir = tempdir().unwrap();
    let words: Vec<String> = (0..30_000).map(generated_word).collect();
    let dict = write_fixture(&dir, "dict.txt", &words.join("\n"));

    let mut args = vec!["--no-fail".to_string()];
    for i in 0..40 {
        let body: Vec<&str> = words
            .iter()
            .skip(i * 37)
            .step_by(13)
            .take(2000)
            .map(String::as_str)
            .collect();
        let doc = write_fixture(&dir, &format!("doc{i}.txt"), &body.join(" "));
        args.push(task_arg(&doc, &dict));
    }

    spelltally(&dir)
        .args(&args)
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of files processed: 0"))
        .stdout(predicate::str::contains("Number of spelling errors: 0"))
        .stdout(predicate::str::contains("There are no misspelled words"));
}

#[test]
fn test_same_document_submitted_twice_is_checked_twice() {
    let dir = tempdir().unwrap();
    let dict = write_fixture(&dir, "dict.txt", "the cat sat\n");
    let doc = write_fixture(&dir, "doc.txt", "teh cat sat\n");
    let task = task_arg(&doc, &dict);

    spelltally(&dir)
        .args(["--no-fail", &task, &task])
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of files processed: 2"))
        .stdout(predicate::str::contains("teh (2 times)"));
}

#[test]
fn test_missing_dictionary_is_reported() {
    let dir = tempdir().unwrap();
    let doc = write_fixture(&dir, "doc.txt", "teh\n");
    let missing = dir.path().join("missing-dict.txt");

    spelltally(&dir)
        .arg(task_arg(&doc, &missing))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to open dictionary file"))
        .stderr(predicate::str::contains("missing-dict.txt"))
        .stdout(predicate::str::contains("Number of files processed: 0"))
        .stdout(predicate::str::contains("Number of failed tasks: 1"));
}

#[test]
fn test_log_file_records_documents_with_errors() {
    let dir = tempdir().unwrap();
    let dict = write_fixture(&dir, "dict.txt", "the cat\n");
    let doc = write_fixture(&dir, "doc.txt", "teh cat\n");
    let log = dir.path().join("report.out");

    spelltally(&dir)
        .args([
            "--no-fail",
            "--log",
            "--log-file",
            log.to_str().unwrap(),
            &task_arg(&doc, &dict),
        ])
        .assert()
        .success();

    let content = fs::read_to_string(&log).unwrap();
    assert_eq!(content, format!("{} 1 teh\n", doc.display()));
}

#[test]
fn test_curly_apostrophes_are_straightened() {
    let dir = tempdir().unwrap();
    let dict = write_fixture(&dir, "dict.txt", "don't stop\n");
    let doc = write_fixture(&dir, "doc.txt", "Don\u{2019}t stop\n");

    spelltally(&dir)
        .arg(task_arg(&doc, &dict))
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of spelling errors: 0"));

    assert!(dir.path().join("processed_doc.txt").exists());
}

#[test]
fn test_json_summary() {
    let dir = tempdir().unwrap();
    let dict = write_fixture(&dir, "dict.txt", "a b c\n");
    let doc = write_fixture(&dir, "doc.txt", "a xx b yy xx\n");

    let output = spelltally(&dir)
        .args(["--no-fail", "--format", "json", &task_arg(&doc, &dict)])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["files_with_errors"], 1);
    assert_eq!(json["total_misspelled"], 3);
    assert_eq!(json["distinct_words"], 2);
    assert_eq!(json["top"][0]["word"], "xx");
    assert_eq!(json["top"][0]["count"], 2);
}

#[test]
fn test_malformed_task_is_rejected() {
    let dir = tempdir().unwrap();

    spelltally(&dir)
        .arg("no-separator")
        .assert()
        .failure()
        .stderr(predicate::str::contains("INPUT=DICTIONARY"));
}
