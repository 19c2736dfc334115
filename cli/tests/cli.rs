use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

#[test]
fn formats_flat_request_lines() {
    cargo_bin_cmd!("cfgreq")
        .args(["size=%d", "100", "label=%s", "x"])
        .assert()
        .success()
        .stdout("size= 100\nlabel= \"x\"\n");
}

#[test]
fn passes_plain_text_through() {
    cargo_bin_cmd!("cfgreq")
        .args(["response = \"OK\"\n", "token=%d", "-3"])
        .assert()
        .success()
        .stdout("response = \"OK\"\ntoken= -3\n");
}

#[test]
fn builds_tree_output() {
    cargo_bin_cmd!("cfgreq")
        .arg("--tree")
        .args(["size=%d", "100", "label = %s", "x"])
        .assert()
        .success()
        .stdout("size=100\nlabel=\"x\"\n");
}

#[test]
fn edits_flag_fields() {
    cargo_bin_cmd!("cfgreq")
        .args(["--flag", "opts=ro", "--flag", "opts=rw"])
        .args(["size=%d", "1"])
        .assert()
        .success()
        .stdout("opts=[\"rw\", \"ro\"]\nsize=1\n");

    cargo_bin_cmd!("cfgreq")
        .args(["--flag", "opts=ro", "--flag", "opts=rw", "--unflag", "opts=ro"])
        .assert()
        .success()
        .stdout("opts=\"rw\"\n");

    cargo_bin_cmd!("cfgreq")
        .args(["--flag", "opts=ro", "--unflag", "opts=ro"])
        .assert()
        .success()
        .stdout("opts=[]\n");
}

#[test]
fn prints_tree_as_json() {
    let expected = "{\n  \"size\": 100,\n  \"label\": \"x\"\n}\n";

    cargo_bin_cmd!("cfgreq")
        .arg("--json")
        .args(["size=%d", "100", "label=%s", "x"])
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn writes_to_output_file() {
    let dir = TempDir::new().expect("tempdir");
    let output = dir.path().join("request.txt");

    cargo_bin_cmd!("cfgreq")
        .args(["-o", output.to_str().expect("output path")])
        .args(["size=%d", "100"])
        .assert()
        .success()
        .stdout(contains("Wrote 10 bytes").and(contains("request.txt")));

    let contents = fs::read_to_string(&output).expect("read output");
    assert_eq!(contents, "size= 100\n");
}

#[test]
fn rejects_tag_without_separator() {
    cargo_bin_cmd!("cfgreq")
        .arg("nokey")
        .assert()
        .failure()
        .stderr(contains("ERROR").and(contains("bad format string")));
}

#[test]
fn rejects_tree_markers() {
    cargo_bin_cmd!("cfgreq")
        .args(["--tree", "vg=%t"])
        .assert()
        .failure()
        .stderr(contains("tree arguments"));
}

#[test]
fn rejects_non_numeric_integer() {
    cargo_bin_cmd!("cfgreq")
        .args(["size=%d", "big"])
        .assert()
        .failure()
        .stderr(contains("invalid integer"));
}

#[test]
fn buffer_limit_reports_allocation_failure() {
    cargo_bin_cmd!("cfgreq")
        .args(["--limit", "4", "size=%d", "100"])
        .assert()
        .failure()
        .stdout("")
        .stderr(contains("allocation failed"));
}
