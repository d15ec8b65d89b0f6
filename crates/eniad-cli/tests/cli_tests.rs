//! Black-box CLI tests that stay off the network

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("eniad")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn ask_requires_a_query() {
    Command::cargo_bin("eniad")
        .unwrap()
        .arg("ask")
        .assert()
        .failure();
}

#[test]
fn no_rag_without_search_is_rejected() {
    Command::cargo_bin("eniad")
        .unwrap()
        .args(["ask", "--no-rag", "bonjour"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to do"));
}

#[test]
fn unknown_language_is_rejected() {
    Command::cargo_bin("eniad")
        .unwrap()
        .args(["ask", "--language", "xx", "bonjour"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown language"));
}
