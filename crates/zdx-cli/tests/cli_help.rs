use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn help_shows_prompt_and_json_flags() {
    cargo_bin_cmd!("zdx")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--prompt"))
        .stdout(predicate::str::contains("--json"))
        .stdout(predicate::str::contains("--log-level"));
}

#[test]
fn version_flag() {
    cargo_bin_cmd!("zdx")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1"));
}

#[test]
fn json_flag_without_prompt_fails() {
    cargo_bin_cmd!("zdx").arg("--json").assert().failure();
}
