use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn one_shot_prompt_prints_echoed_text() {
    let home = tempdir().unwrap();
    cargo_bin_cmd!("zdx")
        .env("ZDX_HOME", home.path())
        .args(["--prompt", "hello there"])
        .assert()
        .success()
        .stdout(predicate::str::contains("echo: hello there"));
}

#[test]
fn one_shot_json_prints_valid_turn_result() {
    let home = tempdir().unwrap();
    let output = cargo_bin_cmd!("zdx")
        .env("ZDX_HOME", home.path())
        .args(["--prompt", "ping", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON on stdout");
    assert_eq!(value["final_text"], "echo: ping");
    assert!(value["messages"].as_array().unwrap().len() >= 2);
}

#[test]
fn disabling_interactive_without_prompt_errors() {
    let home = tempdir().unwrap();
    std::fs::write(home.path().join("config.toml"), "interactive = false\n").unwrap();
    cargo_bin_cmd!("zdx")
        .env("ZDX_HOME", home.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("interactive mode is disabled"));
}
