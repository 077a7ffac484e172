use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn durfmt(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("durfmt").unwrap();
    cmd.env("HOME", home.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_render_default_format() {
    let home = TempDir::new().unwrap();
    durfmt(&home)
        .args(["render", "46387124"])
        .assert()
        .success()
        .stdout("12:53:07.124\n");
}

#[test]
fn test_render_with_pattern() {
    let home = TempDir::new().unwrap();
    durfmt(&home)
        .args(["render", "999", "--format", "ss.l"])
        .assert()
        .success()
        .stdout("00.9\n");
}

#[test]
fn test_render_rejects_bad_pattern() {
    let home = TempDir::new().unwrap();
    durfmt(&home)
        .args(["render", "0", "--format", "hhmm:ss"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid format"));
}

#[test]
fn test_parse_outputs_millis() {
    let home = TempDir::new().unwrap();
    durfmt(&home)
        .args(["parse", "00:00:01,500"])
        .assert()
        .success()
        .stdout("1500\n");
}

#[test]
fn test_parse_auto_single_colon() {
    let home = TempDir::new().unwrap();
    durfmt(&home)
        .args(["parse", "--auto", "53:07"])
        .assert()
        .success()
        .stdout("3187000\n");
}

#[test]
fn test_parse_malformed_fails() {
    let home = TempDir::new().unwrap();
    durfmt(&home)
        .args(["parse", "00:aa:01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed duration text"));
}

#[test]
fn test_parse_json_contract() {
    let home = TempDir::new().unwrap();
    let output = durfmt(&home)
        .args(["--output", "json", "parse", "1:02:03.004"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["millis"], 3_723_004);
    assert_eq!(json["format"], "hh:mm:ss.lll");
    assert_eq!(json["units"], "1h 2m 3s 4ms");
}

#[test]
fn test_derive_command() {
    let home = TempDir::new().unwrap();
    durfmt(&home)
        .args(["derive", "12:53:07.124"])
        .assert()
        .success()
        .stdout("hh:mm:ss.lll\n");
}

#[test]
fn test_units_command() {
    let home = TempDir::new().unwrap();
    durfmt(&home)
        .args(["units", "4534000"])
        .assert()
        .success()
        .stdout("1h 15m 34s\n");
}

#[test]
fn test_describe_lists_fields() {
    let home = TempDir::new().unwrap();
    durfmt(&home)
        .args(["describe", "mm:ss"])
        .assert()
        .success()
        .stdout(predicate::str::contains("minutes"))
        .stdout(predicate::str::contains("Zero renders as: 00:00"));
}

#[test]
fn test_config_pattern_is_used() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join(".durfmt");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[display]\npattern = \"mm:ss\"\n",
    )
    .unwrap();

    durfmt(&home)
        .args(["render", "125000"])
        .assert()
        .success()
        .stdout("02:05\n");
}

#[test]
fn test_config_set_and_get() {
    let home = TempDir::new().unwrap();
    durfmt(&home)
        .args(["config", "set", "display.pattern", "h:mm:ss"])
        .assert()
        .success();

    durfmt(&home)
        .args(["config", "get", "display.pattern"])
        .assert()
        .success()
        .stdout("h:mm:ss\n");
}

#[test]
fn test_stopwatch_lifecycle() {
    let home = TempDir::new().unwrap();

    durfmt(&home)
        .args(["time"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No stopwatch running"));

    durfmt(&home)
        .args(["start", "--paused", "--at", "1:30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stopwatch started (paused)"));

    durfmt(&home)
        .args(["time", "--format", "mm:ss"])
        .assert()
        .success()
        .stdout("01:30 (paused)\n");

    durfmt(&home)
        .args(["skip", "-0:30"])
        .assert()
        .success();

    let output = durfmt(&home)
        .args(["--output", "json", "time"])
        .output()
        .unwrap();
    let reading: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reading["elapsed_ms"], 60_000);
    assert_eq!(reading["paused"], true);
    assert_eq!(reading["text"], "00:01:00.000");

    durfmt(&home)
        .args(["time", "--units"])
        .assert()
        .success()
        .stdout("1m 0s (paused)\n");

    durfmt(&home)
        .args(["resume"])
        .assert()
        .success()
        .stdout(predicate::str::contains("resumed"));

    durfmt(&home).args(["reset"]).assert().success();

    durfmt(&home)
        .args(["pause"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No stopwatch to pause"));
}
