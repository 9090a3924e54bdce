use assert_cmd::Command;
use predicates::prelude::*;

fn yttranscript(workdir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("yttranscript").unwrap();
    cmd.current_dir(workdir)
        .env_remove("YT_TRANSCRIPT_API_KEY")
        .env("HOME", workdir)
        .env("XDG_CONFIG_HOME", workdir.join(".config"));
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();

    yttranscript(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("transcribe"))
        .stdout(predicate::str::contains("asr"))
        .stdout(predicate::str::contains("batch"));
}

#[test]
fn test_short_api_key_fails_before_any_request() {
    let dir = tempfile::tempdir().unwrap();

    yttranscript(dir.path())
        .args(["--api-key", "short", "--base-url", "http://127.0.0.1:9", "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key must be at least 8 characters"));
}

#[test]
fn test_missing_api_key_fails() {
    let dir = tempfile::tempdir().unwrap();

    yttranscript(dir.path())
        .args(["get", "dQw4w9WgXcQ"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key"));
}

#[test]
fn test_oversized_batch_is_rejected_locally() {
    let dir = tempfile::tempdir().unwrap();
    let videos: Vec<String> = (0..101).map(|i| format!("video{:06}", i)).collect();

    yttranscript(dir.path())
        .args(["--api-key", "sk_test_123456", "--base-url", "http://127.0.0.1:9", "batch"])
        .args(&videos)
        .assert()
        .failure()
        .stderr(predicate::str::contains("at most 100"));
}

#[test]
fn test_config_show_redacts_key() {
    let dir = tempfile::tempdir().unwrap();

    yttranscript(dir.path())
        .args(["--api-key", "sk_secret_value", "config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("API Key: set (15 characters)"))
        .stdout(predicate::str::contains("sk_secret_value").not());
}

#[test]
fn test_config_init_does_not_persist_api_key() {
    let dir = tempfile::tempdir().unwrap();

    let output = yttranscript(dir.path())
        .args(["--api-key", "sk_secret_value", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration written to:"))
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output).unwrap();
    let path = stdout
        .lines()
        .find_map(|line| line.strip_prefix("Configuration written to: "))
        .unwrap();
    let written = std::fs::read_to_string(path.trim()).unwrap();

    assert!(written.contains("base_url"));
    assert!(!written.contains("sk_secret_value"));
}
