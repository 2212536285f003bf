use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("caption-forge").unwrap();
    cmd.env_remove("GEMINI_API_KEY").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("proxies"));
}

#[test]
fn test_proxies_lists_default_instances_in_order() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .env("HOME", dir.path())
        .arg("proxies")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. inv.tux.pizza"))
        .stdout(predicate::str::contains("5. invidious.fdn.fr"));
}

#[test]
fn test_generate_without_api_key_fails_before_network() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.yaml");
    std::fs::write(&config, "proxy:\n  endpoints:\n    - http://127.0.0.1:9\n").unwrap();

    cmd()
        .args(["--quiet", "--config"])
        .arg(&config)
        .args(["generate", "https://youtu.be/dQw4w9WgXcQ"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key required"));
}

#[test]
fn test_generate_with_invalid_url_fails() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .env("HOME", dir.path())
        .args(["--quiet", "generate", "https://example.com/watch", "--api-key", "k"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid URL"));
}

#[test]
fn test_generate_rejects_unsupported_language() {
    cmd()
        .args(["generate", "https://youtu.be/dQw4w9WgXcQ", "--api-key", "k", "-l", "french"])
        .assert()
        .failure();
}

#[test]
fn test_config_init_writes_loadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");

    cmd()
        .args(["config", "--init", "--config"])
        .arg(&path)
        .assert()
        .success();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("gemini-2.5-flash"));
    assert!(written.contains("https://invidious.fdn.fr"));

    cmd()
        .args(["config", "--init", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_show_prints_settings_and_bare_config_prints_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "synthesis:\n  model: gemini-2.5-pro\n").unwrap();

    cmd()
        .args(["config", "--show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Model: gemini-2.5-pro"))
        .stdout(predicate::str::contains("Config file:").not());

    cmd()
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Config file:"))
        .stdout(predicate::str::contains("Model:").not());
}
