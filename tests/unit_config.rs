use std::fs;

use taskpulse::config::{Config, CONFIG_FILE};

#[test]
fn config_defaults_when_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config::load_from_dir(dir.path());

    assert_eq!(config.tasks.default_category, "daily");
    assert_eq!(config.sync.plan_debounce_ms, 450);
    assert_eq!(config.plan_debounce().as_millis(), 450);
}

#[test]
fn config_overrides_from_toml() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join(CONFIG_FILE);
    let toml = r#"
[tasks]
default_category = "work"

[sync]
plan_debounce_ms = 900
"#;

    fs::write(&config_path, toml)?;

    let config = Config::load_from_dir(dir.path());

    assert_eq!(config.tasks.default_category, "work");
    assert_eq!(config.sync.plan_debounce_ms, 900);

    Ok(())
}

#[test]
fn config_load_rejects_invalid_toml() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join(CONFIG_FILE);
    fs::write(&config_path, "this = [not valid").expect("write config");

    let result = Config::load(&config_path);
    assert!(result.is_err());
}

#[test]
fn config_invalid_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join(CONFIG_FILE);
    fs::write(&config_path, "this = [not valid").expect("write config");

    let config = Config::load_from_dir(dir.path());
    assert_eq!(config.tasks.default_category, "daily");
}
