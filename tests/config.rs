use repairman::config::{ensure_default_config, SystemConfig};
use repairman::input::InputMode;

#[tokio::test]
async fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("absent.toml");

    let config = SystemConfig::load(&path).await.expect("load defaults");
    assert_eq!(config, SystemConfig::default());
    assert!(config.haptics.vibration_enabled);
}

#[tokio::test]
async fn file_values_are_loaded_and_normalized() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("system_config.toml");
    std::fs::write(
        &path,
        r#"
[input]
tick_interval_ms = 0
initial_mode = "Keyboard"

[haptics]
vibration_enabled = false
low_frequency_motor = 1.4
high_frequency_motor = 0.5
stop_delay_ms = 120

[danger]
tags = ["Enemy", "Needle"]
"#,
    )
    .expect("write config");

    let config = SystemConfig::load(&path).await.expect("load config");
    assert_eq!(config.input.tick_interval_ms, 1);
    assert_eq!(config.input.initial_mode, InputMode::Keyboard);
    assert!(!config.haptics.vibration_enabled);
    assert_eq!(config.haptics.low_frequency_motor, 1.0);
    assert_eq!(config.haptics.high_frequency_motor, 0.5);
    assert_eq!(config.haptics.stop_delay_ms, 120);
    assert_eq!(config.danger.tags, vec!["Enemy", "Needle"]);
}

#[tokio::test]
async fn malformed_file_is_an_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("system_config.toml");
    std::fs::write(&path, "[haptics\nvibration_enabled = ").expect("write config");

    assert!(SystemConfig::load(&path).await.is_err());
}

#[tokio::test]
async fn ensure_default_writes_once_and_round_trips() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("nested").join("system_config.toml");

    ensure_default_config(&path).await.expect("write default");
    assert!(path.exists());
    let loaded = SystemConfig::load(&path).await.expect("load written default");
    assert_eq!(loaded, SystemConfig::default());

    // An existing file is left alone
    std::fs::write(&path, "[haptics]\nvibration_enabled = false\n").expect("overwrite");
    ensure_default_config(&path).await.expect("second ensure");
    let kept = SystemConfig::load(&path).await.expect("load kept");
    assert!(!kept.haptics.vibration_enabled);
}
