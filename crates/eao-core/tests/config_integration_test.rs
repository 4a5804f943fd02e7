use eao_core::{ConfigError, ConfigManager, EaoConfig};
use std::io::Write;

#[test]
fn load_from_reads_explicit_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        "[server]\nport = 8088\n\n[optimizer]\nmax_steps = 96\ndefault_solver = \"standard\"\n"
    )
    .unwrap();

    let manager = ConfigManager::load_from(file.path()).expect("config loads");
    assert_eq!(manager.config_path(), Some(file.path()));
    assert_eq!(manager.config().optimizer.max_steps, 96);
    // RUST_LOG / EAO_PORT could override in a developer shell; only assert when unset.
    if std::env::var("EAO_PORT").is_err() {
        assert_eq!(manager.config().server.port, 8088);
    }
}

#[test]
fn load_from_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(matches!(
        ConfigManager::load_from(&missing),
        Err(ConfigError::NotFound(_))
    ));
}

#[test]
fn load_from_rejects_broken_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[optimizer\nmax_steps = ").unwrap();
    assert!(matches!(
        ConfigManager::load_from(file.path()),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn default_config_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    ConfigManager::create_default_config(&path).expect("write default config");

    let text = std::fs::read_to_string(&path).unwrap();
    let parsed: EaoConfig = toml::from_str(&text).unwrap();
    assert_eq!(parsed.optimizer.max_steps, 480);
}

#[test]
fn from_config_validates() {
    let mut config = EaoConfig::default();
    config.optimizer.max_steps = 0;
    assert!(ConfigManager::from_config(config).is_err());
}
