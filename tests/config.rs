// Config file loading and saving
use std::fs;
use std::path::PathBuf;
use sumtopic::config::AppConfig;
use sumtopic::types::SumTopicError;

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sumtopic.toml");

    let mut config = AppConfig::default();
    config.limits.max_chars = 2000;
    config.budget.long = [90, 220];
    config.models.num_beams = Some(2);
    config.ui.highlight = "green".to_string();
    config.save(&path).unwrap();

    let loaded = AppConfig::load_from(&path).unwrap();
    assert_eq!(loaded.limits.max_chars, 2000);
    assert_eq!(loaded.budget.long, [90, 220]);
    assert_eq!(loaded.models.num_beams, Some(2));
    assert_eq!(loaded.ui.highlight, "green");
}

#[test]
fn explicit_path_is_used_and_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, "[limits]\nmin_words = 20\n").unwrap();

    let (config, used) = AppConfig::load(Some(&path)).unwrap();
    assert_eq!(config.limits.min_words, 20);
    assert_eq!(used, Some(path));
}

#[test]
fn missing_explicit_path_is_an_error() {
    let path = PathBuf::from("/nonexistent/sumtopic/custom.toml");
    let err = AppConfig::load(Some(&path)).unwrap_err();
    assert!(matches!(err, SumTopicError::Config(_)));
}

#[test]
fn invalid_file_reports_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[limits]\nmax_chars = 0\n").unwrap();

    let err = AppConfig::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("max_chars"));
}
