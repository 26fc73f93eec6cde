use coxswain::config::{ConfigError, Settings, DEFAULT_ENGINE_PORT};
use std::fs;
use tempfile::tempdir;

fn write_settings(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    fs::write(&path, contents).expect("write settings");
    (dir, path)
}

#[test]
fn default_settings_validate_cleanly() {
    let settings = Settings::default();
    settings.validate().expect("default settings");
    let (host, port) = settings.resolve_server("localhost").expect("localhost");
    assert_eq!(host, "localhost");
    assert_eq!(port, DEFAULT_ENGINE_PORT);
}

#[test]
fn settings_parse_from_yaml_with_per_server_port_override() {
    let (_dir, path) = write_settings(
        "servers:\n  broad:\n    host: engine.internal\n    port: 8443\n  localhost:\n    host: localhost\nport: 9000\ntimezone: US/Eastern\nnotify:\n  domain: example.org\n",
    );
    let settings = Settings::from_path(&path).expect("parse settings");
    settings.validate().expect("validate settings");

    let (host, port) = settings.resolve_server("broad").expect("broad");
    assert_eq!(host, "engine.internal");
    assert_eq!(port, 8443);

    let (host, port) = settings.resolve_server("localhost").expect("localhost");
    assert_eq!(host, "localhost");
    assert_eq!(port, 9000);

    assert_eq!(settings.notify.domain, "example.org");
    assert_eq!(settings.timezone(), chrono_tz::US::Eastern);
}

#[test]
fn unknown_server_error_lists_the_configured_names() {
    let settings = Settings::default();
    let err = settings.resolve_server("cloud").expect_err("unknown server");
    match &err {
        ConfigError::UnknownServer { name, known } => {
            assert_eq!(name, "cloud");
            assert!(known.contains("localhost"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn unknown_timezone_fails_validation() {
    let (_dir, path) = write_settings(
        "servers:\n  localhost:\n    host: localhost\ntimezone: Mars/Olympus\n",
    );
    let settings = Settings::from_path(&path).expect("parse settings");
    let err = settings.validate().expect_err("bad timezone");
    assert!(err.to_string().contains("Mars/Olympus"));
}

#[test]
fn empty_server_map_fails_validation() {
    let (_dir, path) = write_settings("servers: {}\n");
    let settings = Settings::from_path(&path).expect("parse settings");
    let err = settings.validate().expect_err("no servers");
    assert!(err.to_string().contains("servers"));
}

#[test]
fn relative_app_dir_fails_validation() {
    let (_dir, path) = write_settings(
        "servers:\n  localhost:\n    host: localhost\napp_dir: apps\n",
    );
    let settings = Settings::from_path(&path).expect("parse settings");
    let err = settings.validate().expect_err("relative app dir");
    assert!(err.to_string().contains("app_dir"));
}

#[test]
fn missing_settings_file_falls_back_to_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("absent.yaml");
    let settings = Settings::load_or_default(&path).expect("load default");
    settings.validate().expect("default settings");
    assert_eq!(settings.query_days, 7);
    assert_eq!(settings.monitor.interval_secs, 30);
    assert_eq!(settings.monitor.submit_grace_secs, 5);
}

#[test]
fn unreadable_settings_file_reports_the_path() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    let err = Settings::from_path(&path).expect_err("missing file");
    assert!(err.to_string().contains("config.yaml"));
}
