//! Integration tests for loading and writing config files on disk.

use std::path::PathBuf;

use falsecolor::config::{init_config, Config, ConfigError};
use falsecolor::exposure::ExposureFormula;
use falsecolor::viewport::Orientation;

// ==================== Loading ====================

#[test]
fn test_explicit_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");
    match Config::load(Some(&path)) {
        Err(ConfigError::Read { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("Expected Read error, got {:?}", other),
    }
}

#[test]
fn test_load_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[sensor]
orientation = 270
width = 320
height = 240

[preview]
fps = 12

[snapshot]
legend_width = 120
output_dir = "/tmp/shots"
"#,
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.orientation(), Orientation::Deg270);
    assert_eq!(config.controls.max_progress, 5000);

    let settings = config.source_settings();
    assert_eq!((settings.width, settings.height, settings.fps), (320, 240, 12));
    assert_eq!(settings.orientation, Orientation::Deg270);

    assert_eq!(config.annotator_config().legend_width, 120);
    assert_eq!(config.snapshot.output_dir, PathBuf::from("/tmp/shots"));
}

#[test]
fn test_parse_error_names_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[sensor\niso_range = 3").unwrap();

    let err = Config::load(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("broken.toml"));
}

// ==================== Init ====================

#[test]
fn test_init_writes_loadable_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("falsecolor").join("config.toml");

    init_config(&path).unwrap();
    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.exposure.formula, ExposureFormula::IsoTime);
}

#[test]
fn test_init_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "# mine\n").unwrap();

    match init_config(&path) {
        Err(ConfigError::AlreadyExists(p)) => assert_eq!(p, path),
        other => panic!("Expected AlreadyExists, got {:?}", other),
    }
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");
}
