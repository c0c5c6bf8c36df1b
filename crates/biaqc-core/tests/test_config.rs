use std::path::Path;

use biaqc_core::config::{BatchConfig, QcConfig};
use biaqc_core::consts::{DEFAULT_BIT_DEPTH, DEFAULT_LBP_POINTS, DEFAULT_PCA_COMPONENTS};
use biaqc_core::error::QcError;

#[test]
fn test_defaults() {
    let config = QcConfig::default();
    assert_eq!(config.intensity.default_bit_depth, DEFAULT_BIT_DEPTH);
    assert_eq!(config.texture.distances, vec![1, 2, 4, 8]);
    assert_eq!(config.texture.angles.len(), 4);
    assert_eq!(config.texture.lbp_points, DEFAULT_LBP_POINTS);
    assert_eq!(config.reduction.n_components, DEFAULT_PCA_COMPONENTS);
    assert_eq!(config.batch.threads, None);
}

#[test]
fn test_empty_toml_is_default() {
    assert_eq!(QcConfig::from_toml_str("").unwrap(), QcConfig::default());
}

#[test]
fn test_partial_toml_overrides_only_named_sections() {
    let text = r#"
[intensity]
default_bit_depth = 16

[reduction]
n_components = 3
"#;
    let config = QcConfig::from_toml_str(text).unwrap();
    assert_eq!(config.intensity.default_bit_depth, 16);
    assert_eq!(config.reduction.n_components, 3);
    assert_eq!(config.texture, QcConfig::default().texture);
}

#[test]
fn test_toml_round_trip() {
    let mut config = QcConfig::default();
    config.texture.lbp_points = 16;
    config.texture.lbp_radius = 2.0;
    config.batch.threads = Some(4);

    let text = toml::to_string(&config).unwrap();
    assert_eq!(QcConfig::from_toml_str(&text).unwrap(), config);
}

#[test]
fn test_malformed_toml_is_a_config_error() {
    let err = QcConfig::from_toml_str("[intensity]\ndefault_bit_depth = \"twelve\"").unwrap_err();
    assert!(matches!(err, QcError::Config(_)));
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("qc.toml");
    std::fs::write(&path, "[texture]\nlbp_points = 4\ndistances = [1]\nangles = [0.0]\nlbp_radius = 1.0\n").unwrap();

    let config = QcConfig::load(&path).unwrap();
    assert_eq!(config.texture.lbp_points, 4);
    assert_eq!(config.texture.distances, vec![1]);
}

#[test]
fn test_batch_extension_filter() {
    let batch = BatchConfig::default();
    assert!(batch.accepts(Path::new("/d/run.SER")));
    assert!(batch.accepts(Path::new("/d/cells.tif")));
    assert!(!batch.accepts(Path::new("/d/notes.txt")));
    assert!(!batch.accepts(Path::new("/d/noext")));
}
