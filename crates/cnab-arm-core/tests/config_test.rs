use cnab_arm_core::{ConverterConfig, ExposureMode};
use std::path::Path;
use tempfile::TempDir;

#[test]
fn load_returns_defaults_when_no_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = ConverterConfig::load(tmp.path()).unwrap();

    assert_eq!(config.generate.bundle, Path::new("bundle.json"));
    assert_eq!(config.generate.output, Path::new("azuredeploy.json"));
    assert!(!config.generate.overwrite);
    assert!(!config.generate.indent);
    assert_eq!(config.generate.mode, ExposureMode::Advanced);
    assert_eq!(
        config.driver.image,
        "cnabquickstarts.azurecr.io/cnabarmdriver"
    );
    assert_eq!(config.driver.version, "latest");
}

#[test]
fn load_parses_full_config() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[generate]
bundle = "dist/bundle.json"
output = "out/template.json"
overwrite = true
indent = true
mode = "simplified"

[driver]
image = "myregistry.azurecr.io/driver"
version = "0.4.3"
"#;
    std::fs::write(tmp.path().join("cnab-arm.toml"), toml).unwrap();

    let config = ConverterConfig::load(tmp.path()).unwrap();

    assert_eq!(config.generate.bundle, Path::new("dist/bundle.json"));
    assert_eq!(config.generate.output, Path::new("out/template.json"));
    assert!(config.generate.overwrite);
    assert!(config.generate.indent);
    assert_eq!(config.generate.mode, ExposureMode::Simplified);
    assert_eq!(config.driver.image, "myregistry.azurecr.io/driver");
    assert_eq!(config.driver.version, "0.4.3");
}

#[test]
fn load_partial_config_fills_defaults() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[driver]
version = "1.0.0"
"#;
    std::fs::write(tmp.path().join("cnab-arm.toml"), toml).unwrap();

    let config = ConverterConfig::load(tmp.path()).unwrap();

    assert_eq!(config.driver.version, "1.0.0");
    // Defaults preserved
    assert_eq!(
        config.driver.image,
        "cnabquickstarts.azurecr.io/cnabarmdriver"
    );
    assert_eq!(config.generate.output, Path::new("azuredeploy.json"));
    assert_eq!(config.generate.mode, ExposureMode::Advanced);
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("cnab-arm.toml"), "not valid {{{{ toml").unwrap();

    let result = ConverterConfig::load(tmp.path());
    assert!(result.is_err());

    let err = result.unwrap_err().to_string();
    assert!(err.contains("parse"));
}

#[test]
fn load_unknown_mode_returns_parse_error() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("cnab-arm.toml"),
        "[generate]\nmode = \"expert\"\n",
    )
    .unwrap();

    let result = ConverterConfig::load(tmp.path());
    assert!(result.is_err());
}

#[test]
fn load_empty_config_returns_defaults() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("cnab-arm.toml"), "").unwrap();

    let config = ConverterConfig::load(tmp.path()).unwrap();
    assert_eq!(config.driver.version, "latest");
}

#[test]
fn driver_image_reference_joins_repository_and_version() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("cnab-arm.toml"),
        "[driver]\nversion = \"v2\"\n",
    )
    .unwrap();

    let config = ConverterConfig::load(tmp.path()).unwrap();
    assert_eq!(
        config.driver.image_reference(),
        "cnabquickstarts.azurecr.io/cnabarmdriver:v2"
    );
}
