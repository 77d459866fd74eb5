mod common;

use std::fs;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use verif_config::config::{ConfigSource, ParsedConfig};
use verif_config::error::VerifError;

use common::{Home, SAMPLE_CONFIG, sample_config};

#[test]
fn load_from_file() {
    let home = Home::empty();
    let path = home.root.join("config.yaml");
    fs::write(path.as_std_path(), SAMPLE_CONFIG).unwrap();

    let config = ParsedConfig::load(&path).unwrap();
    assert_eq!(config.raw("general.event_type").unwrap(), "flood");
}

#[test]
fn missing_file_is_a_read_error() {
    let err = ParsedConfig::load(&Utf8PathBuf::from("/nonexistent/config.yaml")).unwrap_err();
    assert_matches!(err, VerifError::ConfigRead(_));
}

#[test]
fn invalid_yaml_is_a_parse_error() {
    let err = ParsedConfig::from_yaml_str("general: [unclosed").unwrap_err();
    assert_matches!(err, VerifError::ConfigParse(_));
    let err = ParsedConfig::from_yaml_str("- a\n- b\n").unwrap_err();
    assert_matches!(err, VerifError::ConfigParse(_));
}

#[test]
fn raw_keeps_tokens_and_value_resolves_them() {
    let config = sample_config();
    assert_eq!(
        config.raw("system.archive_timestamp").unwrap(),
        "@YYYY@/@MM@/@DD@/@HH@"
    );
    assert_eq!(config.system_value("archive_timestamp").unwrap(), "2023/01/01/00");
    assert_eq!(
        config.value("file_templates.fullpos.archive").unwrap(),
        "GRIBPFDEOD+0000h00m00s"
    );
}

#[test]
fn substitute_leaves_unknown_tokens() {
    let config = sample_config();
    assert_eq!(
        config.substitute("ectmp:/@USER@/deode/@CNMEXP@"),
        "ectmp:/@USER@/deode/DEOD"
    );
}

#[test]
fn typed_accessors_reject_text() {
    let config = sample_config();
    let err = config.get_f64("domain.name").unwrap_err();
    assert_matches!(err, VerifError::InvalidConfigValue { key, .. } if key == "domain.name");
    assert_eq!(config.get_i64("domain.nimax").unwrap(), 400);
    assert_eq!(config.get_f64("domain.xlon0").unwrap(), -4.0);
}
