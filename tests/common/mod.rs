#![allow(dead_code)]

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde_yaml::Value;
use tempfile::TempDir;

use verif_config::config::ParsedConfig;
use verif_config::env::VerifEnv;

pub const SAMPLE_CONFIG: &str = r#"
macros:
  CNMEXP: DEOD
  YYYY: "2023"
  MM: "01"
  DD: "01"
  HH: "00"
  LLLH: "0000"
  LM: "00"
  LS: "00"
  ARCHIVE_TIMESTAMP: "@YYYY@/@MM@/@DD@/@HH@"
  DURATION: "@LLLH@h@LM@m@LS@s"
general:
  cnmexp: DEOD
  csc: AROME
  cycle: CY46h1
  event_type: flood
  times:
    start: "2023-01-01T00:00:00Z"
    end: "2023-01-01T12:00:00Z"
    cycle_length: PT6H
    forecast_range: PT24H
domain:
  name: SPAIN
  nimax: 400
  njmax: 400
  xdx: 2500.0
  xdy: 2500.0
  xlatcen: 40.0
  xloncen: -4.0
  xlat0: 40.0
  xlon0: -4.0
file_templates:
  duration:
    archive: "@LLLH@h@LM@m@LS@s"
  fullpos:
    archive: "GRIBPF@CNMEXP@+@DURATION@"
system:
  archive_timestamp: "@YYYY@/@MM@/@DD@/@HH@"
  archive: "/scratch/@CNMEXP@/archive/@ARCHIVE_TIMESTAMP@"
archiving:
  prefix:
    ecfs: "ectmp:/@USER@/deode/@CNMEXP@"
  hour:
    ecfs:
      grib_files:
        outpath: "@ARCHIVE_TIMESTAMP@/grib"
"#;

pub const CASE_TEMPLATE: &str = "dates:\n  ini: null\n  end: null\nlocation:\n  NOzoom: []\nverif_domain: {}\n";

pub const EXP_TEMPLATE: &str = "model:\n  name: null\nformat:\n  filepaths: []\n  filename: null\n  fileformat: null\ninits: {}\nvars: {}\n";

pub fn sample_config() -> ParsedConfig {
    config_with(&[])
}

/// The sample configuration with textual replacements applied.
pub fn config_with(replacements: &[(&str, &str)]) -> ParsedConfig {
    let mut text = SAMPLE_CONFIG.to_string();
    for (from, to) in replacements {
        assert!(text.contains(from), "fixture does not contain {from:?}");
        text = text.replace(from, to);
    }
    ParsedConfig::from_yaml_str(&text).unwrap()
}

pub struct Home {
    _dir: TempDir,
    pub root: Utf8PathBuf,
}

impl Home {
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        Self { _dir: dir, root }
    }

    pub fn with_templates() -> Self {
        let home = Self::empty();
        let templates = home.root.join("config").join("templates");
        fs::create_dir_all(templates.as_std_path()).unwrap();
        fs::write(templates.join("config_Case.yaml").as_std_path(), CASE_TEMPLATE).unwrap();
        fs::write(templates.join("config_exp.yaml").as_std_path(), EXP_TEMPLATE).unwrap();
        home
    }

    pub fn env(&self) -> VerifEnv {
        VerifEnv::new(self.root.clone())
    }

    pub fn case_path(&self) -> Utf8PathBuf {
        self.root
            .join("config")
            .join("Case")
            .join("config_flood_SPAIN_20230101.yaml")
    }

    pub fn exp_path(&self) -> Utf8PathBuf {
        self.root
            .join("config")
            .join("exp")
            .join("config_DEOD_cy46h1_AR_SPAIN.yaml")
    }
}

pub fn read_yaml(path: &Utf8Path) -> Value {
    let content = fs::read_to_string(path.as_std_path()).unwrap();
    serde_yaml::from_str(&content).unwrap()
}

pub fn write_yaml(path: &Utf8Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap().as_std_path()).unwrap();
    fs::write(path.as_std_path(), content).unwrap();
}
