use std::collections::BTreeMap;
use std::fs;
use std::sync::LazyLock;

use camino::{Utf8Path, Utf8PathBuf};
use regex::{Captures, Regex};
use serde_yaml::Value;

use crate::error::VerifError;

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

const MAX_SUBSTITUTION_PASSES: usize = 8;

static MACRO_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@([A-Za-z0-9_]+)@").unwrap());

/// Key-path addressable experiment configuration with macro resolution.
pub trait ConfigSource {
    /// Unresolved scalar at a dotted key path, rendered as a string.
    fn raw(&self, path: &str) -> Result<String, VerifError>;

    /// Expand `@NAME@` tokens the source knows about; unknown tokens stay.
    fn substitute(&self, text: &str) -> String;

    fn value(&self, path: &str) -> Result<String, VerifError> {
        Ok(self.substitute(&self.raw(path)?))
    }

    fn system_value(&self, name: &str) -> Result<String, VerifError> {
        self.value(&format!("system.{name}"))
    }

    fn get_f64(&self, path: &str) -> Result<f64, VerifError> {
        let value = self.value(path)?;
        value
            .trim()
            .parse::<f64>()
            .map_err(|err| VerifError::InvalidConfigValue {
                key: path.to_string(),
                message: format!("{value:?} is not a number: {err}"),
            })
    }

    fn get_i64(&self, path: &str) -> Result<i64, VerifError> {
        let value = self.value(path)?;
        let trimmed = value.trim();
        if let Ok(parsed) = trimmed.parse::<i64>() {
            return Ok(parsed);
        }
        match trimmed.parse::<f64>() {
            Ok(parsed) if parsed.fract() == 0.0 => Ok(parsed as i64),
            _ => Err(VerifError::InvalidConfigValue {
                key: path.to_string(),
                message: format!("{value:?} is not an integer"),
            }),
        }
    }
}

/// Experiment configuration loaded from a YAML document.
///
/// A top-level `macros` mapping provides the values substituted for
/// `@NAME@` tokens when values are resolved.
#[derive(Debug, Clone)]
pub struct ParsedConfig {
    root: Value,
    macros: BTreeMap<String, String>,
}

impl ParsedConfig {
    pub fn load(path: &Utf8Path) -> Result<Self, VerifError> {
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|_| VerifError::ConfigRead(path.to_path_buf()))?;
        Self::from_yaml_str(&content)
    }

    pub fn resolve(path: Option<&str>) -> Result<Self, VerifError> {
        let config_path = Utf8PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        tracing::debug!(path = %config_path, "loading experiment configuration");
        Self::load(&config_path)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, VerifError> {
        let root: Value =
            serde_yaml::from_str(content).map_err(|err| VerifError::ConfigParse(err.to_string()))?;
        if !root.is_mapping() {
            return Err(VerifError::ConfigParse(
                "expected a mapping at the document root".to_string(),
            ));
        }

        let mut macros = BTreeMap::new();
        if let Some(Value::Mapping(entries)) = root.get("macros") {
            for (key, value) in entries {
                let (Some(name), Some(text)) = (key.as_str(), scalar_to_string(value)) else {
                    continue;
                };
                macros.insert(name.to_string(), text);
            }
        }

        Ok(Self { root, macros })
    }

    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut current = &self.root;
        for segment in path.split('.') {
            current = current.as_mapping()?.get(segment)?;
        }
        if current.is_null() {
            return None;
        }
        Some(current)
    }
}

impl ConfigSource for ParsedConfig {
    fn raw(&self, path: &str) -> Result<String, VerifError> {
        let value = self
            .lookup(path)
            .ok_or_else(|| VerifError::MissingConfigKey(path.to_string()))?;
        scalar_to_string(value).ok_or_else(|| VerifError::InvalidConfigValue {
            key: path.to_string(),
            message: "expected a scalar value".to_string(),
        })
    }

    fn substitute(&self, text: &str) -> String {
        let mut current = text.to_string();
        for _ in 0..MAX_SUBSTITUTION_PASSES {
            let next = MACRO_TOKEN
                .replace_all(&current, |caps: &Captures<'_>| {
                    self.macros
                        .get(&caps[1])
                        .cloned()
                        .unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const SAMPLE: &str = r#"
macros:
  CNMEXP: DEOD
  ARCHIVE_ROOT: /scratch/@CNMEXP@
general:
  cnmexp: DEOD
  times:
    cycle_length: PT6H
domain:
  nimax: 500
  xdx: 2500.0
system:
  archive: "@ARCHIVE_ROOT@/archive/@UNKNOWN@"
"#;

    #[test]
    fn lookup_nested_keys() {
        let config = ParsedConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.raw("general.times.cycle_length").unwrap(), "PT6H");
        assert_eq!(config.get_i64("domain.nimax").unwrap(), 500);
        assert_eq!(config.get_f64("domain.xdx").unwrap(), 2500.0);
    }

    #[test]
    fn missing_key_is_reported_with_path() {
        let config = ParsedConfig::from_yaml_str(SAMPLE).unwrap();
        let err = config.raw("domain.njmax").unwrap_err();
        assert_matches!(err, VerifError::MissingConfigKey(key) if key == "domain.njmax");
    }

    #[test]
    fn nested_macros_resolve_and_unknown_tokens_survive() {
        let config = ParsedConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(
            config.system_value("archive").unwrap(),
            "/scratch/DEOD/archive/@UNKNOWN@"
        );
    }

    #[test]
    fn non_scalar_value_is_invalid() {
        let config = ParsedConfig::from_yaml_str(SAMPLE).unwrap();
        let err = config.raw("general.times").unwrap_err();
        assert_matches!(err, VerifError::InvalidConfigValue { .. });
    }
}
