use std::cmp::Ordering;

use camino::{Utf8Path, Utf8PathBuf};
use serde_yaml::{Mapping, Value};

use crate::domain::BoundingBox;
use crate::error::VerifError;
use crate::store::ConfigStore;
use crate::times::{self, TimeSeries};
use crate::variables;

/// Margin, in degrees, between the model domain and the verification domain.
pub const VERIF_DOMAIN_MARGIN: f64 = 1.0;

pub const FILE_FORMAT: &str = "Grib";

/// Where a document being generated starts from.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// A document already written by an earlier run; only selected fields change.
    Existing { path: Utf8PathBuf, document: Value },
    /// No document yet; start from the template.
    Template { path: Utf8PathBuf, document: Value },
}

impl DocumentSource {
    pub fn open(target: &Utf8Path, template: &Utf8Path) -> Result<Self, VerifError> {
        if target.as_std_path().is_file() {
            Ok(DocumentSource::Existing {
                path: target.to_path_buf(),
                document: ConfigStore::load_document(target)?,
            })
        } else {
            Ok(DocumentSource::Template {
                path: template.to_path_buf(),
                document: ConfigStore::load_template(template)?,
            })
        }
    }

    pub fn is_existing(&self) -> bool {
        matches!(self, DocumentSource::Existing { .. })
    }
}

/// Experiment-level values written when an experiment document is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpSettings {
    pub model_name: String,
    pub archive: String,
    pub filename: String,
}

pub fn build_case_document(
    source: DocumentSource,
    series: &TimeSeries,
    bbox: &BoundingBox,
) -> Result<Value, VerifError> {
    let (Some(first_init), Some(last_fcst)) = (series.first_init(), series.last_fcst()) else {
        return Err(VerifError::EmptyTimeSeries("of the case document".to_string()));
    };

    match source {
        DocumentSource::Existing { path, mut document } => {
            let stored = get_path(&document, &["dates", "end"])
                .and_then(scalar_string)
                .ok_or_else(|| VerifError::MalformedDocument {
                    path: path.clone(),
                    message: "missing dates.end".to_string(),
                })?;
            let stored_end = times::parse_timestamp(&stored)?;
            let new_end = times::parse_timestamp(last_fcst)?;
            if new_end > stored_end {
                tracing::debug!(from = %stored, to = %last_fcst, "extending case end date");
                set_path(&mut document, &["dates", "end"], Value::from(last_fcst), &path)?;
            }
            Ok(document)
        }
        DocumentSource::Template { path, mut document } => {
            set_path(&mut document, &["dates", "ini"], Value::from(first_init), &path)?;
            set_path(&mut document, &["dates", "end"], Value::from(last_fcst), &path)?;
            set_path(
                &mut document,
                &["location", "NOzoom"],
                box_value(bbox),
                &path,
            )?;
            let mut verif_domain = Mapping::new();
            verif_domain.insert(
                Value::from(first_init),
                box_value(&bbox.inset(VERIF_DOMAIN_MARGIN)),
            );
            set_path(
                &mut document,
                &["verif_domain"],
                Value::Mapping(verif_domain),
                &path,
            )?;
            Ok(document)
        }
    }
}

pub fn build_exp_document(
    source: DocumentSource,
    series: &TimeSeries,
    settings: &ExpSettings,
) -> Result<Value, VerifError> {
    let inits = inits_mapping(series);

    match source {
        DocumentSource::Existing { path, mut document } => {
            let root = document
                .as_mapping_mut()
                .ok_or_else(|| not_a_mapping(&path, "document root"))?;
            let entry = root
                .entry(Value::from("inits"))
                .or_insert_with(|| Value::Mapping(Mapping::new()));
            if entry.is_null() {
                *entry = Value::Mapping(Mapping::new());
            }
            let existing = entry
                .as_mapping_mut()
                .ok_or_else(|| not_a_mapping(&path, "inits"))?;
            for (key, value) in inits {
                existing.insert(key, value);
            }
            Ok(document)
        }
        DocumentSource::Template { path, mut document } => {
            let vars = serde_yaml::to_value(variables::verification_variables())
                .map_err(|err| VerifError::Filesystem(err.to_string()))?;
            set_path(
                &mut document,
                &["model", "name"],
                Value::from(settings.model_name.as_str()),
                &path,
            )?;
            set_path(
                &mut document,
                &["format", "filepaths"],
                Value::Sequence(vec![Value::from(settings.archive.as_str())]),
                &path,
            )?;
            set_path(
                &mut document,
                &["format", "filename"],
                Value::from(settings.filename.as_str()),
                &path,
            )?;
            set_path(
                &mut document,
                &["format", "fileformat"],
                Value::from(FILE_FORMAT),
                &path,
            )?;
            set_path(&mut document, &["inits"], Value::Mapping(inits), &path)?;
            set_path(&mut document, &["vars"], vars, &path)?;
            Ok(document)
        }
    }
}

/// `{init: {path: 0, fcast_horiz: valid}}` for every cycle of the series.
pub fn inits_mapping(series: &TimeSeries) -> Mapping {
    let mut inits = Mapping::new();
    for (init, fcst) in series.pairs() {
        let mut entry = Mapping::new();
        entry.insert(Value::from("path"), Value::from(0));
        entry.insert(Value::from("fcast_horiz"), Value::from(fcst));
        inits.insert(Value::from(init), Value::Mapping(entry));
    }
    inits
}

/// Recursively orders mapping keys so repeated runs produce stable files.
pub fn sort_mappings(value: &mut Value) {
    match value {
        Value::Mapping(mapping) => {
            let mut entries: Vec<(Value, Value)> = std::mem::take(mapping).into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| compare_keys(a, b));
            for (key, mut child) in entries {
                sort_mappings(&mut child);
                mapping.insert(key, child);
            }
        }
        Value::Sequence(items) => items.iter_mut().for_each(sort_mappings),
        Value::Tagged(tagged) => sort_mappings(&mut tagged.value),
        _ => {}
    }
}

/// Numeric keys come first in numeric order, other scalars follow by text.
fn compare_keys(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => return a.total_cmp(&b),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        (None, None) => {}
    }
    match (scalar_string(a), scalar_string(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn box_value(bbox: &BoundingBox) -> Value {
    Value::Sequence(bbox.to_array().into_iter().map(Value::from).collect())
}

fn get_path<'a>(document: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .try_fold(document, |current, key| current.as_mapping()?.get(*key))
}

fn set_path(
    document: &mut Value,
    keys: &[&str],
    value: Value,
    path: &Utf8Path,
) -> Result<(), VerifError> {
    let Some((last, parents)) = keys.split_last() else {
        return Ok(());
    };
    let mut current = document;
    for key in parents {
        let mapping = current
            .as_mapping_mut()
            .ok_or_else(|| not_a_mapping(path, key))?;
        let child = mapping
            .entry(Value::from(*key))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if child.is_null() {
            *child = Value::Mapping(Mapping::new());
        }
        current = child;
    }
    let mapping = current
        .as_mapping_mut()
        .ok_or_else(|| not_a_mapping(path, &keys.join(".")))?;
    mapping.insert(Value::from(*last), value);
    Ok(())
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn not_a_mapping(path: &Utf8Path, key: &str) -> VerifError {
    VerifError::MalformedDocument {
        path: path.to_path_buf(),
        message: format!("{key} is not a mapping"),
    }
}
