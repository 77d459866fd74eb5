use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use serde_yaml::Value;

use crate::domain::{CaseId, ExpId};
use crate::error::VerifError;

/// Layout of the verification home: templates plus the generated case and
/// experiment documents.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    home: Utf8PathBuf,
}

impl ConfigStore {
    pub fn new(home: impl Into<Utf8PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn config_root(&self) -> Utf8PathBuf {
        self.home.join("config")
    }

    pub fn case_template_path(&self) -> Utf8PathBuf {
        self.config_root().join("templates").join("config_Case.yaml")
    }

    pub fn exp_template_path(&self) -> Utf8PathBuf {
        self.config_root().join("templates").join("config_exp.yaml")
    }

    pub fn case_path(&self, case: &CaseId) -> Utf8PathBuf {
        self.config_root()
            .join("Case")
            .join(format!("config_{case}.yaml"))
    }

    pub fn exp_path(&self, exp: &ExpId) -> Utf8PathBuf {
        self.config_root()
            .join("exp")
            .join(format!("config_{exp}.yaml"))
    }

    pub fn load_template(path: &Utf8Path) -> Result<Value, VerifError> {
        if !path.as_std_path().is_file() {
            return Err(VerifError::TemplateNotFound(path.to_path_buf()));
        }
        Self::load_document(path)
    }

    pub fn load_document(path: &Utf8Path) -> Result<Value, VerifError> {
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|err| VerifError::Filesystem(format!("read {path}: {err}")))?;
        let value: Value =
            serde_yaml::from_str(&content).map_err(|err| VerifError::MalformedDocument {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        match value {
            Value::Mapping(_) => Ok(value),
            // An empty file parses as null; treat it as an empty document.
            Value::Null => Ok(Value::Mapping(Default::default())),
            _ => Err(VerifError::MalformedDocument {
                path: path.to_path_buf(),
                message: "expected a mapping at the document root".to_string(),
            }),
        }
    }

    /// Serialises `document` to a temp file next to `path`, then renames it
    /// over `path`.
    pub fn write_document(path: &Utf8Path, document: &Value) -> Result<(), VerifError> {
        let content =
            serde_yaml::to_string(document).map_err(|err| VerifError::Filesystem(err.to_string()))?;
        Self::write_bytes_atomic(path, content.as_bytes())
    }

    pub fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), VerifError> {
        let parent = path
            .parent()
            .ok_or_else(|| VerifError::Filesystem(format!("invalid destination path {path}")))?;
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| VerifError::Filesystem(err.to_string()))?;
        let mut temp = tempfile::Builder::new()
            .prefix(".verif-config")
            .suffix(".yaml.tmp")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| VerifError::Filesystem(err.to_string()))?;
        temp.write_all(content)
            .map_err(|err| VerifError::Filesystem(err.to_string()))?;
        temp.as_file()
            .sync_all()
            .map_err(|err| VerifError::Filesystem(err.to_string()))?;
        temp.persist(path.as_std_path())
            .map_err(|err| VerifError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::domain::ModelScheme;

    #[test]
    fn layout_paths() {
        let store = ConfigStore::new("/verif");
        let case = CaseId::new("flood", "SPAIN", "2023010100");
        let exp = ExpId::new("DEOD", "CY46h1", ModelScheme::Arome, "SPAIN");

        assert_eq!(
            store.case_path(&case),
            Utf8PathBuf::from("/verif/config/Case/config_flood_SPAIN_20230101.yaml")
        );
        assert_eq!(
            store.exp_path(&exp),
            Utf8PathBuf::from("/verif/config/exp/config_DEOD_cy46h1_AR_SPAIN.yaml")
        );
        assert!(store.case_template_path().ends_with("templates/config_Case.yaml"));
        assert!(store.exp_template_path().ends_with("templates/config_exp.yaml"));
    }

    #[test]
    fn atomic_write_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let path = root.join("nested").join("doc.yaml");

        ConfigStore::write_bytes_atomic(&path, b"a: 1\nb: 2\n").unwrap();
        ConfigStore::write_bytes_atomic(&path, b"a: 3\n").unwrap();

        assert_eq!(fs::read_to_string(path.as_std_path()).unwrap(), "a: 3\n");
        let leftovers = fs::read_dir(root.join("nested").as_std_path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn missing_template_is_reported() {
        let err = ConfigStore::load_template(Utf8Path::new("/nonexistent/config_Case.yaml"))
            .unwrap_err();
        assert_matches!(err, VerifError::TemplateNotFound(_));
    }
}
