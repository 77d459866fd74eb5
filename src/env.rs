use camino::{Utf8Path, Utf8PathBuf};

use crate::error::VerifError;

pub const HOME_VAR: &str = "VERIF_HOME";
pub const OBS_VAR: &str = "VERIF_OBS";
pub const ECFS_USER_VAR: &str = "ECFS_USER";
pub const ECCODES_DEFINITION_PATH_VAR: &str = "ECCODES_DEFINITION_PATH";

pub const DEFAULT_OBS: &str = "IMERG_pcp";

/// Snapshot of the environment variables the verification setup reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifEnv {
    pub home: Utf8PathBuf,
    pub obs: String,
    pub ecfs_user: Option<String>,
}

impl VerifEnv {
    pub fn new(home: impl Into<Utf8PathBuf>) -> Self {
        Self {
            home: home.into(),
            obs: DEFAULT_OBS.to_string(),
            ecfs_user: None,
        }
    }

    pub fn with_obs(mut self, obs: impl Into<String>) -> Self {
        self.obs = obs.into();
        self
    }

    pub fn with_ecfs_user(mut self, user: impl Into<String>) -> Self {
        self.ecfs_user = Some(user.into());
        self
    }

    pub fn from_env() -> Result<Self, VerifError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, VerifError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let home = lookup(HOME_VAR)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| VerifError::MissingEnv(HOME_VAR.to_string()))?;
        let obs = lookup(OBS_VAR).unwrap_or_else(|| DEFAULT_OBS.to_string());
        let ecfs_user = lookup(ECFS_USER_VAR);
        Ok(Self {
            home: Utf8PathBuf::from(home),
            obs,
            ecfs_user,
        })
    }

    pub fn home(&self) -> &Utf8Path {
        &self.home
    }
}
