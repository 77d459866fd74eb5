use camino::Utf8PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum VerifError {
    #[error("required environment variable not set: {0}")]
    #[diagnostic(help("export {0} before running verif-config"))]
    MissingEnv(String),

    #[error("missing configuration key: {0}")]
    MissingConfigKey(String),

    #[error("invalid value for configuration key {key}: {message}")]
    InvalidConfigValue { key: String, message: String },

    #[error("failed to read config file at {0}")]
    ConfigRead(Utf8PathBuf),

    #[error("failed to parse YAML config: {0}")]
    ConfigParse(String),

    #[error("malformed date: {0}")]
    MalformedDate(String),

    #[error("malformed frequency or lead time: {0}")]
    MalformedFrequency(String),

    #[error("no forecast cycles in time range {0}")]
    EmptyTimeSeries(String),

    #[error("unknown model scheme: {0}")]
    #[diagnostic(help("supported schemes are HARMONIE_AROME, AROME and ALARO"))]
    UnknownModel(String),

    #[error("projection error: {0}")]
    Projection(String),

    #[error("template not found: {0}")]
    TemplateNotFound(Utf8PathBuf),

    #[error("malformed document {path}: {message}")]
    MalformedDocument { path: Utf8PathBuf, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("command `{command}` failed: {message}")]
    SubprocessFailure { command: String, message: String },
}
