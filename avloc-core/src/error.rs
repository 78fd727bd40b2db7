//! Error types.

use std::io;
use std::path::PathBuf;

pub type Result<T> = core::result::Result<T, Error>;

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::IoError(e.to_string())
    }
}

/// Crate-wide error type.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    IoError(String),

    #[cfg(feature = "yaml")]
    #[error("yaml deserialization error: {0}")]
    YamlDeserError(#[from] serde_yaml::Error),
    #[error("toml deserialization error: {0}")]
    TomlDeserError(#[from] toml::de::Error),
    #[error("unknown config format (expected .toml, .yaml or .yml): {}", .0.display())]
    UnknownConfigFormat(PathBuf),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed loading template {}: {source}", .path.display())]
    TemplateLoad {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid placeholder in template at line {line}, column {column}")]
    InvalidPlaceholder { line: usize, column: usize },
    #[error("missing value for placeholder: {0}")]
    MissingPlaceholder(String),
    #[error("{template} template uses placeholder that is never supplied: {name}")]
    UnsupportedPlaceholder { template: String, name: String },

    #[error("failed writing {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("submission of {} failed ({status})", .script.display())]
    SubmissionFailed { script: PathBuf, status: String },
}
