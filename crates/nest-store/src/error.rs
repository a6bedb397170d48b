use std::fmt;
use std::io;
use std::path::PathBuf;

use nest_core::DecodeError;

#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: io::Error },
    Json(serde_json::Error),
    Config(toml::de::Error),
    Vector(DecodeError),
    InvalidKey(String),
    InvalidData(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> StoreError {
        let path = path.into();
        move |source| StoreError::Io { path, source }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io { path, source } => write!(f, "I/O error at {}: {source}", path.display()),
            StoreError::Json(e) => write!(f, "metadata JSON error: {e}"),
            StoreError::Config(e) => write!(f, "config error: {e}"),
            StoreError::Vector(e) => write!(f, "vector error: {e}"),
            StoreError::InvalidKey(key) => write!(f, "invalid partition or record key: {key:?}"),
            StoreError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io { source, .. } => Some(source),
            StoreError::Json(e) => Some(e),
            StoreError::Config(e) => Some(e),
            StoreError::Vector(e) => Some(e),
            StoreError::InvalidKey(_) | StoreError::InvalidData(_) => None,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(e: toml::de::Error) -> Self {
        StoreError::Config(e)
    }
}

impl From<DecodeError> for StoreError {
    fn from(e: DecodeError) -> Self {
        StoreError::Vector(e)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
