use std::path::PathBuf;
use thiserror::Error;

/// A form field name that is neither `name` nor `section[field]`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed field name '{key}': {reason}")]
pub struct FieldKeyError {
    pub key: String,
    pub reason: &'static str,
}

impl FieldKeyError {
    pub(crate) fn new(key: &str, reason: &'static str) -> Self {
        Self {
            key: key.to_string(),
            reason,
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access content file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Content file {} is not a valid document: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize content document: {0}")]
    Serialize(#[source] serde_json::Error),
}
