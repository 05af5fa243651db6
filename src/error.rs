use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong talking to Sauce storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The service could not be reached (DNS, TLS, timeout, reset).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with something other than 200 OK.
    #[error("{status}: {reason}. Sauce status NOT OK")]
    RemoteService { status: u16, reason: String },

    /// The service answered 200 but the body was not the expected JSON.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A local file could not be opened or read.
    #[error("Local file not found or unreadable: {}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file was uploaded but the following listing did not include it.
    #[error("Uploaded '{name}' but it is not in the storage listing yet")]
    LookupInconsistency { name: String },

    #[error("Cannot derive a remote name from {}", .0.display())]
    InvalidName(PathBuf),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Parse(err.to_string())
    }
}

impl StorageError {
    pub(crate) fn not_found(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::NotFound {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
