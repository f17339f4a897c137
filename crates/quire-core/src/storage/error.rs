//! Storage errors

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures reading or writing page and graph-view files
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Permission denied: cannot access '{path}'")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No space left while writing '{path}'")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file held invalid JSON and was renamed to `backup`
    #[error("'{path}' is not a valid record ({details}); moved to '{backup}'")]
    Corrupt {
        path: PathBuf,
        backup: PathBuf,
        details: String,
    },

    #[error("Failed to encode '{path}': {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not rename '{from}' to '{to}': {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Classify a write-side I/O failure on `path`
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        if error.kind() == io::ErrorKind::PermissionDenied {
            return StorageError::PermissionDenied {
                path,
                source: error,
            };
        }
        let msg = error.to_string().to_lowercase();
        if msg.contains("no space left") || msg.contains("quota exceeded") {
            return StorageError::DiskFull {
                path,
                source: error,
            };
        }
        StorageError::Write {
            path,
            source: error,
        }
    }

    /// A hint for the user, when there is something they can do
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::DiskFull { .. } => Some("Free up disk space and try again."),
            StorageError::PermissionDenied { .. } | StorageError::Directory { .. } => {
                Some("Check that the data directory is writable, or point QUIRE_DATA_DIR elsewhere.")
            }
            StorageError::Corrupt { .. } => {
                Some("The damaged file was kept with a .corrupt suffix; fix or delete it.")
            }
            _ => None,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
