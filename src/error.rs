use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the key-value store backing step progress.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not replace stored value: {0}")]
    Persist(#[from] tempfile::PersistError),
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("clipboard write rejected: {0}")]
    Rejected(String),
}

impl From<arboard::Error> for ClipboardError {
    fn from(err: arboard::Error) -> Self {
        match err {
            arboard::Error::ClipboardNotSupported | arboard::Error::ClipboardOccupied => {
                ClipboardError::Unavailable(err.to_string())
            }
            other => ClipboardError::Rejected(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum GuideError {
    #[error("failed to read guide {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to watch guide: {0}")]
    Watch(#[from] notify::Error),
}
