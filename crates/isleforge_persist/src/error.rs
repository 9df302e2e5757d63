use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Persistence failures. Absence (`NotFound`) is deliberately distinct
/// from corruption (`Decode`): callers regenerate on the former and
/// abort on the latter.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("no persisted data at {path}")]
    NotFound { path: PathBuf },
    #[error("failed to encode {what}: {detail}")]
    Encode { what: &'static str, detail: String },
    #[error("failed to decode {what}: {detail}")]
    Decode { what: &'static str, detail: String },
    #[error("i/o failure on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write image {path}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl PersistError {
    pub fn encode(what: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Encode {
            what,
            detail: err.to_string(),
        }
    }

    pub fn decode(what: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            what,
            detail: err.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Maps a read failure to `NotFound` when the file is absent.
    pub fn from_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
