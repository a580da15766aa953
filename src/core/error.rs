use std::io;
use std::path::{Path, PathBuf};

use crate::temp::{CleanupReport, ElementId};

#[derive(Debug, thiserror::Error)]
pub enum TempError {
    #[error("path already exists: {}", .path.display())]
    AlreadyExists { path: PathBuf },

    #[error("parent directory does not exist: {}", .path.display())]
    ParentNotFound { path: PathBuf },

    #[error("cannot {op} {}: resource is destroyed", .path.display())]
    InvalidState { path: PathBuf, op: &'static str },

    #[error("element {0} is not tracked by this registry")]
    NotTracked(ElementId),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Cleanup(CleanupReport),
}

impl TempError {
    pub(crate) fn io<P: AsRef<Path>>(path: P, source: io::Error) -> Self {
        TempError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Maps an error of creating `path` (file or directory) to the matching kind.
    pub(crate) fn on_create<P: AsRef<Path>>(path: P, source: io::Error) -> Self {
        let path = path.as_ref();
        match source.kind() {
            io::ErrorKind::AlreadyExists => TempError::AlreadyExists {
                path: path.to_path_buf(),
            },
            io::ErrorKind::NotFound => TempError::ParentNotFound {
                path: path.parent().unwrap_or(path).to_path_buf(),
            },
            _ => TempError::io(path, source),
        }
    }

    pub(crate) fn destroyed<P: AsRef<Path>>(path: P, op: &'static str) -> Self {
        TempError::InvalidState {
            path: path.as_ref().to_path_buf(),
            op,
        }
    }
}

impl From<TempError> for io::Error {
    fn from(err: TempError) -> Self {
        match err {
            TempError::Io { source, .. } => source,
            TempError::AlreadyExists { .. } => io::Error::new(io::ErrorKind::AlreadyExists, err),
            TempError::ParentNotFound { .. } => io::Error::new(io::ErrorKind::NotFound, err),
            other => io::Error::other(other),
        }
    }
}
