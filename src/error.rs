use std::{fmt, io, path::PathBuf};

/// Errors produced while resolving roots, hashing files or rendering a report.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A root directory given on the command line does not exist.
    #[error("directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// A root exists but is not a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// A root could not be resolved for any other reason.
    #[error("cannot resolve {}: {source}", path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A scanned file could not be opened or read while computing its checksum.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to format report")]
    Format(#[from] fmt::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
