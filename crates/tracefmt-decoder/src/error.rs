use std::fmt;
use std::path::{Path, PathBuf};

/// Result type for tracefmt-decoder operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading trace files
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// Input file does not exist
    NotFound(PathBuf),

    /// File header is structurally invalid (not merely truncated)
    InvalidHeader { path: Option<PathBuf>, reason: String },

    /// A single buffer failed structural validation
    InvalidBuffer { offset: u64, reason: String },
}

impl Error {
    pub(crate) fn header(reason: impl Into<String>) -> Self {
        Error::InvalidHeader {
            path: None,
            reason: reason.into(),
        }
    }

    pub(crate) fn buffer(offset: u64, reason: impl Into<String>) -> Self {
        Error::InvalidBuffer {
            offset,
            reason: reason.into(),
        }
    }

    /// Attach the file path to a header error raised before the path was known.
    pub(crate) fn with_path(self, path: &Path) -> Self {
        match self {
            Error::InvalidHeader { path: None, reason } => Error::InvalidHeader {
                path: Some(path.to_path_buf()),
                reason,
            },
            other => other,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::NotFound(path) => write!(f, "Trace file {} not found", path.display()),
            Error::InvalidHeader {
                path: Some(path),
                reason,
            } => write!(f, "Invalid trace file header in {}: {}", path.display(), reason),
            Error::InvalidHeader { path: None, reason } => {
                write!(f, "Invalid trace file header: {}", reason)
            }
            Error::InvalidBuffer { offset, reason } => {
                write!(f, "Invalid trace buffer at offset {}: {}", offset, reason)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::NotFound(_) | Error::InvalidHeader { .. } | Error::InvalidBuffer { .. } => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
