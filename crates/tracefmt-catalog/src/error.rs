use std::fmt;
use std::path::PathBuf;

/// Result type for tracefmt-catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading message catalogs
#[derive(Debug)]
pub enum Error {
    /// Catalog file could not be read
    Io { path: PathBuf, source: std::io::Error },

    /// A catalog line does not follow the template layout
    MalformedLine(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { path, source } => {
                write!(f, "Cannot read catalog {}: {}", path.display(), source)
            }
            Error::MalformedLine(reason) => write!(f, "Malformed catalog line: {}", reason),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::MalformedLine(_) => None,
        }
    }
}

impl From<tracefmt_types::Error> for Error {
    fn from(err: tracefmt_types::Error) -> Self {
        Error::MalformedLine(err.to_string())
    }
}
