use std::fmt;

/// Result type for tracefmt-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the formatting pipeline
#[derive(Debug)]
pub enum Error {
    /// Trace file could not be opened or its header is unusable
    Decoder(tracefmt_decoder::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// Operation called in the wrong state
    InvalidOperation(String),

    /// The run was cancelled before completing
    Cancelled,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Decoder(err) => write!(f, "{}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
            Error::Cancelled => write!(f, "Formatting cancelled"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Decoder(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Config(_) | Error::InvalidOperation(_) | Error::Cancelled => None,
        }
    }
}

impl From<tracefmt_decoder::Error> for Error {
    fn from(err: tracefmt_decoder::Error) -> Self {
        Error::Decoder(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<tracefmt_types::Error> for Error {
    fn from(err: tracefmt_types::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
