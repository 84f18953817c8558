use std::fmt;

/// Result type for tracefmt-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the types layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A thread id string could not be parsed as hex
    InvalidThreadId(String),

    /// A tracepoint type code outside the known range
    UnknownTypeCode(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidThreadId(raw) => write!(f, "Invalid thread id: {}", raw),
            Error::UnknownTypeCode(code) => write!(f, "Unknown tracepoint type code: {}", code),
        }
    }
}

impl std::error::Error for Error {}
