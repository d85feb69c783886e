use std::fmt::{self, Display};

/// Typed errors returned by compile and match operations.
#[derive(Debug)]
pub enum Error {
    /// A pattern was empty after normalization.
    InvalidPattern(String),
    /// An out-of-range tuning parameter (negative threads/chunk size).
    InvalidArgument(String),
    /// Filesystem failure while reading input or writing the store.
    Io(std::io::Error),
    /// The compiled store failed a structural sanity check at load time.
    Format(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPattern(s) => write!(f, "invalid pattern: {}", s),
            Error::InvalidArgument(s) => write!(f, "invalid argument: {}", s),
            Error::Io(e) => write!(f, "io error: {}", e),
            Error::Format(s) => write!(f, "store format error: {}", s),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
