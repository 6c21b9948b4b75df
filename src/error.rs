//! Unified error type.

use std::fmt;

/// The error type surfaced by dispatch's fallible operations.
///
/// Application-level outcomes (404, a handler-chosen status) are expressed as
/// HTTP responses, not as `Error`s. This type covers infrastructure failures:
/// binding a port, accepting a connection, a request body that cannot be
/// parsed, or a static file that stats fine but fails to read.
#[derive(Debug)]
pub enum Error {
    /// Socket-level failure (bind, accept).
    Io(std::io::Error),
    /// The request body could not be collected or parsed.
    BodyParse(String),
    /// A static file passed the stat check but could not be read.
    StaticRead(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::BodyParse(reason) => write!(f, "body parse: {reason}"),
            Self::StaticRead(e) => write!(f, "static read: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) | Self::StaticRead(e) => Some(e),
            Self::BodyParse(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
