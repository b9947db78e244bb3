//! Error types for styled text persistence and rule compilation.
//!
//! Editing operations never return errors: rejected input is reported as a
//! `false`/empty result and contract violations panic. Only reading and
//! writing data, and compiling patterns, can fail.

use std::fmt;
use std::io;

/// Result type alias for fallible styled text operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for styled text operations.
#[derive(Debug)]
pub enum Error {
    /// I/O error while reading or writing.
    Io(io::Error),
    /// Serialized data uses a newer format version than this reader understands.
    UnsupportedVersion { found: u32, supported: u32 },
    /// Serialized data is truncated or inconsistent.
    Malformed(String),
    /// Serialized text is not valid UTF-8.
    InvalidUtf8,
    /// A pattern failed to compile.
    Regex(regex::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::UnsupportedVersion { found, supported } => {
                write!(
                    f,
                    "cannot read styled text version {found} (newest supported is {supported})"
                )
            }
            Self::Malformed(s) => write!(f, "malformed styled text: {s}"),
            Self::InvalidUtf8 => write!(f, "styled text is not valid UTF-8"),
            Self::Regex(e) => write!(f, "invalid pattern: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Regex(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<regex::Error> for Error {
    fn from(e: regex::Error) -> Self {
        Self::Regex(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnsupportedVersion {
            found: 7,
            supported: 1,
        };
        assert!(err.to_string().contains("version 7"));

        let err = Error::Malformed("missing run count".to_string());
        assert!(err.to_string().contains("missing run count"));

        assert!(Error::InvalidUtf8.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_regex_error_conversion() {
        let err: Error = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, Error::Regex(_)));
        assert!(err.to_string().starts_with("invalid pattern"));
    }
}
