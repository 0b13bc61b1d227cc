//! Crate error type
//!
//! Only persistence and configuration can fail. Refusals inside the
//! simulation (no cash, full cargo) are ordinary values, see
//! [`crate::sim::Declined`] and [`crate::sim::CargoFull`].

use std::fmt;

/// Errors raised while loading or storing saves and tuning files
#[derive(Debug)]
pub enum Error {
    /// Reading or writing the backing store failed
    Io(std::io::Error),
    /// JSON (de)serialization failed
    Json(serde_json::Error),
    /// Save was written by an unknown format version
    UnsupportedVersion {
        found: u32,
        expected: u32,
    },
    /// Save parsed but describes an impossible session
    InvalidSnapshot(String),
    /// A tuning value is outside its usable range
    InvalidTuning {
        field: &'static str,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "storage error: {e}"),
            Error::Json(e) => write!(f, "malformed JSON: {e}"),
            Error::UnsupportedVersion { found, expected } => {
                write!(f, "save version {found} is not supported (expected {expected})")
            }
            Error::InvalidSnapshot(msg) => write!(f, "invalid save snapshot: {msg}"),
            Error::InvalidTuning { field, reason } => {
                write!(f, "invalid tuning value `{field}`: {reason}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}
