use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Direction a session was opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpenMode {
    /// Existing file, read only.
    Read,
    /// Created (or truncated) file, written from the start.
    Write,
}

/// How records map onto the bytes of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessMode {
    /// Records framed by leading and trailing length markers.
    Sequential,
    /// Fixed-length slots addressed by a 1-based record number.
    Direct,
    /// Unframed byte stream.
    Stream,
}

/// Reference point for record-relative seeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeekOrigin {
    /// The first record of the file.
    Begin,
    /// The current record position.
    Current,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown open mode {0:?}, expected \"r\" or \"w\"")]
pub struct ParseModeError(pub String);

impl OpenMode {
    pub fn is_read(self) -> bool {
        matches!(self, OpenMode::Read)
    }

    pub fn is_write(self) -> bool {
        matches!(self, OpenMode::Write)
    }
}

impl FromStr for OpenMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" | "rb" => Ok(OpenMode::Read),
            "w" | "wb" => Ok(OpenMode::Write),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenMode::Read => f.write_str("r"),
            OpenMode::Write => f.write_str("w"),
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Sequential => f.write_str("sequential"),
            AccessMode::Direct => f.write_str("direct"),
            AccessMode::Stream => f.write_str("stream"),
        }
    }
}
