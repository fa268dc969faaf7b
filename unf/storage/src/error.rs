//! Error types for unformatted file sessions.

use std::io;

use thiserror::Error;

/// Errors that can occur while compiling formats or transferring records.
#[derive(Error, Debug)]
pub enum UnfError {
    /// The file could not be opened with the requested mode.
    #[error("Open error: {0}")]
    Open(String),

    /// The format string is malformed.
    #[error("Format error at token {token} ({text:?}): {reason}")]
    Format {
        token: usize,
        text: String,
        reason: String,
    },

    /// The leading and trailing markers of a sequential record disagree.
    #[error("Record marker mismatch at offset {offset}: leading {leading}, trailing {trailing}")]
    MarkerMismatch {
        offset: u64,
        leading: u32,
        trailing: u32,
    },

    /// Fewer bytes are available than the format requires.
    #[error("Short record: needed {needed} bytes, {available} available")]
    ShortRecord { needed: u64, available: u64 },

    /// A position, record number or length lies outside the valid range.
    #[error("Out of bounds: {0}")]
    Bounds(String),

    /// Input is exhausted.
    #[error("End of file")]
    Eof,

    /// A value or destination does not match its field descriptor.
    #[error("Field {index}: expected {expected}, got {found}")]
    FieldMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    /// The number of values or destinations does not match the format.
    #[error("Format has {expected} fields but {found} arguments were given")]
    FieldCount { expected: usize, found: usize },

    /// The operation is not valid for this session's open or access mode.
    #[error("Operation not permitted: {0}")]
    Mode(String),

    /// The session has been closed.
    #[error("Session is closed")]
    Closed,

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for unformatted file operations.
pub type UnfResult<T> = Result<T, UnfError>;

/// Stable numeric code of the last error recorded by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,
    Open = 1,
    Format = 2,
    MarkerMismatch = 3,
    ShortRecord = 4,
    Bounds = 5,
    Eof = 6,
    FieldMismatch = 7,
    Mode = 8,
    Closed = 9,
    Io = 10,
}

/// Outcome of positioning operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    Error,
}

impl UnfError {
    pub fn code(&self) -> ErrorCode {
        match self {
            UnfError::Open(_) => ErrorCode::Open,
            UnfError::Format { .. } => ErrorCode::Format,
            UnfError::MarkerMismatch { .. } => ErrorCode::MarkerMismatch,
            UnfError::ShortRecord { .. } => ErrorCode::ShortRecord,
            UnfError::Bounds(_) => ErrorCode::Bounds,
            UnfError::Eof => ErrorCode::Eof,
            UnfError::FieldMismatch { .. } | UnfError::FieldCount { .. } => {
                ErrorCode::FieldMismatch
            }
            UnfError::Mode(_) => ErrorCode::Mode,
            UnfError::Closed => ErrorCode::Closed,
            UnfError::Io(_) => ErrorCode::Io,
        }
    }

    /// Whether this error means the input ran out rather than was corrupt.
    pub fn is_eof(&self) -> bool {
        matches!(self, UnfError::Eof)
    }
}

impl ErrorCode {
    pub fn is_success(self) -> bool {
        self == ErrorCode::Success
    }
}

impl Status {
    pub fn is_success(self) -> bool {
        self == Status::Success
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        code as i32
    }
}
