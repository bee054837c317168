use std::io;

use thiserror::Error;

use crate::layout::StatField;

/// Coarse classification of a [`SaveError`], stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Io,
    OutOfRange,
    Decode,
    NotFound,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A declared field of a character record could not be read in full.
    /// Short reads carry [`io::ErrorKind::UnexpectedEof`].
    #[error("failed to read {field} of record {index} at offset {position}: {source}")]
    FieldRead {
        index: usize,
        position: u64,
        field: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("offset {offset} (+{len} bytes) is out of range for a file of {file_len} bytes")]
    OutOfRange { offset: u64, len: u64, file_len: u64 },

    /// Two edited values target the same bytes with different contents.
    #[error("{first} and {second} both write offset {offset} with different values")]
    PatchConflict {
        offset: u64,
        first: String,
        second: String,
    },

    #[error("cannot decode legacy text {bytes:02X?}")]
    Decode { bytes: Vec<u8> },

    #[error("record index {index} out of range, record count is {count}")]
    RecordNotFound { index: usize, count: usize },

    #[error("value {value} does not fit the {} field {}", .field.width(), .field.key())]
    ValueOutOfRange { field: StatField, value: i64 },
}

impl SaveError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Io(_) | Self::FieldRead { .. } => ErrorCode::Io,
            Self::OutOfRange { .. } | Self::ValueOutOfRange { .. } | Self::PatchConflict { .. } => {
                ErrorCode::OutOfRange
            }
            Self::Decode { .. } => ErrorCode::Decode,
            Self::RecordNotFound { .. } => ErrorCode::NotFound,
        }
    }

    /// The underlying `io::ErrorKind`, if this error came from I/O.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io(e) | Self::FieldRead { source: e, .. } => Some(e.kind()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SaveError>;
