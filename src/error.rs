//! Error taxonomy for buffer and view operations.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// A store or view length was negative or could not be represented.
    #[error("Invalid length: {length}")]
    InvalidLength { length: i64 },

    /// A view's byte range does not fit inside its backing store.
    #[error("Offset out of range: offset {offset}, length {length}, buffer length {buffer_length}")]
    OffsetOutOfRange {
        offset: i64,
        length: i64,
        buffer_length: usize,
    },

    /// An access or copy touches bytes outside the addressable range.
    #[error("RangeError: {message}")]
    RangeError { message: String },

    /// A typed array range that is not a whole number of elements.
    #[error("Misaligned length: {byte_count} is not a multiple of element size {element_size}")]
    MisalignedLength {
        byte_count: i64,
        element_size: usize,
    },

    /// Construction received something other than an ArrayBuffer.
    #[error("Not an ArrayBuffer: got {found}")]
    NotABuffer { found: &'static str },

    /// Mixing BigInt and Number content.
    #[error("Cannot convert {found} to {expected}")]
    ContentTypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl BufferError {
    pub(crate) fn range(message: impl Into<String>) -> Self {
        BufferError::RangeError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BufferError>;
