//! Custom error types for the mat5-reader crate.

use thiserror::Error;

use super::models::MatrixClass;

/// The primary error type for all operations in this crate.
///
/// Offsets are measured from the start of the document, except for elements
/// nested inside a compressed block, whose offsets are relative to the start
/// of the inflated buffer.
#[derive(Debug, Error)]
pub enum MatError {
    /// An error originating from the underlying byte source.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// The 128-byte header is malformed (length, version or endian indicator).
    #[error("Invalid MAT-file header: {0}")]
    Header(String),

    /// A sub-element does not have the shape its parent requires.
    #[error("Malformed {context} at offset {offset:#x}: {message}")]
    Tag {
        context: &'static str,
        offset: u64,
        message: String,
    },

    /// The element tag names a data type this reader does not know.
    #[error("Unsupported data type id {type_id} at offset {offset:#x}")]
    UnsupportedType { type_id: u32, offset: u64 },

    /// The matrix class is valid but not implemented (struct, object, ...).
    #[error("Unsupported matrix class {class:?} (code {code}) at offset {offset:#x}", code = .class.code())]
    UnsupportedMatrixClass { class: MatrixClass, offset: u64 },

    /// A declared length disagrees with the number of elements expected.
    #[error("Size mismatch for {context} at offset {offset:#x}: expected {expected}, but found {found}")]
    SizeMismatch {
        context: &'static str,
        offset: u64,
        expected: u64,
        found: u64,
    },

    /// A stored value cannot be represented exactly in the required type.
    #[error("Cannot convert {value} from {from} to {to} without loss")]
    NumericConversion {
        value: String,
        from: &'static str,
        to: &'static str,
    },

    /// A compressed block is corrupt, truncated or too large.
    #[error("Decompression failed at offset {offset:#x}: {message}")]
    Compression { offset: u64, message: String },

    /// The stream (or the enclosing container) ends in the middle of an element.
    #[error("Stream truncated at offset {offset:#x} while reading {context}: needed {needed} bytes, {available} available")]
    TruncatedStream {
        context: &'static str,
        offset: u64,
        needed: u64,
        available: u64,
    },

    /// Matrix/compressed containers are nested deeper than allowed.
    #[error("Nesting depth limit of {limit} exceeded at offset {offset:#x}")]
    NestingTooDeep { limit: usize, offset: u64 },
}

/// A convenience `Result` type alias using the crate's `MatError` type.
pub type Result<T> = std::result::Result<T, MatError>;
