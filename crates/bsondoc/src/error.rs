//! Error types for document decoding, encoding and JSON parsing.

use thiserror::Error;

/// Errors that can occur while decoding, encoding or parsing a document.
///
/// Offsets are byte positions relative to the start of the outermost buffer
/// being validated, which makes corrupt-input reports easy to line up with a
/// hex dump.
#[derive(Error, Debug)]
pub enum BsonError {
    /// The 4-byte length prefix disagrees with the size of the supplied buffer
    /// (or, for an embedded document, with the space left in its parent).
    #[error("length prefix declares {declared} bytes but {actual} are available")]
    LengthMismatch { declared: usize, actual: usize },

    /// The buffer ended before a complete field could be read.
    #[error("truncated document at offset {offset}: {needed} more byte(s) required")]
    Truncated { offset: usize, needed: usize },

    /// A length field is negative, too small to be valid, or overruns its container.
    #[error("invalid length {length} at offset {offset}")]
    InvalidLength { offset: usize, length: i64 },

    /// A document or string did not end with the mandatory `0x00` byte.
    #[error("missing terminating NUL at offset {offset}")]
    MissingTerminator { offset: usize },

    /// A key or string payload is not valid UTF-8.
    #[error("invalid UTF-8 at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// A boolean payload byte was neither 0 nor 1.
    #[error("invalid boolean byte {byte:#04x} at offset {offset}")]
    InvalidBoolean { offset: usize, byte: u8 },

    /// The type tag is not part of the wire format at all, so its payload
    /// length cannot be determined.
    #[error("unknown element type {tag:#04x} at offset {offset}")]
    UnknownElementType { offset: usize, tag: u8 },

    /// Embedded documents/arrays are nested deeper than the configured limit.
    #[error("nesting depth exceeds the maximum of {max}")]
    NestingTooDeep { max: usize },

    /// The document is larger than the configured (or representable) size.
    #[error("document size {size} exceeds the maximum of {max} bytes")]
    DocumentTooLarge { size: usize, max: usize },

    /// Keys are NUL-terminated on the wire and therefore cannot contain NUL.
    #[error("invalid key {0:?}: keys must not contain NUL bytes")]
    InvalidKey(String),

    /// The input text was not valid JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The JSON text parsed, but its top-level value is not an object.
    #[error("JSON document must be an object at the top level")]
    JsonNotAnObject,
}

/// Convenience alias used throughout bsondoc.
pub type Result<T> = std::result::Result<T, BsonError>;
