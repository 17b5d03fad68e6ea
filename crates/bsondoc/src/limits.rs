//! Decode limits guarding against hostile input.
//!
//! Validation recurses once per embedded document or array, so an explicit
//! depth ceiling keeps the stack bounded no matter what the buffer claims.

use serde::{Deserialize, Serialize};

/// Default maximum nesting depth for embedded documents and arrays.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 100;

/// Default maximum document size (16 MiB, the conventional BSON ceiling).
pub const DEFAULT_MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Limits applied when decoding a buffer into a [`Document`](crate::Document).
///
/// Deserializable so a host can carry the limits in its own configuration;
/// any field omitted falls back to the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum depth of embedded documents/arrays. The top-level document is
    /// depth 0; each level of embedding adds one.
    pub max_nesting_depth: usize,
    /// Maximum total size of the outermost buffer, in bytes.
    pub max_document_size: usize,
}

impl Limits {
    /// Limits for trusted input: deep nesting and any size the length prefix
    /// can express.
    pub const fn lenient() -> Self {
        Self {
            max_nesting_depth: 512,
            max_document_size: i32::MAX as usize,
        }
    }

    /// Override the nesting depth.
    pub const fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
        }
    }
}
