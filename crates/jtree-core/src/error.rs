//! Error types for tree, path and compact-form operations.
//!
//! "Not found" is deliberately absent: lookups report a missing path or key
//! through `Option`/`bool` return values, never through `TreeError`.

use thiserror::Error;

/// Errors that can occur while parsing, mutating, serializing or reading trees.
#[derive(Error, Debug)]
pub enum TreeError {
    /// The input string was not valid JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A path expression contained a segment that cannot be interpreted.
    #[error("malformed path {path:?}: {message}")]
    MalformedPath { path: String, message: String },

    /// A node kind disagreed with the requested segment while coercion was disabled.
    #[error("type mismatch at {path:?}")]
    TypeMismatch { path: String },

    /// An array index in create mode asked for more slots than can be allocated.
    #[error("array index beyond allocatable size at {path:?}")]
    CapacityExceeded { path: String },

    /// An object member had an empty key, which no path can address.
    #[error("object member without key under {path:?}")]
    MissingKey { path: String },

    /// A path or string payload contained a NUL byte and cannot be stored
    /// NUL-terminated.
    #[error("embedded NUL byte in {path:?}")]
    EmbeddedNul { path: String },

    /// The buffer does not start with the compact-form magic tag.
    #[error("invalid magic: expected oiJS compact form")]
    BadMagic,

    /// An offset or length points outside the buffer.
    #[error("offset {offset} out of bounds for buffer of {len} bytes")]
    OutOfBounds { offset: usize, len: usize },

    /// A stored path or string was not valid UTF-8.
    #[error("invalid UTF-8 at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// A record carried a payload kind tag that is not a scalar kind.
    #[error("invalid payload kind {tag} at offset {offset}")]
    InvalidKind { offset: usize, tag: u32 },

    /// The tree is too large for the 32/64-bit offsets of the compact form.
    #[error("tree exceeds representable compact-form offsets")]
    OffsetOverflow,

    /// A secondary text rendering could not represent the tree.
    #[error("render error: {0}")]
    Render(String),
}

/// Convenience alias used throughout jtree-core.
pub type Result<T> = std::result::Result<T, TreeError>;
