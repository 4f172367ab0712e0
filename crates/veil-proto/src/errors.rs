//! Error types for wire-format parsing and encoding

use thiserror::Error;

/// Result alias for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors from encoding or decoding Veil messages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Input cannot be a message at all (e.g. empty)
    #[error("malformed message: {reason}")]
    Malformed {
        /// What was wrong with the input
        reason: String,
    },

    /// A required field was absent
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Sender certificate names neither a phone number nor a uuid
    #[error("sender certificate has no sender")]
    MissingSender,

    /// Version nibble is not one we can read
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    /// Inner content carries an unknown message type
    #[error("unknown message type: {0}")]
    UnknownMessageType(u32),

    /// Input exceeds [`crate::MAX_MESSAGE_SIZE`]
    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge {
        /// Actual input size
        size: usize,
        /// Maximum accepted size
        max: usize,
    },

    /// Bytes left over after the CBOR item
    #[error("{count} trailing bytes after message")]
    TrailingBytes {
        /// Number of unconsumed bytes
        count: usize,
    },

    /// CBOR serialization failed
    #[error("CBOR encode error: {0}")]
    CborEncode(String),

    /// CBOR deserialization failed
    #[error("CBOR decode error: {0}")]
    CborDecode(String),
}
