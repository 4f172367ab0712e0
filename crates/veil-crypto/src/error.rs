//! Error types for cryptographic operations

use thiserror::Error;

/// Errors from key handling, derivation and envelope operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Input is structurally unusable (e.g. blob shorter than its MAC)
    #[error("malformed input: {reason}")]
    Malformed {
        /// What was wrong with the input
        reason: String,
    },

    /// Authentication tag did not match
    #[error("bad MAC")]
    MacMismatch,

    /// Public key bytes are not a usable curve point
    #[error("invalid key: {reason}")]
    InvalidKey {
        /// Why the key was rejected
        reason: String,
    },
}

impl CryptoError {
    /// Returns true if the error means the bytes were tampered with or
    /// encrypted for someone else.
    ///
    /// Such messages must be dropped without further processing.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::MacMismatch)
    }
}
