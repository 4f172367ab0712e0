//! Error taxonomy for sealed-sender operations.
//!
//! Lower layers (`veil-crypto`, `veil-proto`) have their own error types. They
//! collapse into [`SealedSenderError`] so callers can match on a small fixed
//! set of failure kinds without depending on those crates.

use thiserror::Error;
use veil_crypto::CryptoError;
use veil_proto::ProtocolError;

use crate::{address::SenderIdentity, session::SessionError, validator::CertificateError};

/// Errors from [`crate::SecretSessionCipher`] and certificate parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SealedSenderError {
    /// Bytes are not a well-formed message or certificate
    #[error("malformed: {reason}")]
    Malformed {
        /// What was wrong
        reason: String,
    },

    /// Outer message version is not supported
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    /// An envelope MAC did not verify
    #[error("bad MAC")]
    MacMismatch,

    /// A public key was unusable
    #[error("invalid key: {reason}")]
    InvalidKey {
        /// Why the key was rejected
        reason: String,
    },

    /// Certificate chain did not validate
    #[error("certificate rejected: {0}")]
    Certificate(#[from] CertificateError),

    /// Certified identity key differs from the key that encrypted the message
    #[error("sender's certificate key does not match key used in message")]
    IdentityKeyMismatch,

    /// Inner content names an unknown session message type
    #[error("unknown message type: {0}")]
    UnknownMessageType(u32),

    /// Identity key for `name` is not available
    #[error("no identity key for {name}")]
    NoIdentity {
        /// Account whose key was missing (empty for the local identity)
        name: String,
    },

    /// Session cipher or identity store failed before the sender was known
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Session cipher failed to decrypt a message from a known sender
    #[error("session decryption failed for {sender}: {source}")]
    SessionDecrypt {
        /// Sender resolved from the validated certificate
        sender: SenderIdentity,
        /// Underlying session error
        #[source]
        source: SessionError,
    },
}

impl SealedSenderError {
    /// Sender attached to the error, if decryption got far enough to know it.
    pub fn sender(&self) -> Option<&SenderIdentity> {
        match self {
            Self::SessionDecrypt { sender, .. } => Some(sender),
            _ => None,
        }
    }

    /// Returns true if the message is forged, tampered with, or not meant
    /// for us.
    ///
    /// Such messages must be dropped. They never become valid on retry.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::MacMismatch | Self::Certificate(_) | Self::IdentityKeyMismatch)
    }
}

impl From<CryptoError> for SealedSenderError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::Malformed { reason } => Self::Malformed { reason },
            CryptoError::MacMismatch => Self::MacMismatch,
            CryptoError::InvalidKey { reason } => Self::InvalidKey { reason },
        }
    }
}

impl From<ProtocolError> for SealedSenderError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::UnsupportedVersion(version) => Self::UnsupportedVersion(version),
            ProtocolError::UnknownMessageType(value) => Self::UnknownMessageType(value),
            ProtocolError::Malformed { reason } => Self::Malformed { reason },
            other @ (ProtocolError::MissingField(_)
            | ProtocolError::MissingSender
            | ProtocolError::MessageTooLarge { .. }
            | ProtocolError::TrailingBytes { .. }
            | ProtocolError::CborEncode(_)
            | ProtocolError::CborDecode(_)) => Self::Malformed { reason: other.to_string() },
        }
    }
}
