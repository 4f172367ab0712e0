//! Collaborator traits: the session cipher and the identity key store.
//!
//! The sealed-sender layer wraps an existing per-recipient session cipher
//! (a double-ratchet style protocol). That cipher and its key storage live
//! outside this crate and are reached only through these traits.
//!
//! Traits are async because real stores suspend on I/O. No runtime is
//! required by this crate.

use async_trait::async_trait;
use thiserror::Error;
use veil_crypto::{KeyPair, PublicKey};
use veil_proto::ContentType;

use crate::address::ProtocolAddress;

/// Kind of message produced by the session cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CiphertextMessageType {
    /// Message on an established session
    Whisper,
    /// Session-establishing message
    PreKey,
}

impl From<ContentType> for CiphertextMessageType {
    fn from(content_type: ContentType) -> Self {
        match content_type {
            ContentType::Message => Self::Whisper,
            ContentType::PreKeyMessage => Self::PreKey,
        }
    }
}

impl From<CiphertextMessageType> for ContentType {
    fn from(message_type: CiphertextMessageType) -> Self {
        match message_type {
            CiphertextMessageType::Whisper => Self::Message,
            CiphertextMessageType::PreKey => Self::PreKeyMessage,
        }
    }
}

/// Output of [`SessionCipher::encrypt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiphertextMessage {
    /// Which decrypt operation the recipient must use
    pub message_type: CiphertextMessageType,
    /// Session-cipher ciphertext
    pub body: Vec<u8>,
}

/// Errors reported by collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No session exists for the address
    #[error("no session for {address}")]
    NoSession {
        /// Remote address
        address: ProtocolAddress,
    },

    /// Ciphertext could not be decrypted on the session
    #[error("invalid message: {reason}")]
    InvalidMessage {
        /// Why the message was rejected
        reason: String,
    },

    /// Remote identity key is not trusted
    #[error("untrusted identity for {address}")]
    UntrustedIdentity {
        /// Remote address
        address: ProtocolAddress,
    },

    /// Backing store failed
    #[error("storage error: {0}")]
    Storage(String),
}

/// Per-recipient session cipher.
///
/// # Concurrency
///
/// Implementations own their ratchet state and MUST serialize state
/// mutation per remote address. Concurrent calls for different addresses
/// may run in parallel.
#[async_trait]
pub trait SessionCipher: Send + Sync {
    /// Encrypt `plaintext` on the session with `address`.
    async fn encrypt(
        &self,
        address: &ProtocolAddress,
        plaintext: &[u8],
    ) -> Result<CiphertextMessage, SessionError>;

    /// Decrypt a message on an established session.
    async fn decrypt_whisper(
        &self,
        address: &ProtocolAddress,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, SessionError>;

    /// Decrypt a session-establishing message.
    async fn decrypt_prekey(
        &self,
        address: &ProtocolAddress,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, SessionError>;

    /// Protocol version of the open session with `address`.
    async fn session_version(&self, address: &ProtocolAddress) -> Result<u32, SessionError>;

    /// Registration id of the remote device.
    async fn remote_registration_id(&self, address: &ProtocolAddress)
    -> Result<u32, SessionError>;

    /// Close the open session with `address`, keeping it for late messages.
    async fn close_open_session(&self, address: &ProtocolAddress) -> Result<(), SessionError>;
}

/// Source of the local identity and known remote identities.
#[async_trait]
pub trait IdentityKeyStore: Send + Sync {
    /// Local long-term identity key pair.
    async fn identity_key_pair(&self) -> Result<Option<KeyPair>, SessionError>;

    /// Long-term identity key stored for account `name`.
    async fn identity(&self, name: &str) -> Result<Option<PublicKey>, SessionError>;
}
