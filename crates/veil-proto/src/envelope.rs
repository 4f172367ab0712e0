//! Outer sealed-sender message.
//!
//! # Wire Format
//!
//! ```text
//! [version: 1 byte][CBOR map: ephemeral_public, encrypted_static, encrypted_message]
//! ```
//!
//! The version byte repeats the version in both nibbles. Readers only look
//! at the high nibble, the low nibble is kept for older peers that expect it.

use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;

use crate::{
    codec,
    errors::{ProtocolError, Result},
};

/// Version written by this implementation and the newest one it reads
pub const CIPHERTEXT_VERSION: u8 = 1;

/// A parsed outer message.
///
/// Carries no sender information. Everything identifying is inside the two
/// encrypted blobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedSenderMessage {
    /// Version taken from the high nibble of the first byte
    pub version: u8,
    /// Serialized ephemeral public key of the sender
    pub ephemeral_public: Vec<u8>,
    /// Sender identity key under the ephemeral keys
    pub encrypted_static: Vec<u8>,
    /// Inner content under the static keys
    pub encrypted_message: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct EnvelopeWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ephemeral_public: Option<ByteBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    encrypted_static: Option<ByteBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    encrypted_message: Option<ByteBuf>,
}

impl SealedSenderMessage {
    /// Build a message at [`CIPHERTEXT_VERSION`].
    pub fn new(
        ephemeral_public: Vec<u8>,
        encrypted_static: Vec<u8>,
        encrypted_message: Vec<u8>,
    ) -> Self {
        Self { version: CIPHERTEXT_VERSION, ephemeral_public, encrypted_static, encrypted_message }
    }

    /// Serialize to wire bytes.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::CborEncode` if serialization fails
    pub fn encode(&self) -> Result<Vec<u8>> {
        let wire = EnvelopeWire {
            ephemeral_public: Some(ByteBuf::from(self.ephemeral_public.clone())),
            encrypted_static: Some(ByteBuf::from(self.encrypted_static.clone())),
            encrypted_message: Some(ByteBuf::from(self.encrypted_message.clone())),
        };

        let body = codec::encode(&wire)?;
        let mut out = Vec::with_capacity(1 + body.len());
        out.push((self.version << 4) | CIPHERTEXT_VERSION);
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Parse wire bytes.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::Malformed` if `bytes` is empty
    /// - `ProtocolError::UnsupportedVersion` if the high nibble is newer than
    ///   [`CIPHERTEXT_VERSION`]
    /// - `ProtocolError::MissingField` if any of the three blobs is absent
    /// - any error from strict CBOR decoding
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let Some((&version_byte, body)) = bytes.split_first() else {
            return Err(ProtocolError::Malformed { reason: "empty message".to_string() });
        };

        let version = version_byte >> 4;
        if version > CIPHERTEXT_VERSION {
            return Err(ProtocolError::UnsupportedVersion(version));
        }

        let wire: EnvelopeWire = codec::decode(body)?;

        Ok(Self {
            version,
            ephemeral_public: wire
                .ephemeral_public
                .ok_or(ProtocolError::MissingField("ephemeral_public"))?
                .into_vec(),
            encrypted_static: wire
                .encrypted_static
                .ok_or(ProtocolError::MissingField("encrypted_static"))?
                .into_vec(),
            encrypted_message: wire
                .encrypted_message
                .ok_or(ProtocolError::MissingField("encrypted_message"))?
                .into_vec(),
        })
    }
}
