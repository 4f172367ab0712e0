//! Inner message content, recovered after the outer layer is opened.
//!
//! # Wire Format
//!
//! CBOR map `{type, sender_certificate, content}` where `type` is an integer
//! from [`ContentType`].

use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;

use crate::{
    codec,
    errors::{ProtocolError, Result},
};

/// Kind of session-cipher message wrapped in the content.
///
/// Wire values are fixed. Values outside the table are rejected rather than
/// mapped to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ContentType {
    /// Session-establishing message
    PreKeyMessage = 1,
    /// Message on an established session
    Message = 2,
}

impl ContentType {
    /// Wire value of this type.
    pub const fn to_u32(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for ContentType {
    type Error = ProtocolError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            1 => Ok(Self::PreKeyMessage),
            2 => Ok(Self::Message),
            other => Err(ProtocolError::UnknownMessageType(other)),
        }
    }
}

/// Everything the recipient learns once the outer layer is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnidentifiedSenderMessageContent {
    /// Which session-cipher decryption to dispatch to
    pub content_type: ContentType,
    /// Serialized sender certificate
    pub sender_certificate: Vec<u8>,
    /// Session-cipher ciphertext
    pub content: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct ContentWire {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    message_type: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sender_certificate: Option<ByteBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<ByteBuf>,
}

impl UnidentifiedSenderMessageContent {
    /// Bundle content for sealing.
    pub fn new(content_type: ContentType, sender_certificate: Vec<u8>, content: Vec<u8>) -> Self {
        Self { content_type, sender_certificate, content }
    }

    /// Serialize to CBOR.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::CborEncode` if serialization fails
    pub fn encode(&self) -> Result<Vec<u8>> {
        codec::encode(&ContentWire {
            message_type: Some(self.content_type.to_u32()),
            sender_certificate: Some(ByteBuf::from(self.sender_certificate.clone())),
            content: Some(ByteBuf::from(self.content.clone())),
        })
    }

    /// Parse from CBOR.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::MissingField` if any field is absent
    /// - `ProtocolError::UnknownMessageType` if `type` is not in the table
    /// - any error from strict CBOR decoding
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let wire: ContentWire = codec::decode(bytes)?;

        let content_type = wire.message_type.ok_or(ProtocolError::MissingField("type"))?;
        let sender_certificate =
            wire.sender_certificate.ok_or(ProtocolError::MissingField("sender_certificate"))?;
        let content = wire.content.ok_or(ProtocolError::MissingField("content"))?;

        Ok(Self {
            content_type: ContentType::try_from(content_type)?,
            sender_certificate: sender_certificate.into_vec(),
            content: content.into_vec(),
        })
    }
}
