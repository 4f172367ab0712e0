//! Certificate wire structures.
//!
//! Both certificate levels use the same [`SignedCertificate`] wrapper: the
//! signed body travels as opaque bytes next to its signature, so the exact
//! bytes that were signed are the bytes that get verified.
//!
//! ```text
//! SignedCertificate { certificate: bytes, signature: bytes }
//!   ServerCertificateBody { id, key }
//!   SenderCertificateBody { sender_e164?, sender_uuid?, sender_device,
//!                           expires, identity_key, signer }
//! ```
//!
//! `signer` is itself a serialized server `SignedCertificate`.
//!
//! These types only check presence of fields. Signatures and key formats are
//! checked by the consumer.

use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;

use crate::{
    codec,
    errors::{ProtocolError, Result},
};

/// Signed wrapper used by both certificate levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCertificate {
    /// Serialized certificate body
    pub certificate: Vec<u8>,
    /// Signature over `certificate`
    pub signature: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct SignedWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    certificate: Option<ByteBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature: Option<ByteBuf>,
}

impl SignedCertificate {
    /// Serialize to CBOR.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::CborEncode` if serialization fails
    pub fn encode(&self) -> Result<Vec<u8>> {
        codec::encode(&SignedWire {
            certificate: Some(ByteBuf::from(self.certificate.clone())),
            signature: Some(ByteBuf::from(self.signature.clone())),
        })
    }

    /// Parse from CBOR.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::MissingField` if either field is absent
    /// - any error from strict CBOR decoding
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let wire: SignedWire = codec::decode(bytes)?;
        Ok(Self {
            certificate: wire
                .certificate
                .ok_or(ProtocolError::MissingField("certificate"))?
                .into_vec(),
            signature: wire.signature.ok_or(ProtocolError::MissingField("signature"))?.into_vec(),
        })
    }
}

/// Body of a server certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCertificateBody {
    /// Identifier checked against the revocation list
    pub id: u32,
    /// Server signing key (raw Ed25519 bytes)
    pub key: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct ServerWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<ByteBuf>,
}

impl ServerCertificateBody {
    /// Serialize to CBOR.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::CborEncode` if serialization fails
    pub fn encode(&self) -> Result<Vec<u8>> {
        codec::encode(&ServerWire { id: Some(self.id), key: Some(ByteBuf::from(self.key.clone())) })
    }

    /// Parse from CBOR.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::MissingField` if either field is absent
    /// - any error from strict CBOR decoding
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let wire: ServerWire = codec::decode(bytes)?;
        Ok(Self {
            id: wire.id.ok_or(ProtocolError::MissingField("id"))?,
            key: wire.key.ok_or(ProtocolError::MissingField("key"))?.into_vec(),
        })
    }
}

/// Body of a sender certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderCertificateBody {
    /// Sender phone number
    pub sender_e164: Option<String>,
    /// Sender account uuid
    pub sender_uuid: Option<String>,
    /// Sender device id
    pub sender_device: u32,
    /// Expiry, milliseconds since the Unix epoch
    pub expires: u64,
    /// Serialized sender identity key
    pub identity_key: Vec<u8>,
    /// Serialized server [`SignedCertificate`]
    pub signer: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct SenderWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sender_e164: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sender_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sender_device: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identity_key: Option<ByteBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signer: Option<ByteBuf>,
}

impl SenderCertificateBody {
    /// Serialize to CBOR.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::MissingSender` if neither sender field is set
    /// - `ProtocolError::CborEncode` if serialization fails
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.sender_e164.is_none() && self.sender_uuid.is_none() {
            return Err(ProtocolError::MissingSender);
        }

        codec::encode(&SenderWire {
            sender_e164: self.sender_e164.clone(),
            sender_uuid: self.sender_uuid.clone(),
            sender_device: Some(self.sender_device),
            expires: Some(self.expires),
            identity_key: Some(ByteBuf::from(self.identity_key.clone())),
            signer: Some(ByteBuf::from(self.signer.clone())),
        })
    }

    /// Parse from CBOR.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::MissingSender` if neither sender field is present
    /// - `ProtocolError::MissingField` if any other field is absent
    /// - any error from strict CBOR decoding
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let wire: SenderWire = codec::decode(bytes)?;

        if wire.sender_e164.is_none() && wire.sender_uuid.is_none() {
            return Err(ProtocolError::MissingSender);
        }

        Ok(Self {
            sender_e164: wire.sender_e164,
            sender_uuid: wire.sender_uuid,
            sender_device: wire.sender_device.ok_or(ProtocolError::MissingField("sender_device"))?,
            expires: wire.expires.ok_or(ProtocolError::MissingField("expires"))?,
            identity_key: wire
                .identity_key
                .ok_or(ProtocolError::MissingField("identity_key"))?
                .into_vec(),
            signer: wire.signer.ok_or(ProtocolError::MissingField("signer"))?.into_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender_body() -> SenderCertificateBody {
        SenderCertificateBody {
            sender_e164: Some("+14151231234".to_string()),
            sender_uuid: Some("9d0652a3-dcc3-4d11-975f-74d61598733f".to_string()),
            sender_device: 1,
            expires: 1_700_000_000_000,
            identity_key: vec![0x05; 33],
            signer: vec![0xA0],
        }
    }

    #[test]
    fn signed_round_trip() {
        let signed = SignedCertificate { certificate: vec![1, 2, 3], signature: vec![0x51; 64] };
        assert_eq!(SignedCertificate::decode(&signed.encode().unwrap()).unwrap(), signed);
    }

    #[test]
    fn signed_missing_signature() {
        let bytes = codec::encode(&SignedWire {
            certificate: Some(ByteBuf::from(vec![1])),
            signature: None,
        })
        .unwrap();

        assert_eq!(
            SignedCertificate::decode(&bytes),
            Err(ProtocolError::MissingField("signature"))
        );
    }

    #[test]
    fn server_round_trip() {
        let body = ServerCertificateBody { id: 42, key: vec![0x33; 32] };
        assert_eq!(ServerCertificateBody::decode(&body.encode().unwrap()).unwrap(), body);
    }

    #[test]
    fn sender_round_trip() {
        let body = sender_body();
        assert_eq!(SenderCertificateBody::decode(&body.encode().unwrap()).unwrap(), body);
    }

    #[test]
    fn sender_with_only_uuid() {
        let body = SenderCertificateBody { sender_e164: None, ..sender_body() };
        let decoded = SenderCertificateBody::decode(&body.encode().unwrap()).unwrap();
        assert_eq!(decoded.sender_e164, None);
        assert_eq!(decoded.sender_uuid, body.sender_uuid);
    }

    #[test]
    fn sender_without_any_sender_rejected() {
        let body = SenderCertificateBody { sender_e164: None, sender_uuid: None, ..sender_body() };
        assert_eq!(body.encode(), Err(ProtocolError::MissingSender));

        let bytes = codec::encode(&SenderWire {
            sender_e164: None,
            sender_uuid: None,
            sender_device: Some(1),
            expires: Some(1),
            identity_key: Some(ByteBuf::from(vec![0x05; 33])),
            signer: Some(ByteBuf::from(vec![0xA0])),
        })
        .unwrap();
        assert_eq!(SenderCertificateBody::decode(&bytes), Err(ProtocolError::MissingSender));
    }

    #[test]
    fn sender_missing_expiry_rejected() {
        let bytes = codec::encode(&SenderWire {
            sender_e164: Some("+1555".to_string()),
            sender_uuid: None,
            sender_device: Some(1),
            expires: None,
            identity_key: Some(ByteBuf::from(vec![0x05; 33])),
            signer: Some(ByteBuf::from(vec![0xA0])),
        })
        .unwrap();

        assert_eq!(
            SenderCertificateBody::decode(&bytes),
            Err(ProtocolError::MissingField("expires"))
        );
    }
}
