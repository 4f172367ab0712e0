//! Typed certificates
//!
//! Parsing turns wire structures into values with every mandatory field
//! present and every key in a usable format. Parsing does NOT check
//! signatures or expiry; that is [`crate::CertificateValidator`]'s job.

use ed25519_dalek::{PUBLIC_KEY_LENGTH, VerifyingKey};
use veil_crypto::PublicKey;
use veil_proto::{SenderCertificateBody, ServerCertificateBody, SignedCertificate};

use crate::{address::SenderIdentity, error::SealedSenderError};

/// Intermediate certificate issued by the trust root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCertificate {
    id: u32,
    key: VerifyingKey,
    certificate: Vec<u8>,
    signature: Vec<u8>,
    serialized: Vec<u8>,
}

impl ServerCertificate {
    /// Parse a serialized server certificate.
    ///
    /// # Errors
    ///
    /// - `Malformed` if the wrapper or body is structurally invalid
    /// - `InvalidKey` if the server key is not an Ed25519 public key
    pub fn deserialize(bytes: &[u8]) -> Result<Self, SealedSenderError> {
        let signed = SignedCertificate::decode(bytes)?;
        let body = ServerCertificateBody::decode(&signed.certificate)?;

        let key_bytes: [u8; PUBLIC_KEY_LENGTH] =
            body.key.as_slice().try_into().map_err(|_| SealedSenderError::InvalidKey {
                reason: format!(
                    "server key must be {PUBLIC_KEY_LENGTH} bytes, got {}",
                    body.key.len()
                ),
            })?;
        let key = VerifyingKey::from_bytes(&key_bytes).map_err(|e| SealedSenderError::InvalidKey {
            reason: format!("server key: {e}"),
        })?;

        Ok(Self {
            id: body.id,
            key,
            certificate: signed.certificate,
            signature: signed.signature,
            serialized: bytes.to_vec(),
        })
    }

    /// Identifier checked against the revocation list.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Key that signs sender certificates.
    pub fn key(&self) -> &VerifyingKey {
        &self.key
    }

    /// Signed body bytes.
    pub fn certificate(&self) -> &[u8] {
        &self.certificate
    }

    /// Trust-root signature over [`Self::certificate`].
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Full wire form.
    pub fn serialized(&self) -> &[u8] {
        &self.serialized
    }
}

/// Certificate binding a sender account and device to an identity key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderCertificate {
    sender: SenderIdentity,
    expires: u64,
    identity_key: PublicKey,
    signer: ServerCertificate,
    certificate: Vec<u8>,
    signature: Vec<u8>,
    serialized: Vec<u8>,
}

impl SenderCertificate {
    /// Parse a serialized sender certificate, including its server
    /// certificate.
    ///
    /// # Errors
    ///
    /// - `Malformed` if any layer is structurally invalid, no sender is
    ///   named, or the device id is zero
    /// - `InvalidKey` if the identity key or server key is unusable
    pub fn deserialize(bytes: &[u8]) -> Result<Self, SealedSenderError> {
        let signed = SignedCertificate::decode(bytes)?;
        let body = SenderCertificateBody::decode(&signed.certificate)?;

        if body.sender_device == 0 {
            return Err(SealedSenderError::Malformed {
                reason: "sender device must be non-zero".to_string(),
            });
        }

        let Some(sender) =
            SenderIdentity::new(body.sender_e164, body.sender_uuid, body.sender_device)
        else {
            return Err(SealedSenderError::Malformed {
                reason: "sender certificate has no sender".to_string(),
            });
        };

        let identity_key = PublicKey::deserialize(&body.identity_key)?;
        let signer = ServerCertificate::deserialize(&body.signer)?;

        Ok(Self {
            sender,
            expires: body.expires,
            identity_key,
            signer,
            certificate: signed.certificate,
            signature: signed.signature,
            serialized: bytes.to_vec(),
        })
    }

    /// Certified sender.
    pub fn sender(&self) -> &SenderIdentity {
        &self.sender
    }

    /// Sender phone number, if certified.
    pub fn sender_e164(&self) -> Option<&str> {
        self.sender.e164()
    }

    /// Sender uuid, if certified.
    pub fn sender_uuid(&self) -> Option<&str> {
        self.sender.uuid()
    }

    /// Sender device id (never zero).
    pub fn sender_device(&self) -> u32 {
        self.sender.device_id()
    }

    /// Expiry in milliseconds since the Unix epoch.
    pub fn expires(&self) -> u64 {
        self.expires
    }

    /// Sender's long-term identity key.
    pub fn identity_key(&self) -> &PublicKey {
        &self.identity_key
    }

    /// Embedded server certificate.
    pub fn signer(&self) -> &ServerCertificate {
        &self.signer
    }

    /// Signed body bytes.
    pub fn certificate(&self) -> &[u8] {
        &self.certificate
    }

    /// Server signature over [`Self::certificate`].
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Full wire form, as embedded in outgoing messages.
    pub fn serialized(&self) -> &[u8] {
        &self.serialized
    }
}
