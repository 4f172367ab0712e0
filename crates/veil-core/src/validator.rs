//! Sender certificate validation
//!
//! A sender certificate is accepted only if its whole chain checks out:
//!
//! 1. The server certificate is signed by the trust root
//! 2. The server certificate id is not revoked
//! 3. The sender certificate is signed by the server key
//! 4. The sender certificate has not expired
//!
//! Checks run in this order and the first failure is returned.

use std::{collections::BTreeSet, fmt};

use ed25519_dalek::{PUBLIC_KEY_LENGTH, Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Deserializer, de};
use thiserror::Error;
use tracing::warn;

use crate::{certificate::SenderCertificate, error::SealedSenderError};

/// Key whose signature failed to verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signer {
    /// Trust root signing a server certificate
    TrustRoot,
    /// Server certificate signing a sender certificate
    ServerCertificate,
}

impl fmt::Display for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrustRoot => f.write_str("trust root"),
            Self::ServerCertificate => f.write_str("server certificate"),
        }
    }
}

/// Reasons a certificate chain is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CertificateError {
    /// A signature in the chain did not verify
    #[error("invalid signature from {signer}")]
    InvalidSignature {
        /// Which level of the chain failed
        signer: Signer,
    },

    /// Server certificate id is on the revocation list
    #[error("server certificate {id} is revoked")]
    Revoked {
        /// Revoked server certificate id
        id: u32,
    },

    /// Sender certificate expired before the validation time
    #[error("certificate expired at {expires}, validated at {validation_time}")]
    Expired {
        /// Expiry from the certificate (ms since epoch)
        expires: u64,
        /// Time the check was made at (ms since epoch)
        validation_time: u64,
    },
}

/// Trust anchor and revocation list.
///
/// Can be deserialized from application configuration:
///
/// ```toml
/// trust_root = "<64 hex characters>"
/// revoked_ids = [31337]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrustConfig {
    /// Key that signs server certificates
    #[serde(deserialize_with = "deserialize_trust_root")]
    pub trust_root: VerifyingKey,
    /// Server certificate ids that must be rejected
    #[serde(default)]
    pub revoked_ids: BTreeSet<u32>,
}

impl TrustConfig {
    /// Trust `trust_root` with nothing revoked.
    pub fn new(trust_root: VerifyingKey) -> Self {
        Self { trust_root, revoked_ids: BTreeSet::new() }
    }

    /// Build from a raw 32-byte Ed25519 public key.
    ///
    /// # Errors
    ///
    /// - `InvalidKey` if the bytes are not a valid Ed25519 public key
    pub fn from_trust_root_bytes(bytes: &[u8]) -> Result<Self, SealedSenderError> {
        parse_trust_root(bytes).map(Self::new)
    }

    /// Add server certificate ids to the revocation list.
    #[must_use]
    pub fn with_revoked(mut self, ids: impl IntoIterator<Item = u32>) -> Self {
        self.revoked_ids.extend(ids);
        self
    }

    /// Returns true if server certificate `id` is revoked.
    pub fn is_revoked(&self, id: u32) -> bool {
        self.revoked_ids.contains(&id)
    }
}

fn parse_trust_root(bytes: &[u8]) -> Result<VerifyingKey, SealedSenderError> {
    let key: [u8; PUBLIC_KEY_LENGTH] = bytes.try_into().map_err(|_| {
        SealedSenderError::InvalidKey {
            reason: format!("trust root must be {PUBLIC_KEY_LENGTH} bytes, got {}", bytes.len()),
        }
    })?;

    VerifyingKey::from_bytes(&key)
        .map_err(|e| SealedSenderError::InvalidKey { reason: format!("trust root: {e}") })
}

fn deserialize_trust_root<'de, D>(deserializer: D) -> Result<VerifyingKey, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded = String::deserialize(deserializer)?;
    let bytes = hex::decode(encoded.trim()).map_err(de::Error::custom)?;
    parse_trust_root(&bytes).map_err(de::Error::custom)
}

/// Validates sender certificates against a [`TrustConfig`].
#[derive(Debug, Clone)]
pub struct CertificateValidator {
    trust: TrustConfig,
}

impl CertificateValidator {
    /// Create a validator.
    pub fn new(trust: TrustConfig) -> Self {
        Self { trust }
    }

    /// Trust configuration in use.
    pub fn trust_config(&self) -> &TrustConfig {
        &self.trust
    }

    /// Validate `certificate` at `validation_time` (ms since epoch).
    ///
    /// A certificate is still valid at exactly its expiry time.
    ///
    /// # Errors
    ///
    /// - `InvalidSignature { signer: TrustRoot }` if the server certificate
    ///   is not signed by the trust root
    /// - `Revoked` if the server certificate id is revoked
    /// - `InvalidSignature { signer: ServerCertificate }` if the sender
    ///   certificate is not signed by the server key
    /// - `Expired` if `validation_time` is after the expiry
    pub fn validate(
        &self,
        certificate: &SenderCertificate,
        validation_time: u64,
    ) -> Result<(), CertificateError> {
        let server = certificate.signer();

        if !verify_signature(&self.trust.trust_root, server.certificate(), server.signature()) {
            warn!(server_id = server.id(), "server certificate signature invalid");
            return Err(CertificateError::InvalidSignature { signer: Signer::TrustRoot });
        }

        if self.trust.is_revoked(server.id()) {
            warn!(server_id = server.id(), "server certificate revoked");
            return Err(CertificateError::Revoked { id: server.id() });
        }

        if !verify_signature(server.key(), certificate.certificate(), certificate.signature()) {
            warn!(server_id = server.id(), "sender certificate signature invalid");
            return Err(CertificateError::InvalidSignature { signer: Signer::ServerCertificate });
        }

        if validation_time > certificate.expires() {
            warn!(expires = certificate.expires(), validation_time, "sender certificate expired");
            return Err(CertificateError::Expired {
                expires: certificate.expires(),
                validation_time,
            });
        }

        Ok(())
    }
}

fn verify_signature(key: &VerifyingKey, message: &[u8], signature: &[u8]) -> bool {
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    key.verify(message, &signature).is_ok()
}
