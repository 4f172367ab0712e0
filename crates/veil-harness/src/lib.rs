//! Deterministic test harness for Veil.
//!
//! Test doubles for every collaborator of [`veil_core::SecretSessionCipher`]
//! plus a small certificate authority, so end-to-end tests can run complete
//! sealed-sender exchanges without a server or a real ratchet.
//!
//! - [`SeededEnv`]: seeded RNG and manual clock
//! - [`MemorySessionCipher`]: loopback session cipher with per-address state
//! - [`MemoryIdentityStore`]: in-memory identity keys
//! - [`CertificateAuthority`] / [`ServerIssuer`]: certificate chain issuance
//! - [`Party`]: one device with all of the above wired together

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod authority;
pub mod env;
pub mod identity;
pub mod session;

pub use authority::{CertificateAuthority, SenderDetails, ServerIssuer};
pub use env::SeededEnv;
pub use identity::MemoryIdentityStore;
pub use session::{MemorySessionCipher, SESSION_VERSION};
use veil_core::{
    Environment, LocalIdentity, ProtocolAddress, SealedSenderError, SecretSessionCipher,
    SenderCertificate,
};
use veil_crypto::KeyPair;

/// Cipher type used by every [`Party`]
pub type HarnessCipher = SecretSessionCipher<MemorySessionCipher, MemoryIdentityStore, SeededEnv>;

/// One device taking part in a test exchange.
pub struct Party {
    /// Account and device
    pub details: SenderDetails,
    /// Long-term identity key pair
    pub identity: KeyPair,
    /// Certificate issued for `identity`
    pub certificate: SenderCertificate,
    /// Sealed-sender cipher over this device's doubles
    pub cipher: HarnessCipher,
    env: SeededEnv,
}

impl Party {
    /// Create a device with a fresh identity and a certificate from `issuer`
    /// valid until `expires`.
    ///
    /// # Errors
    ///
    /// - `Malformed` if `details` names no account
    pub fn new(
        issuer: &ServerIssuer,
        details: SenderDetails,
        registration_id: u32,
        expires: u64,
        env: SeededEnv,
    ) -> Result<Self, SealedSenderError> {
        let identity = KeyPair::from_random(env.random_seed());
        let certificate = issuer.issue(&details, identity.public_key(), expires)?;

        let cipher = SecretSessionCipher::new(
            MemorySessionCipher::new(registration_id),
            MemoryIdentityStore::new(identity.clone()),
            env.clone(),
        );

        Ok(Self { details, identity, certificate, cipher, env })
    }

    /// Address other devices use to reach this one.
    pub fn address(&self) -> ProtocolAddress {
        ProtocolAddress::new(self.details.session_name(), self.details.device_id)
    }

    /// This device as seen by its own self-sent check.
    pub fn local_identity(&self) -> LocalIdentity {
        LocalIdentity {
            e164: self.details.e164.clone(),
            uuid: self.details.uuid.clone(),
            device_id: self.details.device_id,
        }
    }

    /// Environment driving this device.
    pub fn env(&self) -> &SeededEnv {
        &self.env
    }

    /// Teach this device `other`'s identity key under each of its names.
    pub fn introduce(&self, other: &Party) {
        let key = *other.identity.public_key();
        let store = self.cipher.identities();

        for name in [&other.details.e164, &other.details.uuid].into_iter().flatten() {
            store.save_identity(name, key);
        }
    }
}
