//! Curve25519 identity and ephemeral keys
//!
//! Public keys travel in the 33-byte DJB format: a `0x05` type byte followed
//! by the 32-byte Montgomery u-coordinate. Private keys never leave this
//! module in serialized form.

use std::fmt;

use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Type byte prefixed to every serialized Curve25519 public key
pub const DJB_TYPE: u8 = 0x05;

/// Length of a serialized public key (type byte + 32 key bytes)
pub const PUBLIC_KEY_LENGTH: usize = 33;

/// Length of the raw key material behind the type byte
const KEY_BYTES: usize = 32;

/// A Curve25519 public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(X25519PublicKey);

impl PublicKey {
    /// Parse a serialized public key.
    ///
    /// # Errors
    ///
    /// - `InvalidKey` if the input is empty, carries an unknown type byte, or
    ///   is not exactly [`PUBLIC_KEY_LENGTH`] bytes long
    pub fn deserialize(bytes: &[u8]) -> Result<Self, CryptoError> {
        let Some((&key_type, key)) = bytes.split_first() else {
            return Err(CryptoError::InvalidKey { reason: "empty public key".to_string() });
        };

        if key_type != DJB_TYPE {
            return Err(CryptoError::InvalidKey {
                reason: format!("unknown key type {key_type:#04x}"),
            });
        }

        let key: [u8; KEY_BYTES] = key.try_into().map_err(|_| CryptoError::InvalidKey {
            reason: format!("expected {KEY_BYTES} key bytes, got {}", key.len()),
        })?;

        Ok(Self(X25519PublicKey::from(key)))
    }

    /// Serialized form: `[DJB_TYPE][32 key bytes]`.
    pub fn serialize(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        let mut out = [0u8; PUBLIC_KEY_LENGTH];
        out[0] = DJB_TYPE;
        out[1..].copy_from_slice(self.0.as_bytes());
        out
    }

    /// Raw 32-byte u-coordinate without the type byte.
    pub fn public_key_bytes(&self) -> &[u8; KEY_BYTES] {
        self.0.as_bytes()
    }
}

impl From<[u8; KEY_BYTES]> for PublicKey {
    fn from(bytes: [u8; KEY_BYTES]) -> Self {
        Self(X25519PublicKey::from(bytes))
    }
}

/// A Curve25519 private key.
///
/// The underlying secret is zeroized when dropped.
#[derive(Clone)]
pub struct PrivateKey(StaticSecret);

impl PrivateKey {
    /// Build a private key from 32 bytes of key material.
    ///
    /// The bytes are clamped as required by X25519. Caller MUST provide
    /// cryptographically secure random bytes in production.
    pub fn from_bytes(bytes: [u8; KEY_BYTES]) -> Self {
        Self(StaticSecret::from(bytes))
    }

    /// The public key matching this private key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(X25519PublicKey::from(&self.0))
    }

    /// Compute the X25519 shared secret with a counterparty.
    ///
    /// # Errors
    ///
    /// - `InvalidKey` if the counterparty key is a low-order point, which
    ///   would make the shared secret all zeroes
    pub fn calculate_agreement(
        &self,
        their_public: &PublicKey,
    ) -> Result<Zeroizing<[u8; KEY_BYTES]>, CryptoError> {
        let shared = self.0.diffie_hellman(&their_public.0);
        if !shared.was_contributory() {
            return Err(CryptoError::InvalidKey {
                reason: "public key produced a non-contributory agreement".to_string(),
            });
        }

        Ok(Zeroizing::new(*shared.as_bytes()))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// A Curve25519 key pair (identity or ephemeral).
#[derive(Clone)]
pub struct KeyPair {
    public_key: PublicKey,
    private_key: PrivateKey,
}

impl KeyPair {
    /// Build a key pair from 32 random bytes.
    pub fn from_random(random: [u8; KEY_BYTES]) -> Self {
        Self::from_private_key(PrivateKey::from_bytes(random))
    }

    /// Build a key pair around an existing private key.
    pub fn from_private_key(private_key: PrivateKey) -> Self {
        Self { public_key: private_key.public_key(), private_key }
    }

    /// Public half of the pair.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Private half of the pair.
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}
