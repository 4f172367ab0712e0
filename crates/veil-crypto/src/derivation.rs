//! Key derivation for the sealed-sender envelope using HKDF
//!
//! Both derivations run ECDH and expand the shared secret with HKDF-SHA256
//! into three 32-byte outputs. No `info` context is used.
//!
//! The ephemeral phase keeps all three outputs (chain, cipher, MAC). The
//! static phase drops output 0 and keeps outputs 1 and 2. Peers depend on
//! this exact indexing, so it must not be "tidied up".

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::{
    error::CryptoError,
    keys::{PrivateKey, PublicKey},
};

/// Domain separation prefix for the ephemeral salt
pub const UNIDENTIFIED_DELIVERY_PREFIX: &[u8] = b"UnidentifiedDelivery";

/// Size of every derived sub-key
pub const DERIVED_KEY_SIZE: usize = 32;

/// Total HKDF output: three sub-keys
const DERIVED_SECRETS_SIZE: usize = 3 * DERIVED_KEY_SIZE;

/// Keys derived from the ephemeral agreement.
///
/// The cipher and MAC keys protect the sender's static key. The chain key
/// seeds the salt of the static phase.
pub struct EphemeralKeys {
    chain_key: [u8; DERIVED_KEY_SIZE],
    cipher_key: [u8; DERIVED_KEY_SIZE],
    mac_key: [u8; DERIVED_KEY_SIZE],
}

impl EphemeralKeys {
    /// Chain key (HKDF output 0).
    pub fn chain_key(&self) -> &[u8; DERIVED_KEY_SIZE] {
        &self.chain_key
    }

    /// AES-256-CTR key (HKDF output 1).
    pub fn cipher_key(&self) -> &[u8; DERIVED_KEY_SIZE] {
        &self.cipher_key
    }

    /// HMAC-SHA256 key (HKDF output 2).
    pub fn mac_key(&self) -> &[u8; DERIVED_KEY_SIZE] {
        &self.mac_key
    }
}

impl Drop for EphemeralKeys {
    fn drop(&mut self) {
        self.chain_key.zeroize();
        self.cipher_key.zeroize();
        self.mac_key.zeroize();
    }
}

/// Keys derived from the static (identity-to-identity) agreement.
///
/// These protect the inner message content.
pub struct StaticKeys {
    cipher_key: [u8; DERIVED_KEY_SIZE],
    mac_key: [u8; DERIVED_KEY_SIZE],
}

impl StaticKeys {
    /// AES-256-CTR key (HKDF output 1).
    pub fn cipher_key(&self) -> &[u8; DERIVED_KEY_SIZE] {
        &self.cipher_key
    }

    /// HMAC-SHA256 key (HKDF output 2).
    pub fn mac_key(&self) -> &[u8; DERIVED_KEY_SIZE] {
        &self.mac_key
    }
}

impl Drop for StaticKeys {
    fn drop(&mut self) {
        self.cipher_key.zeroize();
        self.mac_key.zeroize();
    }
}

/// Build the ephemeral-phase salt.
///
/// `prefix ‖ recipient_identity ‖ ephemeral_public`, where both keys are in
/// serialized (33-byte) form. The sender passes the recipient's identity key,
/// the recipient passes its own.
pub fn ephemeral_salt(recipient_identity: &[u8], ephemeral_public: &[u8]) -> Vec<u8> {
    let mut salt = Vec::with_capacity(
        UNIDENTIFIED_DELIVERY_PREFIX.len() + recipient_identity.len() + ephemeral_public.len(),
    );
    salt.extend_from_slice(UNIDENTIFIED_DELIVERY_PREFIX);
    salt.extend_from_slice(recipient_identity);
    salt.extend_from_slice(ephemeral_public);
    salt
}

/// Build the static-phase salt: `chain_key ‖ encrypted_static`.
pub fn static_salt(chain_key: &[u8; DERIVED_KEY_SIZE], encrypted_static: &[u8]) -> Vec<u8> {
    let mut salt = Vec::with_capacity(DERIVED_KEY_SIZE + encrypted_static.len());
    salt.extend_from_slice(chain_key);
    salt.extend_from_slice(encrypted_static);
    salt
}

/// Derive the ephemeral key set.
///
/// # Errors
///
/// - `InvalidKey` if the agreement is non-contributory
pub fn calculate_ephemeral_keys(
    their_public: &PublicKey,
    our_private: &PrivateKey,
    salt: &[u8],
) -> Result<EphemeralKeys, CryptoError> {
    let shared = our_private.calculate_agreement(their_public)?;
    let secrets = derive_secrets(shared.as_slice(), salt);

    Ok(EphemeralKeys {
        chain_key: split_key(&secrets, 0),
        cipher_key: split_key(&secrets, 1),
        mac_key: split_key(&secrets, 2),
    })
}

/// Derive the static key set.
///
/// Output 0 of the expansion is discarded.
///
/// # Errors
///
/// - `InvalidKey` if the agreement is non-contributory
pub fn calculate_static_keys(
    their_public: &PublicKey,
    our_private: &PrivateKey,
    salt: &[u8],
) -> Result<StaticKeys, CryptoError> {
    let shared = our_private.calculate_agreement(their_public)?;
    let secrets = derive_secrets(shared.as_slice(), salt);

    Ok(StaticKeys { cipher_key: split_key(&secrets, 1), mac_key: split_key(&secrets, 2) })
}

/// HKDF-SHA256 extract with `salt`, expand with empty info to 96 bytes.
fn derive_secrets(input_key_material: &[u8], salt: &[u8]) -> Zeroizing<[u8; DERIVED_SECRETS_SIZE]> {
    let hkdf = Hkdf::<Sha256>::new(Some(salt), input_key_material);

    let mut okm = Zeroizing::new([0u8; DERIVED_SECRETS_SIZE]);
    let Ok(()) = hkdf.expand(&[], okm.as_mut_slice()) else {
        unreachable!("96 bytes is a valid HKDF-SHA256 output length");
    };

    okm
}

fn split_key(secrets: &[u8; DERIVED_SECRETS_SIZE], index: usize) -> [u8; DERIVED_KEY_SIZE] {
    let start = index * DERIVED_KEY_SIZE;
    let mut key = [0u8; DERIVED_KEY_SIZE];
    key.copy_from_slice(&secrets[start..start + DERIVED_KEY_SIZE]);
    key
}
