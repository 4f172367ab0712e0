//! Authenticated envelope: AES-256-CTR with a truncated HMAC-SHA256 tag
//!
//! # Wire Format
//!
//! ```text
//! [ciphertext: N bytes][mac: 10 bytes]
//! ```
//!
//! The ciphertext has the same length as the plaintext. The MAC is the first
//! 10 bytes of HMAC-SHA256(mac_key, ciphertext).
//!
//! CTR mode always starts from an all-zero counter block. Each key pair given
//! to [`seal_encrypt`] must therefore be used for exactly one plaintext.

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::{derivation::DERIVED_KEY_SIZE, error::CryptoError};

type Aes256Ctr = ctr::Ctr128BE<Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// Length of the truncated MAC appended to every envelope
pub const MAC_SIZE: usize = 10;

/// Initial counter block
const ZERO_IV: [u8; 16] = [0u8; 16];

/// Encrypt and authenticate `plaintext`.
///
/// Returns `ciphertext ‖ mac`, always `plaintext.len() + MAC_SIZE` bytes.
pub fn seal_encrypt(
    cipher_key: &[u8; DERIVED_KEY_SIZE],
    mac_key: &[u8; DERIVED_KEY_SIZE],
    plaintext: &[u8],
) -> Vec<u8> {
    let mut out = Vec::with_capacity(plaintext.len() + MAC_SIZE);
    out.extend_from_slice(plaintext);
    apply_keystream(cipher_key, &mut out);

    let tag = compute_mac(mac_key, &out);
    out.extend_from_slice(&tag);
    out
}

/// Verify and decrypt an envelope produced by [`seal_encrypt`].
///
/// The MAC is checked in constant time before any decryption.
///
/// # Errors
///
/// - `Malformed` if the input is shorter than [`MAC_SIZE`]
/// - `MacMismatch` if authentication fails
pub fn seal_decrypt(
    cipher_key: &[u8; DERIVED_KEY_SIZE],
    mac_key: &[u8; DERIVED_KEY_SIZE],
    envelope: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if envelope.len() < MAC_SIZE {
        return Err(CryptoError::Malformed {
            reason: format!(
                "envelope too short: {} bytes, need at least {MAC_SIZE}",
                envelope.len()
            ),
        });
    }

    let (ciphertext, their_mac) = envelope.split_at(envelope.len() - MAC_SIZE);
    let our_mac = compute_mac(mac_key, ciphertext);

    if !bool::from(our_mac.ct_eq(their_mac)) {
        return Err(CryptoError::MacMismatch);
    }

    let mut plaintext = ciphertext.to_vec();
    apply_keystream(cipher_key, &mut plaintext);
    Ok(plaintext)
}

fn apply_keystream(cipher_key: &[u8; DERIVED_KEY_SIZE], buf: &mut [u8]) {
    let mut cipher = Aes256Ctr::new(cipher_key.into(), &ZERO_IV.into());
    cipher.apply_keystream(buf);
}

fn compute_mac(mac_key: &[u8; DERIVED_KEY_SIZE], data: &[u8]) -> [u8; MAC_SIZE] {
    let Ok(mut mac) = HmacSha256::new_from_slice(mac_key) else {
        unreachable!("HMAC accepts keys of any length");
    };
    mac.update(data);
    let full = mac.finalize().into_bytes();

    let mut truncated = [0u8; MAC_SIZE];
    truncated.copy_from_slice(&full[..MAC_SIZE]);
    truncated
}
