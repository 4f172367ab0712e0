//! Fuzz target for the authenticated envelope
//!
//! # Invariants
//!
//! - `seal_decrypt` never panics on arbitrary input
//! - A sealed blob opens to its plaintext
//! - Any single-byte change to a sealed blob is rejected

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use veil_crypto::{seal_decrypt, seal_encrypt};

#[derive(Debug, Arbitrary)]
struct Input {
    cipher_key: [u8; 32],
    mac_key: [u8; 32],
    plaintext: Vec<u8>,
    flip_at: u16,
    flip_mask: u8,
    raw: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let _ = seal_decrypt(&input.cipher_key, &input.mac_key, &input.raw);

    let mut sealed = seal_encrypt(&input.cipher_key, &input.mac_key, &input.plaintext);
    assert_eq!(
        seal_decrypt(&input.cipher_key, &input.mac_key, &sealed).ok(),
        Some(input.plaintext.clone())
    );

    if input.flip_mask != 0 {
        let index = usize::from(input.flip_at) % sealed.len();
        sealed[index] ^= input.flip_mask;
        assert!(seal_decrypt(&input.cipher_key, &input.mac_key, &sealed).is_err());
    }
});
