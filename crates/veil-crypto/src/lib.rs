//! Veil Cryptographic Primitives
//!
//! Cryptographic building blocks for the sealed-sender envelope. Pure
//! functions with deterministic outputs. Callers provide random bytes for
//! deterministic testing.
//!
//! # Key Schedule
//!
//! Every sealed message carries two encrypted blobs. The first hides the
//! sender's long-term identity key behind an ephemeral key agreement, the
//! second hides the actual content behind a static (identity-to-identity) key
//! agreement that is bound to the first blob through its salt.
//!
//! ```text
//! ECDH(ephemeral, recipient identity)
//!        │
//!        ▼ HKDF(salt = prefix ‖ recipient ‖ ephemeral)
//! chain key ─┬─ cipher key ─ mac key ──► encrypted static key
//!            │
//!            ▼
//! ECDH(sender identity, recipient identity)
//!        │
//!        ▼ HKDF(salt = chain key ‖ encrypted static key)
//!   cipher key ─ mac key ──► encrypted message
//! ```
//!
//! # Security
//!
//! Forward Secrecy:
//! - Ephemeral key pairs are generated per message and zeroized on drop
//! - Derived key sets are single use and zeroized on drop
//!
//! Authenticity:
//! - HMAC-SHA256 (truncated to 10 bytes) over each ciphertext
//! - MAC is checked in constant time before any decryption happens
//!
//! Counter Reuse:
//! - AES-CTR always starts from an all-zero counter block. This is only sound
//!   because every cipher key is derived fresh for exactly one plaintext.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod derivation;
pub mod envelope;
pub mod error;
pub mod keys;

pub use derivation::{
    DERIVED_KEY_SIZE, EphemeralKeys, StaticKeys, UNIDENTIFIED_DELIVERY_PREFIX,
    calculate_ephemeral_keys, calculate_static_keys, ephemeral_salt, static_salt,
};
pub use envelope::{MAC_SIZE, seal_decrypt, seal_encrypt};
pub use error::CryptoError;
pub use keys::{DJB_TYPE, KeyPair, PUBLIC_KEY_LENGTH, PrivateKey, PublicKey};
