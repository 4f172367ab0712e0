//! Veil Core
//!
//! Sealed-sender encryption on top of an existing session cipher. The relaying
//! server sees only the recipient. The recipient authenticates the sender
//! through a certificate chain rooted in a trusted key.
//!
//! # Architecture
//!
//! ```text
//! SecretSessionCipher ──► SessionCipher (external ratchet)
//!        │            ──► IdentityKeyStore (external keys)
//!        │            ──► Environment (randomness, clock)
//!        ▼
//! veil-crypto (derivation, envelope) + veil-proto (framing)
//!        │
//!        ▼
//! CertificateValidator (TrustConfig: trust root, revoked ids)
//! ```
//!
//! The cipher holds no state of its own. Ratchet state belongs to the session
//! cipher, keys belong to the identity store, and the revocation list is
//! configuration handed to the validator.
//!
//! # Security
//!
//! - Nothing reaches the session cipher until both envelope MACs, the
//!   certificate chain and the identity binding have been checked
//! - Key material and plaintext are never logged

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod address;
pub mod certificate;
pub mod cipher;
pub mod env;
pub mod error;
pub mod session;
pub mod validator;

#[cfg(test)]
mod test_support;

pub use address::{LocalIdentity, ProtocolAddress, SenderIdentity, SenderName};
pub use certificate::{SenderCertificate, ServerCertificate};
pub use cipher::{
    DecryptedMessage, DecryptionOutcome, OpenedMessage, SecretSessionCipher, open_message,
    seal_message,
};
pub use env::{Environment, SystemEnv};
pub use error::SealedSenderError;
pub use session::{
    CiphertextMessage, CiphertextMessageType, IdentityKeyStore, SessionCipher, SessionError,
};
pub use validator::{CertificateError, CertificateValidator, Signer, TrustConfig};
