//! Veil Wire Format
//!
//! Message framing for sealed-sender delivery. Three layers travel on the
//! wire:
//!
//! - [`SealedSenderMessage`]: the outer envelope the server relays. A version
//!   byte followed by a CBOR map of three opaque blobs.
//! - [`UnidentifiedSenderMessageContent`]: recovered by the recipient after
//!   removing the outer layer. Names the session-cipher message kind and
//!   carries the sender certificate.
//! - Certificates ([`SignedCertificate`] and its bodies): the chain that
//!   authenticates the sender.
//!
//! This crate does no cryptography. It turns bytes into typed values and back,
//! and rejects anything that is structurally wrong.
//!
//! # Decoding Rules
//!
//! - Inputs over [`MAX_MESSAGE_SIZE`] are rejected before parsing
//! - Exactly one CBOR item per input, trailing bytes are an error
//! - Required fields are checked explicitly so errors name the field

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod certificate;
mod codec;
pub mod content;
pub mod envelope;
pub mod errors;

pub use certificate::{SenderCertificateBody, ServerCertificateBody, SignedCertificate};
pub use codec::MAX_MESSAGE_SIZE;
pub use content::{ContentType, UnidentifiedSenderMessageContent};
pub use envelope::{CIPHERTEXT_VERSION, SealedSenderMessage};
pub use errors::{ProtocolError, Result};
