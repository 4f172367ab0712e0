//! Fuzz target for CBOR deserialization attacks
//!
//! # Strategy
//!
//! - Deeply nested: arrays/maps nested to arbitrary depth (stack overflow)
//! - Huge lengths: byte strings claiming massive lengths (memory)
//! - Duplicate keys: envelope maps repeating a field
//! - Wrong types: text strings or integers where byte strings belong
//!
//! # Invariants
//!
//! - Decoding completes quickly and never allocates the claimed length
//! - Duplicate fields are rejected
//! - NEVER panic on malformed CBOR

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use veil_proto::{
    SealedSenderMessage, SenderCertificateBody, SignedCertificate,
    UnidentifiedSenderMessageContent,
};

const VERSION_BYTE: u8 = 0x11;

#[derive(Debug, Clone, Arbitrary)]
enum CborAttack {
    DeeplyNested { depth: u8, map: bool },
    HugeLength { field: Field, claimed_len_exponent: u8 },
    DuplicateKeys { field: Field, count: u8 },
    WrongType { field: Field, text: bool, value: Vec<u8> },
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Field {
    EphemeralPublic,
    EncryptedStatic,
    EncryptedMessage,
}

impl Field {
    fn name(self) -> &'static [u8] {
        match self {
            Self::EphemeralPublic => b"ephemeral_public",
            Self::EncryptedStatic => b"encrypted_static",
            Self::EncryptedMessage => b"encrypted_message",
        }
    }
}

fuzz_target!(|attack: CborAttack| {
    let body = match attack {
        CborAttack::DeeplyNested { depth, map } => create_nested_cbor(usize::from(depth), map),

        CborAttack::HugeLength { field, claimed_len_exponent } => {
            let exponent = u32::from(claimed_len_exponent % 33);
            let claimed = if exponent < 32 { 1u32 << exponent } else { u32::MAX };

            let mut bytes = vec![0xA1];
            push_text(&mut bytes, field.name());
            bytes.push(0x5A);
            bytes.extend_from_slice(&claimed.to_be_bytes());
            bytes.extend(vec![0xAA; (claimed as usize).min(10)]);
            bytes
        },

        CborAttack::DuplicateKeys { field, count } => {
            let count = (count % 10).max(2);
            let mut bytes = vec![0xA0 | count];
            for _ in 0..count {
                push_text(&mut bytes, field.name());
                bytes.extend_from_slice(&[0x41, 0x00]);
            }

            let mut message = vec![VERSION_BYTE];
            message.extend_from_slice(&bytes);
            assert!(SealedSenderMessage::decode(&message).is_err());
            bytes
        },

        CborAttack::WrongType { field, text, value } => {
            let mut bytes = vec![0xA1];
            push_text(&mut bytes, field.name());
            if text {
                let value = &value[..value.len().min(23)];
                push_text(&mut bytes, value);
            } else {
                bytes.push(0x1A);
                let mut word = [0u8; 4];
                for (slot, byte) in word.iter_mut().zip(&value) {
                    *slot = *byte;
                }
                bytes.extend_from_slice(&word);
            }
            bytes
        },
    };

    let mut message = vec![VERSION_BYTE];
    message.extend_from_slice(&body);

    let _ = SealedSenderMessage::decode(&message);
    let _ = UnidentifiedSenderMessageContent::decode(&body);
    let _ = SignedCertificate::decode(&body);
    let _ = SenderCertificateBody::decode(&body);
});

fn push_text(bytes: &mut Vec<u8>, text: &[u8]) {
    // Short text header; every caller stays under 24 bytes
    bytes.push(0x60 | text.len() as u8);
    bytes.extend_from_slice(text);
}

fn create_nested_cbor(depth: usize, map: bool) -> Vec<u8> {
    let mut bytes = Vec::new();
    for _ in 0..depth {
        if map {
            bytes.extend_from_slice(&[0xA1, 0x61, b'a']);
        } else {
            bytes.push(0x81);
        }
    }
    bytes.push(0x01);
    bytes
}
