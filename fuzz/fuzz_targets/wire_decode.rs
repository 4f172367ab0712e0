//! Fuzz target for the wire decoders
//!
//! Feeds arbitrary bytes to every structure a recipient parses before or
//! after authentication.
//!
//! # Invariants
//!
//! - NEVER panic, only return `Err` for invalid input
//! - Anything that decodes re-encodes to bytes that decode to the same value

#![no_main]

use libfuzzer_sys::fuzz_target;
use veil_proto::{
    SealedSenderMessage, SenderCertificateBody, ServerCertificateBody, SignedCertificate,
    UnidentifiedSenderMessageContent,
};

fuzz_target!(|data: &[u8]| {
    if let Ok(message) = SealedSenderMessage::decode(data) {
        let encoded = message.encode().expect("decoded message must re-encode");
        assert_eq!(SealedSenderMessage::decode(&encoded).ok(), Some(message));
    }

    if let Ok(content) = UnidentifiedSenderMessageContent::decode(data) {
        let encoded = content.encode().expect("decoded content must re-encode");
        assert_eq!(UnidentifiedSenderMessageContent::decode(&encoded).ok(), Some(content));
    }

    let _ = SignedCertificate::decode(data);
    let _ = ServerCertificateBody::decode(data);
    let _ = SenderCertificateBody::decode(data);
});
