//! Property-based tests for the wire format
//!
//! Round trips must be exact for every input, and decoders must never panic
//! on arbitrary bytes.

use proptest::prelude::*;
use veil_proto::{
    CIPHERTEXT_VERSION, ContentType, ProtocolError, SealedSenderMessage, SenderCertificateBody,
    SignedCertificate, UnidentifiedSenderMessageContent,
};

fn blob(max: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..max)
}

fn arbitrary_content_type() -> impl Strategy<Value = ContentType> {
    prop_oneof![Just(ContentType::PreKeyMessage), Just(ContentType::Message)]
}

fn arbitrary_sender() -> impl Strategy<Value = (Option<String>, Option<String>)> {
    prop_oneof![
        "\\+[0-9]{6,14}".prop_map(|e164| (Some(e164), None)),
        "[0-9a-f]{8}-[0-9a-f]{4}".prop_map(|uuid| (None, Some(uuid))),
        ("\\+[0-9]{6,14}", "[0-9a-f]{8}-[0-9a-f]{4}")
            .prop_map(|(e164, uuid)| (Some(e164), Some(uuid))),
    ]
}

proptest! {
    #[test]
    fn envelope_round_trip(
        ephemeral_public in blob(64),
        encrypted_static in blob(128),
        encrypted_message in blob(2048),
    ) {
        let message =
            SealedSenderMessage::new(ephemeral_public, encrypted_static, encrypted_message);
        let bytes = message.encode().unwrap();

        prop_assert_eq!(bytes[0] >> 4, CIPHERTEXT_VERSION);
        prop_assert_eq!(SealedSenderMessage::decode(&bytes).unwrap(), message);
    }

    #[test]
    fn content_round_trip(
        content_type in arbitrary_content_type(),
        sender_certificate in blob(512),
        content in blob(2048),
    ) {
        let inner =
            UnidentifiedSenderMessageContent::new(content_type, sender_certificate, content);
        let decoded = UnidentifiedSenderMessageContent::decode(&inner.encode().unwrap()).unwrap();
        prop_assert_eq!(decoded, inner);
    }

    #[test]
    fn sender_certificate_round_trip(
        (sender_e164, sender_uuid) in arbitrary_sender(),
        sender_device in 1u32..,
        expires in any::<u64>(),
        identity_key in blob(40),
        signer in blob(256),
    ) {
        let body = SenderCertificateBody {
            sender_e164,
            sender_uuid,
            sender_device,
            expires,
            identity_key,
            signer,
        };
        prop_assert_eq!(SenderCertificateBody::decode(&body.encode().unwrap()).unwrap(), body);
    }

    #[test]
    fn unsupported_high_nibble_rejected(high in 2u8..16, low in 0u8..16, body in blob(64)) {
        let mut bytes = vec![(high << 4) | low];
        bytes.extend_from_slice(&body);

        prop_assert_eq!(
            SealedSenderMessage::decode(&bytes),
            Err(ProtocolError::UnsupportedVersion(high))
        );
    }

    #[test]
    fn decoders_never_panic(bytes in blob(1024)) {
        let _ = SealedSenderMessage::decode(&bytes);
        let _ = UnidentifiedSenderMessageContent::decode(&bytes);
        let _ = SignedCertificate::decode(&bytes);
        let _ = SenderCertificateBody::decode(&bytes);
    }
}

#[test]
fn known_envelope_encoding() {
    let message = SealedSenderMessage::new(vec![0x05], vec![0xAA], vec![0xBB]);
    let bytes = message.encode().unwrap();

    // version byte, then map(3) with text keys and single-byte byte strings
    assert_eq!(bytes[0], 0x11);
    assert_eq!(bytes[1], 0xA3);
    assert!(hex::encode(&bytes).contains(&hex::encode(b"ephemeral_public")));
    assert!(hex::encode(&bytes).ends_with("41bb"));
}
