//! Fuzz target for the full receive pipeline
//!
//! Mutates a genuine sealed message and hands it to the recipient.
//!
//! # Invariants
//!
//! - NEVER panic on any input
//! - A mutated message either fails or opens to the original plaintext
//! - Certificate checks never pass for a message from an untrusted chain

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use veil_core::DecryptionOutcome;
use veil_harness::{CertificateAuthority, Party, SeededEnv, SenderDetails};

const NOW: u64 = 1_700_000_000_000;

#[derive(Debug, Arbitrary)]
enum Mutation {
    None,
    Flip { index: u16, mask: u8 },
    Truncate { len: u16 },
    Append { bytes: Vec<u8> },
    Replace { bytes: Vec<u8> },
}

#[derive(Debug, Arbitrary)]
struct Input {
    plaintext: Vec<u8>,
    seed: u64,
    mutation: Mutation,
    untrusted_root: bool,
}

fuzz_target!(|input: Input| {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");

    let authority = CertificateAuthority::from_seed([0x10; 32]);
    let server = authority.issue_server(1, [0x20; 32]).expect("server certificate");
    let alice = Party::new(
        &server,
        SenderDetails::e164_only("+14151111111", 1),
        1,
        NOW + 1,
        SeededEnv::new(input.seed, NOW),
    )
    .expect("alice");
    let bob = Party::new(
        &server,
        SenderDetails::e164_only("+14152222222", 1),
        2,
        NOW + 1,
        SeededEnv::new(input.seed ^ 1, NOW),
    )
    .expect("bob");
    alice.introduce(&bob);

    let mut sealed = rt
        .block_on(alice.cipher.encrypt(&bob.address(), &alice.certificate, &input.plaintext))
        .expect("encrypt");

    match &input.mutation {
        Mutation::None => {},
        Mutation::Flip { index, mask } => {
            let index = usize::from(*index) % sealed.len();
            sealed[index] ^= mask;
        },
        Mutation::Truncate { len } => sealed.truncate(usize::from(*len)),
        Mutation::Append { bytes } => sealed.extend_from_slice(bytes),
        Mutation::Replace { bytes } => sealed = bytes.clone(),
    }

    let validator = if input.untrusted_root {
        CertificateAuthority::from_seed([0x99; 32]).validator()
    } else {
        authority.validator()
    };

    let result = rt.block_on(bob.cipher.decrypt(&validator, &sealed, NOW, None));

    match result {
        Ok(DecryptionOutcome::Message(message)) => {
            assert!(!input.untrusted_root, "untrusted chain accepted");
            assert_eq!(message.plaintext, input.plaintext);
        },
        Ok(DecryptionOutcome::SelfSent) => panic!("no local identity was given"),
        Err(_) => {},
    }
});
