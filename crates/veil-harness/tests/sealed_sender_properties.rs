//! Property tests over complete sealed-sender exchanges.

use proptest::{collection::vec, prelude::*, sample::Index};
use tokio::runtime::Runtime;
use veil_core::DecryptionOutcome;
use veil_harness::{CertificateAuthority, Party, SeededEnv, SenderDetails};

const NOW: u64 = 1_700_000_000_000;
const EXPIRES: u64 = NOW + 60_000;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread().build().unwrap()
}

struct Pair {
    authority: CertificateAuthority,
    alice: Party,
    bob: Party,
}

fn pair(seed: u64) -> Pair {
    let authority = CertificateAuthority::from_seed([0x10; 32]);
    let server = authority.issue_server(1, [0x20; 32]).unwrap();

    let alice = Party::new(
        &server,
        SenderDetails::uuid_only("a5b0c1d2-0000-4000-8000-000000000001", 1),
        1,
        EXPIRES,
        SeededEnv::new(seed, NOW),
    )
    .unwrap();
    let bob = Party::new(
        &server,
        SenderDetails::e164_only("+14152222222", 1),
        2,
        EXPIRES,
        SeededEnv::new(seed.wrapping_add(1), NOW),
    )
    .unwrap();

    alice.introduce(&bob);
    bob.introduce(&alice);

    Pair { authority, alice, bob }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_plaintext_round_trips(plaintext in vec(any::<u8>(), 0..2048), seed in any::<u64>()) {
        let rt = runtime();
        let Pair { authority, alice, bob } = pair(seed);

        let outcome = rt.block_on(async {
            let sealed =
                alice.cipher.encrypt(&bob.address(), &alice.certificate, &plaintext).await?;
            bob.cipher.decrypt(&authority.validator(), &sealed, NOW, None).await
        });

        match outcome {
            Ok(DecryptionOutcome::Message(message)) => {
                prop_assert_eq!(message.plaintext, plaintext);
                prop_assert_eq!(message.sender.session_address(), alice.address());
            },
            other => prop_assert!(false, "unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn corruption_never_yields_altered_plaintext(
        plaintext in vec(any::<u8>(), 1..256),
        position in any::<Index>(),
        xor in 1u8..=255,
    ) {
        let rt = runtime();
        let Pair { authority, alice, bob } = pair(7);

        let mut sealed = rt
            .block_on(alice.cipher.encrypt(&bob.address(), &alice.certificate, &plaintext))
            .unwrap();
        let index = position.index(sealed.len());
        sealed[index] ^= xor;

        let result = rt.block_on(bob.cipher.decrypt(&authority.validator(), &sealed, NOW, None));

        // Some corruptions leave the authenticated payload intact, such as the
        // low nibble of the version byte. Those must still open unchanged.
        if let Ok(outcome) = result {
            prop_assert_eq!(
                outcome,
                DecryptionOutcome::Message(veil_core::DecryptedMessage {
                    sender: alice.certificate.sender().clone(),
                    plaintext,
                })
            );
        }
    }
}
