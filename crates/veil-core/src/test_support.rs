//! Fixtures shared by unit tests in this crate.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use veil_crypto::{KeyPair, PublicKey};
use veil_proto::{SenderCertificateBody, ServerCertificateBody, SignedCertificate};

use crate::{
    address::ProtocolAddress,
    certificate::SenderCertificate,
    env::Environment,
    session::{
        CiphertextMessage, CiphertextMessageType, IdentityKeyStore, SessionCipher, SessionError,
    },
    validator::TrustConfig,
};

/// Trust root, one server certificate and one sender identity.
pub struct Fixture {
    pub trust_root: SigningKey,
    pub server_key: SigningKey,
    pub server_id: u32,
    pub sender_identity: KeyPair,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            trust_root: SigningKey::from_bytes(&[0x01; 32]),
            server_key: SigningKey::from_bytes(&[0x02; 32]),
            server_id: 1337,
            sender_identity: KeyPair::from_random([0x03; 32]),
        }
    }

    pub fn trust_config(&self) -> TrustConfig {
        TrustConfig::new(self.trust_root.verifying_key())
    }

    pub fn server_certificate_bytes(&self) -> Vec<u8> {
        let certificate = ServerCertificateBody {
            id: self.server_id,
            key: self.server_key.verifying_key().to_bytes().to_vec(),
        }
        .encode()
        .unwrap();
        let signature = self.trust_root.sign(&certificate).to_bytes().to_vec();

        SignedCertificate { certificate, signature }.encode().unwrap()
    }

    pub fn sender_body(
        &self,
        e164: Option<&str>,
        uuid: Option<&str>,
        device: u32,
        expires: u64,
    ) -> SenderCertificateBody {
        SenderCertificateBody {
            sender_e164: e164.map(str::to_string),
            sender_uuid: uuid.map(str::to_string),
            sender_device: device,
            expires,
            identity_key: self.sender_identity.public_key().serialize().to_vec(),
            signer: self.server_certificate_bytes(),
        }
    }

    pub fn issue_bytes(&self, body: SenderCertificateBody) -> Vec<u8> {
        let certificate = body.encode().unwrap();
        let signature = self.server_key.sign(&certificate).to_bytes().to_vec();

        SignedCertificate { certificate, signature }.encode().unwrap()
    }

    pub fn issue(&self, body: SenderCertificateBody) -> SenderCertificate {
        SenderCertificate::deserialize(&self.issue_bytes(body)).unwrap()
    }
}

#[derive(Default)]
struct LoopbackState {
    decrypted: Vec<(ProtocolAddress, CiphertextMessageType)>,
    failure: Option<SessionError>,
}

/// Session cipher that passes plaintext through unchanged.
#[derive(Default)]
pub struct LoopbackSessions {
    state: Mutex<LoopbackState>,
}

impl LoopbackSessions {
    pub fn fail_with(&self, error: SessionError) {
        self.state.lock().unwrap().failure = Some(error);
    }

    pub fn decrypted_from(&self) -> Vec<(ProtocolAddress, CiphertextMessageType)> {
        self.state.lock().unwrap().decrypted.clone()
    }

    fn record(
        &self,
        address: &ProtocolAddress,
        message_type: CiphertextMessageType,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, SessionError> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.failure.clone() {
            return Err(error);
        }
        state.decrypted.push((address.clone(), message_type));
        Ok(ciphertext.to_vec())
    }
}

#[async_trait]
impl SessionCipher for LoopbackSessions {
    async fn encrypt(
        &self,
        _address: &ProtocolAddress,
        plaintext: &[u8],
    ) -> Result<CiphertextMessage, SessionError> {
        if let Some(error) = self.state.lock().unwrap().failure.clone() {
            return Err(error);
        }
        Ok(CiphertextMessage {
            message_type: CiphertextMessageType::Whisper,
            body: plaintext.to_vec(),
        })
    }

    async fn decrypt_whisper(
        &self,
        address: &ProtocolAddress,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, SessionError> {
        self.record(address, CiphertextMessageType::Whisper, ciphertext)
    }

    async fn decrypt_prekey(
        &self,
        address: &ProtocolAddress,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, SessionError> {
        self.record(address, CiphertextMessageType::PreKey, ciphertext)
    }

    async fn session_version(&self, _address: &ProtocolAddress) -> Result<u32, SessionError> {
        Ok(3)
    }

    async fn remote_registration_id(
        &self,
        _address: &ProtocolAddress,
    ) -> Result<u32, SessionError> {
        Ok(42)
    }

    async fn close_open_session(&self, _address: &ProtocolAddress) -> Result<(), SessionError> {
        Ok(())
    }
}

/// Identity store with a fixed local key and a fixed set of remotes.
pub struct StaticIdentities {
    local: KeyPair,
    remotes: HashMap<String, PublicKey>,
}

impl StaticIdentities {
    pub fn new(local: KeyPair) -> Self {
        Self { local, remotes: HashMap::new() }
    }

    pub fn with_remote(mut self, name: &str, key: PublicKey) -> Self {
        self.remotes.insert(name.to_string(), key);
        self
    }
}

#[async_trait]
impl IdentityKeyStore for StaticIdentities {
    async fn identity_key_pair(&self) -> Result<Option<KeyPair>, SessionError> {
        Ok(Some(self.local.clone()))
    }

    async fn identity(&self, name: &str) -> Result<Option<PublicKey>, SessionError> {
        Ok(self.remotes.get(name).copied())
    }
}

/// Environment with a frozen clock and constant randomness.
#[derive(Clone)]
pub struct FixedEnv {
    now: u64,
}

impl FixedEnv {
    pub fn new(now: u64) -> Self {
        Self { now }
    }
}

impl Environment for FixedEnv {
    fn random_bytes(&self, buffer: &mut [u8]) {
        buffer.fill(0x5A);
    }

    fn wall_clock_millis(&self) -> u64 {
        self.now
    }
}
