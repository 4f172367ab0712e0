//! In-memory session cipher.
//!
//! Stands in for a real double-ratchet implementation. It tracks sessions per
//! address the way a ratchet store would, but it does NOT encrypt: session
//! bodies carry the plaintext. Confidentiality in end-to-end tests comes from
//! the sealed-sender layer alone.
//!
//! # Message Format
//!
//! ```text
//! PreKey:  [registration_id: u32 BE][plaintext]
//! Whisper: [plaintext]
//! ```
//!
//! The first message to an address without an open session is a PreKey
//! message. Receiving a PreKey message opens a session for its sender.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use tracing::debug;
use veil_core::{
    CiphertextMessage, CiphertextMessageType, ProtocolAddress, SessionCipher, SessionError,
};

/// Protocol version reported for every session
pub const SESSION_VERSION: u32 = 3;

#[derive(Debug, Clone, Default)]
struct SessionRecord {
    open: bool,
    remote_registration_id: Option<u32>,
}

#[derive(Default)]
struct MemoryState {
    sessions: HashMap<ProtocolAddress, SessionRecord>,
    decrypt_calls: Vec<(ProtocolAddress, CiphertextMessageType)>,
    fail_next_decrypt: Option<SessionError>,
}

/// Loopback session cipher keyed by remote address.
///
/// Clones share state. All state changes for an address happen under one
/// lock, which gives the per-address serialization [`SessionCipher`]
/// requires.
#[derive(Clone)]
pub struct MemorySessionCipher {
    registration_id: u32,
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySessionCipher {
    /// Create an empty cipher for a device with `registration_id`.
    pub fn new(registration_id: u32) -> Self {
        Self { registration_id, state: Arc::new(Mutex::new(MemoryState::default())) }
    }

    /// Local registration id, sent in PreKey messages.
    pub fn registration_id(&self) -> u32 {
        self.registration_id
    }

    /// Returns true if an open session exists for `address`.
    pub fn has_open_session(&self, address: &ProtocolAddress) -> bool {
        self.lock().sessions.get(address).is_some_and(|record| record.open)
    }

    /// Every decrypt call made so far, in order.
    pub fn decrypt_calls(&self) -> Vec<(ProtocolAddress, CiphertextMessageType)> {
        self.lock().decrypt_calls.clone()
    }

    /// Make the next decrypt call fail with `error`.
    pub fn fail_next_decrypt(&self, error: SessionError) {
        self.lock().fail_next_decrypt = Some(error);
    }

    /// # Panics
    ///
    /// Panics if the mutex is poisoned. Acceptable for test code.
    #[allow(clippy::expect_used)]
    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().expect("Mutex poisoned")
    }

    fn begin_decrypt(
        state: &mut MemoryState,
        address: &ProtocolAddress,
        message_type: CiphertextMessageType,
    ) -> Result<(), SessionError> {
        state.decrypt_calls.push((address.clone(), message_type));
        match state.fail_next_decrypt.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SessionCipher for MemorySessionCipher {
    async fn encrypt(
        &self,
        address: &ProtocolAddress,
        plaintext: &[u8],
    ) -> Result<CiphertextMessage, SessionError> {
        let mut state = self.lock();
        let record = state.sessions.entry(address.clone()).or_default();

        if record.open {
            return Ok(CiphertextMessage {
                message_type: CiphertextMessageType::Whisper,
                body: plaintext.to_vec(),
            });
        }

        record.open = true;
        debug!(%address, "starting session");

        let mut body = Vec::with_capacity(4 + plaintext.len());
        body.extend_from_slice(&self.registration_id.to_be_bytes());
        body.extend_from_slice(plaintext);
        Ok(CiphertextMessage { message_type: CiphertextMessageType::PreKey, body })
    }

    async fn decrypt_whisper(
        &self,
        address: &ProtocolAddress,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, SessionError> {
        let mut state = self.lock();
        Self::begin_decrypt(&mut state, address, CiphertextMessageType::Whisper)?;

        if !state.sessions.contains_key(address) {
            return Err(SessionError::NoSession { address: address.clone() });
        }
        Ok(ciphertext.to_vec())
    }

    async fn decrypt_prekey(
        &self,
        address: &ProtocolAddress,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, SessionError> {
        let mut state = self.lock();
        Self::begin_decrypt(&mut state, address, CiphertextMessageType::PreKey)?;

        let Some((registration_id, plaintext)) = ciphertext.split_first_chunk::<4>() else {
            return Err(SessionError::InvalidMessage {
                reason: "prekey message shorter than its header".to_string(),
            });
        };

        debug!(%address, "session established by prekey message");
        state.sessions.insert(
            address.clone(),
            SessionRecord {
                open: true,
                remote_registration_id: Some(u32::from_be_bytes(*registration_id)),
            },
        );
        Ok(plaintext.to_vec())
    }

    async fn session_version(&self, address: &ProtocolAddress) -> Result<u32, SessionError> {
        if self.lock().sessions.contains_key(address) {
            Ok(SESSION_VERSION)
        } else {
            Err(SessionError::NoSession { address: address.clone() })
        }
    }

    async fn remote_registration_id(
        &self,
        address: &ProtocolAddress,
    ) -> Result<u32, SessionError> {
        self.lock()
            .sessions
            .get(address)
            .and_then(|record| record.remote_registration_id)
            .ok_or_else(|| SessionError::NoSession { address: address.clone() })
    }

    async fn close_open_session(&self, address: &ProtocolAddress) -> Result<(), SessionError> {
        if let Some(record) = self.lock().sessions.get_mut(address) {
            record.open = false;
        }
        Ok(())
    }
}
