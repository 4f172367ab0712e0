//! In-memory identity key store.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use veil_core::{IdentityKeyStore, SessionError};
use veil_crypto::{KeyPair, PublicKey};

/// Identity store holding the local key pair and remote keys by name.
///
/// Clones share the remote key map.
#[derive(Clone)]
pub struct MemoryIdentityStore {
    local: Option<KeyPair>,
    remotes: Arc<Mutex<HashMap<String, PublicKey>>>,
}

impl MemoryIdentityStore {
    /// Store for a device owning `local`.
    pub fn new(local: KeyPair) -> Self {
        Self { local: Some(local), remotes: Arc::default() }
    }

    /// Store for a device that has not generated an identity yet.
    pub fn without_identity() -> Self {
        Self { local: None, remotes: Arc::default() }
    }

    /// Remember the identity key of account `name`.
    pub fn save_identity(&self, name: &str, key: PublicKey) {
        self.lock().insert(name.to_string(), key);
    }

    /// # Panics
    ///
    /// Panics if the mutex is poisoned. Acceptable for test code.
    #[allow(clippy::expect_used)]
    fn lock(&self) -> MutexGuard<'_, HashMap<String, PublicKey>> {
        self.remotes.lock().expect("Mutex poisoned")
    }
}

#[async_trait]
impl IdentityKeyStore for MemoryIdentityStore {
    async fn identity_key_pair(&self) -> Result<Option<KeyPair>, SessionError> {
        Ok(self.local.clone())
    }

    async fn identity(&self, name: &str) -> Result<Option<PublicKey>, SessionError> {
        Ok(self.lock().get(name).copied())
    }
}
