//! Seeded environment for reproducible runs.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use veil_core::Environment;

/// Environment with a seeded ChaCha20 RNG and a manually driven clock.
///
/// Clones share the RNG stream and the clock.
#[derive(Clone)]
pub struct SeededEnv {
    rng: Arc<Mutex<ChaCha20Rng>>,
    clock: Arc<AtomicU64>,
}

impl SeededEnv {
    /// Create an environment from `seed` with the clock at `now_millis`.
    pub fn new(seed: u64, now_millis: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed))),
            clock: Arc::new(AtomicU64::new(now_millis)),
        }
    }

    /// Move the clock forward.
    pub fn advance_millis(&self, millis: u64) {
        self.clock.fetch_add(millis, Ordering::SeqCst);
    }

    /// Set the clock to an absolute time.
    pub fn set_millis(&self, now_millis: u64) {
        self.clock.store(now_millis, Ordering::SeqCst);
    }
}

impl Environment for SeededEnv {
    /// # Panics
    ///
    /// Panics if the RNG mutex is poisoned. Acceptable for test code.
    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        self.rng.lock().expect("Mutex poisoned").fill_bytes(buffer);
    }

    fn wall_clock_millis(&self) -> u64 {
        self.clock.load(Ordering::SeqCst)
    }
}
