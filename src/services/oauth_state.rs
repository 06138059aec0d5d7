// SPDX-License-Identifier: MIT

//! Server-side OAuth state storage for CSRF protection.
//!
//! A state value is issued per login attempt and consumed exactly once on
//! callback. Unknown, reused, or expired states are hard rejections.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::AppError;

/// How long an issued state stays valid.
const STATE_TTL_MINUTES: i64 = 10;

/// Random bytes per state value (URL-safe base64 encoded).
const STATE_BYTES: usize = 16;

/// In-memory one-time store of pending OAuth states.
///
/// Shared across requests within the instance; entries are pruned on every
/// issue so abandoned login attempts do not accumulate.
pub struct StateStore {
    states: DashMap<String, DateTime<Utc>>,
    rng: SystemRandom,
    ttl: Duration,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            states: DashMap::new(),
            rng: SystemRandom::new(),
            ttl: Duration::minutes(STATE_TTL_MINUTES),
        }
    }

    /// Generate and remember a fresh state value.
    pub fn issue(&self) -> Result<String, AppError> {
        self.prune();

        let mut bytes = [0u8; STATE_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("RNG failure generating state")))?;

        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
        let state = URL_SAFE_NO_PAD.encode(bytes);

        self.states.insert(state.clone(), Utc::now() + self.ttl);
        Ok(state)
    }

    /// Consume a state value. Returns `true` only for a state this process
    /// issued that has not been used and has not expired.
    pub fn consume(&self, state: &str) -> bool {
        match self.states.remove(state) {
            Some((_, expires_at)) => Utc::now() < expires_at,
            None => false,
        }
    }

    /// Drop expired entries.
    fn prune(&self) {
        let now = Utc::now();
        self.states.retain(|_, expires_at| now < *expires_at);
    }

    /// Number of pending states (for tests).
    pub fn pending(&self) -> usize {
        self.states.len()
    }
}
