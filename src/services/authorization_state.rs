use crate::domain::authorization::PendingAuthorization;
use crate::error::AuthError;
use base64::Engine;
use dashmap::DashMap;
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};

/// Server-side registry of anti-forgery `state` nonces, one per pending authorization flow.
/// Entries are keyed by the SHA-256 of the nonce and can be consumed once.
#[derive(Clone, Debug)]
pub struct AuthorizationStateStore {
    pending: Arc<DashMap<String, PendingAuthorization>>,
    ttl: Duration,
}

impl AuthorizationStateStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { pending: Arc::new(DashMap::new()), ttl }
    }

    /// Starts a flow for `user_id` and returns the nonce to send as `state`.
    pub fn begin(&self, user_id: &str) -> String {
        self.purge_expired();

        let nonce = generate_nonce();
        let pending = PendingAuthorization {
            user_id: user_id.to_string(),
            expires_at: OffsetDateTime::now_utc() + self.ttl,
        };
        self.pending.insert(hash_nonce(&nonce), pending);
        nonce
    }

    /// Consumes a nonce and returns the user the flow was started for.
    ///
    /// # Errors
    /// Returns `AuthError::InvalidState` if the nonce is unknown, already used, or expired.
    pub fn consume(&self, nonce: &str) -> Result<String, AuthError> {
        let (_, pending) = self.pending.remove(&hash_nonce(nonce)).ok_or(AuthError::InvalidState)?;

        if pending.is_expired_at(OffsetDateTime::now_utc()) {
            tracing::debug!(user_id = %pending.user_id, "Authorization state expired");
            return Err(AuthError::InvalidState);
        }
        Ok(pending.user_id)
    }

    pub fn purge_expired(&self) {
        let now = OffsetDateTime::now_utc();
        self.pending.retain(|_, pending| !pending.is_expired_at(now));
    }

    #[cfg(test)]
    fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

/// 32 random bytes, URL-safe base64 without padding.
fn generate_nonce() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn hash_nonce(nonce: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(nonce.as_bytes());
    hex::encode(hasher.finalize())
}
