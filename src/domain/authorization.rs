use time::OffsetDateTime;

/// An authorization flow started at `/login` and waiting for its callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAuthorization {
    pub user_id: String,
    pub expires_at: OffsetDateTime,
}

impl PendingAuthorization {
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now > self.expires_at
    }
}

/// Redirect target and state nonce for a new authorization flow.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
}
