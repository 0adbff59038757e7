use crate::error::AuthError;
use serde::Deserialize;
use time::{Duration, OffsetDateTime};

/// Token pair persisted for one user of the partner platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub issued_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub refresh_issued_at: OffsetDateTime,
    pub refresh_expires_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// The access token can be used as is.
    Valid,
    /// The access token expired but the refresh token can renew it.
    Stale,
    /// Both tokens expired; only a new authorization can recover.
    Expired,
}

/// Token endpoint response for both the `authorization_code` and `refresh_token` grants.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, alias = "refresh_token_expires_in")]
    pub refresh_expires_in: Option<i64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

fn lifetime_end(start: OffsetDateTime, lifetime: Duration) -> Result<OffsetDateTime, AuthError> {
    start
        .checked_add(lifetime)
        .ok_or_else(|| AuthError::MalformedTokenResponse("token lifetime out of range".into()))
}

/// Partial update applied to a stored record; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUpdate {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub issued_at: Option<OffsetDateTime>,
    pub expires_at: Option<OffsetDateTime>,
    pub refresh_issued_at: Option<OffsetDateTime>,
    pub refresh_expires_at: Option<OffsetDateTime>,
}

impl TokenGrant {
    /// Rejects responses that would break the stored record invariants.
    ///
    /// # Errors
    /// Returns `AuthError::MalformedTokenResponse` for empty tokens or a non-positive lifetime.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.access_token.is_empty() {
            return Err(AuthError::MalformedTokenResponse("no access token in response".into()));
        }
        if self.refresh_token.as_deref() == Some("") {
            return Err(AuthError::MalformedTokenResponse("empty refresh token in response".into()));
        }
        if self.expires_in <= 0 {
            return Err(AuthError::MalformedTokenResponse(format!("invalid expires_in {}", self.expires_in)));
        }
        if self.refresh_expires_in.is_some_and(|secs| secs < 0) {
            return Err(AuthError::MalformedTokenResponse("negative refresh token lifetime".into()));
        }
        Ok(())
    }

    /// Lifetime of the refresh token: reported by the server, else configured, else the access token lifetime.
    #[must_use]
    pub fn refresh_lifetime(&self, configured_secs: Option<i64>) -> Duration {
        Duration::seconds(self.refresh_expires_in.or(configured_secs).unwrap_or(self.expires_in))
    }
}

impl TokenRecord {
    /// Builds the record for a fresh authorization-code grant.
    ///
    /// # Errors
    /// Returns `AuthError::MalformedTokenResponse` if the grant carries no refresh token
    /// or a lifetime that does not fit in a timestamp.
    pub fn issue(
        user_id: &str,
        grant: TokenGrant,
        issued_at: OffsetDateTime,
        refresh_ttl_secs: Option<i64>,
    ) -> Result<Self, AuthError> {
        grant.validate()?;
        let refresh_lifetime = grant.refresh_lifetime(refresh_ttl_secs);
        let refresh_token = grant
            .refresh_token
            .ok_or_else(|| AuthError::MalformedTokenResponse("no refresh token in response".into()))?;
        let expires_at = lifetime_end(issued_at, Duration::seconds(grant.expires_in))?;
        let refresh_expires_at = lifetime_end(issued_at, refresh_lifetime)?;

        Ok(Self {
            user_id: user_id.to_string(),
            access_token: grant.access_token,
            refresh_token,
            token_type: grant.token_type,
            expires_in: grant.expires_in,
            issued_at,
            expires_at,
            refresh_issued_at: issued_at,
            refresh_expires_at,
        })
    }

    /// Applies a refresh grant. A rotated refresh token opens a new refresh window;
    /// when the server keeps the old refresh token its window is preserved.
    ///
    /// # Errors
    /// Returns `AuthError::MalformedTokenResponse` if the grant is invalid.
    pub fn renewed(
        &self,
        grant: TokenGrant,
        issued_at: OffsetDateTime,
        refresh_ttl_secs: Option<i64>,
    ) -> Result<Self, AuthError> {
        grant.validate()?;
        let refresh_lifetime = grant.refresh_lifetime(refresh_ttl_secs);
        let expires_at = lifetime_end(issued_at, Duration::seconds(grant.expires_in))?;

        let (refresh_token, refresh_issued_at, refresh_expires_at) = match grant.refresh_token {
            Some(token) => (token, issued_at, lifetime_end(issued_at, refresh_lifetime)?),
            None => (self.refresh_token.clone(), self.refresh_issued_at, self.refresh_expires_at.max(issued_at)),
        };

        Ok(Self {
            user_id: self.user_id.clone(),
            access_token: grant.access_token,
            refresh_token,
            token_type: grant.token_type,
            expires_in: grant.expires_in,
            issued_at,
            expires_at,
            refresh_issued_at,
            refresh_expires_at,
        })
    }

    #[must_use]
    pub fn state_at(&self, now: OffsetDateTime) -> TokenState {
        if now <= self.expires_at {
            TokenState::Valid
        } else if now <= self.refresh_expires_at {
            TokenState::Stale
        } else {
            TokenState::Expired
        }
    }

    #[must_use]
    pub fn refresh_expired_at(&self, now: OffsetDateTime) -> bool {
        now > self.refresh_expires_at
    }

    /// Fields that differ from `previous`, for stores that apply partial updates.
    #[must_use]
    pub fn changes_since(&self, previous: &Self) -> TokenUpdate {
        fn changed<T: PartialEq + Clone>(new: &T, old: &T) -> Option<T> {
            (new != old).then(|| new.clone())
        }

        TokenUpdate {
            access_token: changed(&self.access_token, &previous.access_token),
            refresh_token: changed(&self.refresh_token, &previous.refresh_token),
            token_type: changed(&self.token_type, &previous.token_type),
            expires_in: changed(&self.expires_in, &previous.expires_in),
            issued_at: changed(&self.issued_at, &previous.issued_at),
            expires_at: changed(&self.expires_at, &previous.expires_at),
            refresh_issued_at: changed(&self.refresh_issued_at, &previous.refresh_issued_at),
            refresh_expires_at: changed(&self.refresh_expires_at, &previous.refresh_expires_at),
        }
    }
}

impl TokenUpdate {
    /// Writes every `Some` field into `record`.
    pub fn apply_to(&self, record: &mut TokenRecord) {
        if let Some(v) = &self.access_token {
            record.access_token.clone_from(v);
        }
        if let Some(v) = &self.refresh_token {
            record.refresh_token.clone_from(v);
        }
        if let Some(v) = &self.token_type {
            record.token_type.clone_from(v);
        }
        if let Some(v) = self.expires_in {
            record.expires_in = v;
        }
        if let Some(v) = self.issued_at {
            record.issued_at = v;
        }
        if let Some(v) = self.expires_at {
            record.expires_at = v;
        }
        if let Some(v) = self.refresh_issued_at {
            record.refresh_issued_at = v;
        }
        if let Some(v) = self.refresh_expires_at {
            record.refresh_expires_at = v;
        }
    }
}
