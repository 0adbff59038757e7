use crate::adapters::converty::TokenEndpoint;
use crate::config::OAuthConfig;
use crate::domain::authorization::AuthorizationRequest;
use crate::domain::token::{TokenRecord, TokenState};
use crate::error::{AppError, AuthError, Result};
use crate::services::authorization_state::AuthorizationStateStore;
use crate::services::stores::TokenStore;
use dashmap::DashMap;
use opentelemetry::{global, metrics::Counter};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;

#[derive(Clone, Debug)]
struct Metrics {
    exchange_total: Counter<u64>,
    refresh_total: Counter<u64>,
    refresh_failures_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("converty-bridge");
        Self {
            exchange_total: meter
                .u64_counter("oauth_code_exchange_total")
                .with_description("Total number of successful authorization code exchanges")
                .build(),
            refresh_total: meter
                .u64_counter("oauth_refresh_total")
                .with_description("Total number of successful token refreshes")
                .build(),
            refresh_failures_total: meter
                .u64_counter("oauth_refresh_failures_total")
                .with_description("Total number of refresh attempts rejected by the token endpoint")
                .build(),
        }
    }
}

/// Owns the OAuth2 token lifecycle: authorization, code exchange, expiry and refresh.
///
/// Refreshes for one user are serialized; a caller that waited for the lock sees the
/// record the previous holder stored and skips its own upstream call when that record
/// already satisfies it.
#[derive(Clone, Debug)]
pub struct TokenService {
    store: Arc<dyn TokenStore>,
    endpoint: TokenEndpoint,
    states: AuthorizationStateStore,
    refresh_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    authorize_url: String,
    client_id: String,
    redirect_uri: String,
    scope: String,
    default_user_id: String,
    refresh_ttl_secs: Option<i64>,
    metrics: Metrics,
}

impl TokenService {
    #[must_use]
    pub fn new(config: &OAuthConfig, http: reqwest::Client, store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            endpoint: TokenEndpoint::new(http, config),
            states: AuthorizationStateStore::new(Duration::seconds(config.state_ttl_secs)),
            refresh_locks: Arc::new(DashMap::new()),
            authorize_url: config.authorize_url.clone(),
            client_id: config.client_id.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scope: config.scope.clone(),
            default_user_id: config.default_user_id.clone(),
            refresh_ttl_secs: config.refresh_token_ttl_secs,
            metrics: Metrics::new(),
        }
    }

    #[must_use]
    pub fn default_user_id(&self) -> &str {
        &self.default_user_id
    }

    /// Registers a pending flow and builds the authorization server redirect for it.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if the configured authorize URL is not a valid URL.
    #[tracing::instrument(skip(self), err)]
    pub fn begin_authorization(&self, user_id: Option<&str>) -> Result<AuthorizationRequest> {
        let user_id = user_id.filter(|id| !id.is_empty()).unwrap_or(&self.default_user_id);
        let state = self.states.begin(user_id);

        let url = reqwest::Url::parse_with_params(
            &self.authorize_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", self.scope.as_str()),
                ("state", state.as_str()),
            ],
        )
        .map_err(|e| {
            tracing::error!(error = %e, "Configured authorize URL is invalid");
            AppError::Internal
        })?;

        Ok(AuthorizationRequest { url: url.into(), state })
    }

    /// Completes the authorization-code flow and stores the issued tokens.
    ///
    /// The state is checked before the code and both before any network call.
    ///
    /// # Errors
    /// `InvalidState` for a missing, unknown, reused or expired state; `MissingCode` for an
    /// empty code; token endpoint and store failures otherwise.
    #[tracing::instrument(skip_all, fields(user_id = tracing::field::Empty), err(level = "warn"))]
    pub async fn exchange_code(&self, code: Option<&str>, state: Option<&str>) -> Result<TokenRecord> {
        let state = state.filter(|s| !s.is_empty()).ok_or(AuthError::InvalidState)?;
        let user_id = self.states.consume(state)?;
        tracing::Span::current().record("user_id", tracing::field::display(&user_id));

        let code = code.filter(|c| !c.is_empty()).ok_or(AuthError::MissingCode)?;

        let grant = self.endpoint.exchange_code(code).await?;
        let record = TokenRecord::issue(&user_id, grant, OffsetDateTime::now_utc(), self.refresh_ttl_secs)?;
        self.store.upsert(&record).await?;

        self.metrics.exchange_total.add(1, &[]);
        tracing::info!(expires_at = %record.expires_at, "Authorization code exchanged");
        Ok(record)
    }

    /// Returns a usable access token, refreshing it first when it has expired.
    ///
    /// # Errors
    /// `NoTokenFound` if the user never authorized; refresh failures when the token is stale.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn get_valid_access_token(&self, user_id: &str) -> Result<String> {
        let record = self.store.get(user_id).await?.ok_or(AuthError::NoTokenFound)?;
        if record.state_at(OffsetDateTime::now_utc()) == TokenState::Valid {
            return Ok(record.access_token);
        }

        tracing::debug!(expired_at = %record.expires_at, "Access token expired, refreshing");
        let record = self
            .refresh_with(user_id, |current| current.state_at(OffsetDateTime::now_utc()) != TokenState::Valid)
            .await?;
        Ok(record.access_token)
    }

    /// Redeems the stored refresh token unconditionally.
    ///
    /// # Errors
    /// `NoTokenFound`, `NoRefreshToken` or `RefreshTokenExpired` before any upstream call;
    /// token endpoint and store failures otherwise.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn refresh_token(&self, user_id: &str) -> Result<TokenRecord> {
        self.refresh_with(user_id, |_| true).await
    }

    /// Refreshes after the partner API rejected `rejected_access_token`, unless a
    /// concurrent caller already replaced it.
    ///
    /// # Errors
    /// Same failure modes as [`Self::refresh_token`].
    #[tracing::instrument(skip(self, rejected_access_token), err(level = "warn"))]
    pub async fn force_refresh(&self, user_id: &str, rejected_access_token: &str) -> Result<String> {
        let record = self.refresh_with(user_id, |current| current.access_token == rejected_access_token).await?;
        Ok(record.access_token)
    }

    fn refresh_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.refresh_locks.entry(user_id.to_string()).or_default().value().clone()
    }

    async fn refresh_with<F>(&self, user_id: &str, needs_refresh: F) -> Result<TokenRecord>
    where
        F: FnOnce(&TokenRecord) -> bool + Send,
    {
        let lock = self.refresh_lock(user_id);
        let _guard = lock.lock().await;

        let current = self.store.get(user_id).await?.ok_or(AuthError::NoTokenFound)?;
        if !needs_refresh(&current) {
            tracing::debug!("Token already renewed by a concurrent caller");
            return Ok(current);
        }

        self.renew(&current).await
    }

    async fn renew(&self, current: &TokenRecord) -> Result<TokenRecord> {
        if current.refresh_token.is_empty() {
            return Err(AuthError::NoRefreshToken.into());
        }
        if current.refresh_expired_at(OffsetDateTime::now_utc()) {
            return Err(AuthError::RefreshTokenExpired { expired_at: current.refresh_expires_at }.into());
        }

        let grant = self
            .endpoint
            .refresh(&current.refresh_token)
            .await
            .inspect_err(|_| self.metrics.refresh_failures_total.add(1, &[]))?;

        let rotated = grant.refresh_token.is_some();
        let renewed = current.renewed(grant, OffsetDateTime::now_utc(), self.refresh_ttl_secs)?;

        if rotated {
            self.store.upsert(&renewed).await?;
        } else {
            self.store.update_fields(&renewed.user_id, &renewed.changes_since(current)).await?;
        }

        self.metrics.refresh_total.add(1, &[]);
        tracing::info!(rotated, expires_at = %renewed.expires_at, "Access token refreshed");
        Ok(renewed)
    }
}
