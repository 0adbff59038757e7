use crate::config::OAuthConfig;
use crate::domain::token::TokenGrant;
use crate::error::{AuthError, Result};
use reqwest::StatusCode;
use reqwest::header::ACCEPT;

/// Client for the authorization server's token endpoint.
/// One attempt per call; failures carry the upstream status and body.
#[derive(Clone)]
pub struct TokenEndpoint {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl std::fmt::Debug for TokenEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenEndpoint")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .finish_non_exhaustive()
    }
}

impl TokenEndpoint {
    #[must_use]
    pub fn new(http: reqwest::Client, config: &OAuthConfig) -> Self {
        Self {
            http,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
        }
    }

    /// Exchanges an authorization code (`grant_type=authorization_code`).
    ///
    /// # Errors
    /// `AuthError::TokenExchangeFailed` on a non-200 response, `AuthError::MalformedTokenResponse`
    /// on an undecodable body, `AppError::Network` if the server is unreachable.
    #[tracing::instrument(level = "debug", skip_all, err(level = "warn"))]
    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        self.request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
        ])
        .await
    }

    /// Redeems a refresh token (`grant_type=refresh_token`).
    ///
    /// # Errors
    /// Same failure modes as [`Self::exchange_code`].
    #[tracing::instrument(level = "debug", skip_all, err(level = "warn"))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant> {
        self.request(&[
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn request(&self, form: &[(&str, &str)]) -> Result<TokenGrant> {
        let response = self
            .http
            .post(&self.token_url)
            .header(ACCEPT, "application/json")
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(AuthError::TokenExchangeFailed { status: status.as_u16(), body }.into());
        }

        let grant: TokenGrant =
            serde_json::from_str(&body).map_err(|e| AuthError::MalformedTokenResponse(e.to_string()))?;
        grant.validate()?;
        Ok(grant)
    }
}
