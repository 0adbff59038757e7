use crate::error::Result;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode};

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Authenticated requests against the partner REST API.
/// Neither retries nor refreshes; callers hand in a token they know to be valid.
#[derive(Clone, Debug)]
pub struct PartnerApi {
    http: reqwest::Client,
    base_url: String,
}

impl PartnerApi {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self { http, base_url: base_url.trim_end_matches('/').to_string() }
    }

    /// Issues one request and returns the status and body as received.
    ///
    /// # Errors
    /// Returns `AppError::Network` if the request cannot be sent or the body cannot be read.
    #[tracing::instrument(level = "debug", skip(self, access_token), err(level = "warn"))]
    pub async fn call_raw(&self, method: Method, path: &str, access_token: &str) -> Result<RawResponse> {
        self.send(method, path, access_token, &[]).await
    }

    /// Same as [`Self::call_raw`] for a GET with query parameters.
    ///
    /// # Errors
    /// Returns `AppError::Network` if the request cannot be sent or the body cannot be read.
    #[tracing::instrument(level = "debug", skip(self, access_token, params), err(level = "warn"))]
    pub async fn get(&self, path: &str, access_token: &str, params: &[(&str, String)]) -> Result<RawResponse> {
        self.send(Method::GET, path, access_token, params).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        access_token: &str,
        params: &[(&str, String)],
    ) -> Result<RawResponse> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .header(ACCEPT, "application/json");
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = status.as_u16(), "Partner API responded");
        Ok(RawResponse { status, body })
    }
}
