//! HTTP adapters for the Converty authorization server and partner API.

pub mod api;
pub mod token_endpoint;

pub use api::{PartnerApi, RawResponse};
pub use token_endpoint::TokenEndpoint;

use crate::config::PartnerConfig;
use std::time::Duration;

/// Builds the shared outbound client. Every request is bounded by the configured timeout.
///
/// # Errors
/// Returns `reqwest::Error` if the TLS backend cannot be initialized.
pub fn http_client(config: &PartnerConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(concat!("converty-bridge/", env!("CARGO_PKG_VERSION")))
        .build()
}
