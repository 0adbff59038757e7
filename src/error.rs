use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use time::OffsetDateTime;

/// Failures of the OAuth2 token lifecycle.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid state parameter")]
    InvalidState,
    #[error("No authorization code received")]
    MissingCode,
    #[error("No token found, please re-authenticate via /login")]
    NoTokenFound,
    #[error("No refresh token available, please re-authenticate via /login")]
    NoRefreshToken,
    #[error("Refresh token has expired at: {expired_at}, please re-authenticate via /login")]
    RefreshTokenExpired { expired_at: OffsetDateTime },
    #[error("Token request failed with status {status}: {body}")]
    TokenExchangeFailed { status: u16, body: String },
    #[error("Failed to parse token response: {0}")]
    MalformedTokenResponse(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Failed to reach upstream: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API request failed with status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("Upstream rejected the request: {0}")]
    UpstreamRejected(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal server error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AuthError {
    const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidState | Self::MissingCode | Self::NoRefreshToken => StatusCode::BAD_REQUEST,
            Self::NoTokenFound
            | Self::RefreshTokenExpired { .. }
            | Self::TokenExchangeFailed { .. }
            | Self::MalformedTokenResponse(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Auth(e) => {
                tracing::debug!(error = %e, "Authorization failed");
                (e.status_code(), e.to_string())
            }
            Self::Database(e) => {
                tracing::error!(error = %e, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            e @ (Self::Network(_) | Self::Upstream { .. } | Self::UpstreamRejected(_)) => {
                tracing::warn!(error = %e, "Upstream failure");
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            e @ Self::NotFound(_) => {
                tracing::debug!("Resource not found");
                (StatusCode::NOT_FOUND, e.to_string())
            }
            Self::BadRequest(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, msg)
            }
            Self::Internal => {
                tracing::error!("Internal server error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
