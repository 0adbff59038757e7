use crate::domain::token::TokenRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginParams {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserParams {
    pub user_id: Option<String>,
}

/// Token pair as returned by the refresh endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<TokenRecord> for TokenResponse {
    fn from(record: TokenRecord) -> Self {
        Self {
            access_token: record.access_token,
            refresh_token: record.refresh_token,
            expires_in: record.expires_in,
            token_type: record.token_type,
        }
    }
}
