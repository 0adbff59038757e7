use crate::domain::token::TokenRecord;
use time::OffsetDateTime;

#[derive(Debug, sqlx::FromRow)]
pub struct TokenInfoRecord {
    pub(crate) user_id: String,
    pub(crate) access_token: String,
    pub(crate) refresh_token: String,
    pub(crate) token_type: String,
    pub(crate) expires_in: i64,
    pub(crate) issued_at: OffsetDateTime,
    pub(crate) expires_at: OffsetDateTime,
    pub(crate) refresh_issued_at: OffsetDateTime,
    pub(crate) refresh_expires_at: OffsetDateTime,
}

impl From<TokenInfoRecord> for TokenRecord {
    fn from(record: TokenInfoRecord) -> Self {
        Self {
            user_id: record.user_id,
            access_token: record.access_token,
            refresh_token: record.refresh_token,
            token_type: record.token_type,
            expires_in: record.expires_in,
            issued_at: record.issued_at,
            expires_at: record.expires_at,
            refresh_issued_at: record.refresh_issued_at,
            refresh_expires_at: record.refresh_expires_at,
        }
    }
}
