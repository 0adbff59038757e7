use crate::adapters::database::DbPool;
use crate::adapters::database::records::TokenInfoRecord;
use crate::domain::token::{TokenRecord, TokenUpdate};
use crate::error::{AuthError, Result};
use crate::services::stores::TokenStore;
use async_trait::async_trait;

#[derive(Clone, Debug)]
pub struct PgTokenStore {
    pool: DbPool,
}

impl PgTokenStore {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn get(&self, user_id: &str) -> Result<Option<TokenRecord>> {
        let record = sqlx::query_as::<_, TokenInfoRecord>(
            r"
            SELECT user_id, access_token, refresh_token, token_type, expires_in,
                   issued_at, expires_at, refresh_issued_at, refresh_expires_at
            FROM token_infos
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Into::into))
    }

    #[tracing::instrument(level = "debug", skip(self, record), fields(user_id = %record.user_id), err)]
    async fn upsert(&self, record: &TokenRecord) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO token_infos (
                user_id, access_token, refresh_token, token_type, expires_in,
                issued_at, expires_at, refresh_issued_at, refresh_expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id) DO UPDATE SET
                access_token = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token,
                token_type = EXCLUDED.token_type,
                expires_in = EXCLUDED.expires_in,
                issued_at = EXCLUDED.issued_at,
                expires_at = EXCLUDED.expires_at,
                refresh_issued_at = EXCLUDED.refresh_issued_at,
                refresh_expires_at = EXCLUDED.refresh_expires_at,
                updated_at = NOW()
            ",
        )
        .bind(&record.user_id)
        .bind(&record.access_token)
        .bind(&record.refresh_token)
        .bind(&record.token_type)
        .bind(record.expires_in)
        .bind(record.issued_at)
        .bind(record.expires_at)
        .bind(record.refresh_issued_at)
        .bind(record.refresh_expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self, update), err)]
    async fn update_fields(&self, user_id: &str, update: &TokenUpdate) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE token_infos SET
                access_token = COALESCE($2, access_token),
                refresh_token = COALESCE($3, refresh_token),
                token_type = COALESCE($4, token_type),
                expires_in = COALESCE($5, expires_in),
                issued_at = COALESCE($6, issued_at),
                expires_at = COALESCE($7, expires_at),
                refresh_issued_at = COALESCE($8, refresh_issued_at),
                refresh_expires_at = COALESCE($9, refresh_expires_at),
                updated_at = NOW()
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .bind(update.access_token.as_deref())
        .bind(update.refresh_token.as_deref())
        .bind(update.token_type.as_deref())
        .bind(update.expires_in)
        .bind(update.issued_at)
        .bind(update.expires_at)
        .bind(update.refresh_issued_at)
        .bind(update.refresh_expires_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::NoTokenFound.into());
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
