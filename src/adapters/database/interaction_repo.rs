use crate::adapters::database::DbPool;
use crate::adapters::database::records::InteractionRecord;
use crate::domain::interaction::{Interaction, NewInteraction};
use crate::error::Result;
use crate::services::stores::InteractionStore;
use async_trait::async_trait;

#[derive(Clone, Debug)]
pub struct PgInteractionStore {
    pool: DbPool,
}

impl PgInteractionStore {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InteractionStore for PgInteractionStore {
    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn list(&self) -> Result<Vec<Interaction>> {
        let rows = sqlx::query_as::<_, InteractionRecord>(
            "SELECT id, user_id, type, details, status, created_at FROM chatbot.interactions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn find_by_id(&self, id: i64) -> Result<Option<Interaction>> {
        let row = sqlx::query_as::<_, InteractionRecord>(
            "SELECT id, user_id, type, details, status, created_at FROM chatbot.interactions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn list_by_kind(&self, kind: &str) -> Result<Vec<Interaction>> {
        let rows = sqlx::query_as::<_, InteractionRecord>(
            "SELECT id, user_id, type, details, status, created_at FROM chatbot.interactions WHERE type = $1 ORDER BY id",
        )
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[tracing::instrument(level = "debug", skip(self, interaction), fields(kind = %interaction.kind), err)]
    async fn insert(&self, interaction: NewInteraction) -> Result<Interaction> {
        let row = sqlx::query_as::<_, InteractionRecord>(
            r"
            INSERT INTO chatbot.interactions (user_id, type, details, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, type, details, status, created_at
            ",
        )
        .bind(interaction.user_id)
        .bind(&interaction.kind)
        .bind(&interaction.details)
        .bind(&interaction.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
