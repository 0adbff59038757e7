use crate::domain::interaction::{Interaction, NewInteraction};
use crate::domain::token::{TokenRecord, TokenUpdate};
use crate::error::Result;
use async_trait::async_trait;

/// Durable token state, one row per user.
#[async_trait]
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    async fn get(&self, user_id: &str) -> Result<Option<TokenRecord>>;

    /// Creates the user's record or overwrites it entirely.
    async fn upsert(&self, record: &TokenRecord) -> Result<()>;

    /// Applies a partial update to an existing record.
    ///
    /// # Errors
    /// Returns `AuthError::NoTokenFound` if the user has no record.
    async fn update_fields(&self, user_id: &str, update: &TokenUpdate) -> Result<()>;

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// Storage for chatbot interaction records.
#[async_trait]
pub trait InteractionStore: Send + Sync + std::fmt::Debug {
    async fn list(&self) -> Result<Vec<Interaction>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Interaction>>;

    async fn list_by_kind(&self, kind: &str) -> Result<Vec<Interaction>>;

    async fn insert(&self, interaction: NewInteraction) -> Result<Interaction>;
}
