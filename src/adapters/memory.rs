//! Process-local stores for `--in-memory` runs and tests.

use crate::domain::interaction::{Interaction, NewInteraction};
use crate::domain::token::{TokenRecord, TokenUpdate};
use crate::error::{AuthError, Result};
use crate::services::stores::{InteractionStore, TokenStore};
use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    records: DashMap<String, TokenRecord>,
}

impl InMemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn get(&self, user_id: &str) -> Result<Option<TokenRecord>> {
        Ok(self.records.get(user_id).map(|r| r.value().clone()))
    }

    async fn upsert(&self, record: &TokenRecord) -> Result<()> {
        self.records.insert(record.user_id.clone(), record.clone());
        Ok(())
    }

    async fn update_fields(&self, user_id: &str, update: &TokenUpdate) -> Result<()> {
        let mut entry = self.records.get_mut(user_id).ok_or(AuthError::NoTokenFound)?;
        update.apply_to(entry.value_mut());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryInteractionStore {
    rows: RwLock<Vec<Interaction>>,
}

impl InMemoryInteractionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InteractionStore for InMemoryInteractionStore {
    async fn list(&self) -> Result<Vec<Interaction>> {
        Ok(self.rows.read().await.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Interaction>> {
        Ok(self.rows.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn list_by_kind(&self, kind: &str) -> Result<Vec<Interaction>> {
        Ok(self.rows.read().await.iter().filter(|r| r.kind == kind).cloned().collect())
    }

    async fn insert(&self, interaction: NewInteraction) -> Result<Interaction> {
        let mut rows = self.rows.write().await;
        let id = rows.last().map_or(1, |r| r.id + 1);
        let record = Interaction {
            id,
            user_id: interaction.user_id,
            kind: interaction.kind,
            details: interaction.details,
            status: interaction.status,
            created_at: OffsetDateTime::now_utc(),
        };
        rows.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;
    use time::Duration;

    fn record(user_id: &str, access: &str) -> TokenRecord {
        let now = OffsetDateTime::now_utc();
        TokenRecord {
            user_id: user_id.to_string(),
            access_token: access.to_string(),
            refresh_token: "refresh".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 60,
            issued_at: now,
            expires_at: now + Duration::seconds(60),
            refresh_issued_at: now,
            refresh_expires_at: now + Duration::seconds(60),
        }
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_record_per_user() {
        let store = InMemoryTokenStore::new();
        store.upsert(&record("user1", "first")).await.unwrap();
        store.upsert(&record("user1", "second")).await.unwrap();

        let stored = store.get("user1").await.unwrap().unwrap();
        assert_eq!(stored.access_token, "second");
        assert_eq!(store.records.len(), 1);
    }

    #[tokio::test]
    async fn test_update_fields_requires_existing_record() {
        let store = InMemoryTokenStore::new();
        let update = TokenUpdate { access_token: Some("new".into()), ..TokenUpdate::default() };

        let result = store.update_fields("ghost", &update).await;
        assert!(matches!(result, Err(AppError::Auth(AuthError::NoTokenFound))));

        store.upsert(&record("user1", "old")).await.unwrap();
        store.update_fields("user1", &update).await.unwrap();
        let stored = store.get("user1").await.unwrap().unwrap();
        assert_eq!(stored.access_token, "new");
        assert_eq!(stored.refresh_token, "refresh");
    }

    #[tokio::test]
    async fn test_interactions_get_sequential_ids() {
        let store = InMemoryInteractionStore::new();
        for kind in ["address", "issue"] {
            store
                .insert(NewInteraction {
                    user_id: 7,
                    kind: kind.to_string(),
                    details: json!({"k": "v"}),
                    status: "pending".to_string(),
                })
                .await
                .unwrap();
        }

        let all = store.list().await.unwrap();
        assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(store.list_by_kind("issue").await.unwrap().len(), 1);
        assert!(store.find_by_id(3).await.unwrap().is_none());
    }
}
