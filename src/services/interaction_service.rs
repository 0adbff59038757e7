use crate::domain::interaction::{ISSUE_KIND, Interaction, NewInteraction};
use crate::error::{AppError, Result};
use crate::services::stores::InteractionStore;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct InteractionService {
    store: Arc<dyn InteractionStore>,
}

impl InteractionService {
    #[must_use]
    pub fn new(store: Arc<dyn InteractionStore>) -> Self {
        Self { store }
    }

    /// # Errors
    /// Returns `AppError::Database` if the store fails.
    pub async fn list_records(&self) -> Result<Vec<Interaction>> {
        self.store.list().await
    }

    /// # Errors
    /// Returns `AppError::NotFound` if no record has this id.
    #[tracing::instrument(skip(self), err(level = "debug"))]
    pub async fn find_record(&self, id: i64) -> Result<Interaction> {
        self.store.find_by_id(id).await?.ok_or_else(|| AppError::NotFound(format!("Record with ID {id}")))
    }

    /// Stores a new record. `details` must be a JSON object.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` for non-object details or an empty type.
    #[tracing::instrument(skip(self, interaction), fields(kind = %interaction.kind), err(level = "debug"))]
    pub async fn insert_record(&self, interaction: NewInteraction) -> Result<Interaction> {
        if interaction.kind.trim().is_empty() {
            return Err(AppError::BadRequest("type must not be empty".to_string()));
        }
        if !interaction.details.is_object() {
            return Err(AppError::BadRequest("details must be a JSON object".to_string()));
        }

        let record = self.store.insert(interaction).await?;
        tracing::info!(record_id = record.id, "Interaction record inserted");
        Ok(record)
    }

    /// # Errors
    /// Returns `AppError::Database` if the store fails.
    pub async fn list_issues(&self) -> Result<Vec<Interaction>> {
        self.store.list_by_kind(ISSUE_KIND).await
    }
}
