use crate::domain::interaction::Interaction;
use time::OffsetDateTime;

#[derive(Debug, sqlx::FromRow)]
pub struct InteractionRecord {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    #[sqlx(rename = "type")]
    pub(crate) kind: String,
    pub(crate) details: serde_json::Value,
    pub(crate) status: String,
    pub(crate) created_at: OffsetDateTime,
}

impl From<InteractionRecord> for Interaction {
    fn from(record: InteractionRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            kind: record.kind,
            details: record.details,
            status: record.status,
            created_at: record.created_at,
        }
    }
}
