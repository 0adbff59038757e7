use crate::domain::interaction::{Interaction, NewInteraction};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

#[derive(Debug, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub details: Value,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Interaction> for Record {
    fn from(record: Interaction) -> Self {
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

#[derive(Debug, Serialize, Deserialize)]
pub struct NewRecord {
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub details: Value,
    pub status: String,
}

impl From<NewRecord> for NewInteraction {
    fn from(record: NewRecord) -> Self {
        Self { user_id: record.user_id, kind: record.kind, details: record.details, status: record.status }
    }
}
