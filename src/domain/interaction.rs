use serde_json::Value;
use time::OffsetDateTime;

/// A free-form record written by the chatbot (addresses, orders, issues).
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub id: i64,
    pub user_id: i64,
    pub kind: String,
    pub details: Value,
    pub status: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewInteraction {
    pub user_id: i64,
    pub kind: String,
    pub details: Value,
    pub status: String,
}

/// Interaction type listed by the issues view.
pub const ISSUE_KIND: &str = "issue";

impl Interaction {
    /// Renders a string field of `details`, `<nil>` when absent.
    #[must_use]
    pub fn detail(&self, key: &str) -> String {
        match self.details.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => "<nil>".to_string(),
            Some(other) => other.to_string(),
        }
    }
}
