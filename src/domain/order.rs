use serde::Deserialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: String,
    pub customer: Customer,
    pub status: String,
    pub created_at: OffsetDateTime,
}

impl Order {
    /// Parses an RFC 3339 creation timestamp, substituting `fallback` when it is unparsable.
    #[must_use]
    pub fn parse_created_at(raw: &str, fallback: OffsetDateTime) -> OffsetDateTime {
        OffsetDateTime::parse(raw, &Rfc3339).unwrap_or_else(|_| {
            tracing::debug!(created_at = %raw, "Unparsable order timestamp, using current time");
            fallback
        })
    }
}

/// Filters accepted by the partner order listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuery {
    pub page: u32,
    pub limit: u32,
    pub status: Option<String>,
    pub archived: Option<bool>,
    pub abandoned: Option<bool>,
    pub deleted: Option<bool>,
    pub search: Option<String>,
    pub product: Option<String>,
    pub delivery_company: Option<String>,
}

impl Default for OrderQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            status: None,
            archived: None,
            abandoned: None,
            deleted: None,
            search: None,
            product: None,
            delivery_company: None,
        }
    }
}

impl OrderQuery {
    /// Query string pairs in the partner's parameter names. Empty strings are skipped.
    #[must_use]
    pub fn to_params(&self, store_id: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(12);

        if let Some(store_id) = store_id.filter(|s| !s.is_empty()) {
            params.push(("store_id", store_id.to_string()));
        }
        params.push(("page", self.page.to_string()));
        params.push(("limit", self.limit.to_string()));

        let text = [
            ("status", &self.status),
            ("search", &self.search),
            ("product", &self.product),
            ("deliveryCompany", &self.delivery_company),
        ];
        let flags = [("archived", self.archived), ("abandoned", self.abandoned), ("deleted", self.deleted)];

        for (name, value) in flags {
            if let Some(value) = value {
                params.push((name, value.to_string()));
            }
        }
        for (name, value) in text {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                params.push((name, value.to_string()));
            }
        }

        params
    }
}
