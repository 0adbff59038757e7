use crate::domain::order::{self, OrderQuery};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Default, Deserialize)]
pub struct OrdersParams {
    pub user_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub archived: Option<bool>,
    pub abandoned: Option<bool>,
    pub deleted: Option<bool>,
    pub search: Option<String>,
    pub product: Option<String>,
    #[serde(rename = "deliveryCompany")]
    pub delivery_company: Option<String>,
}

impl OrdersParams {
    #[must_use]
    pub fn to_query(&self) -> OrderQuery {
        let defaults = OrderQuery::default();
        OrderQuery {
            page: self.page.filter(|p| *p > 0).unwrap_or(defaults.page),
            limit: self.limit.filter(|l| *l > 0).unwrap_or(defaults.limit),
            status: self.status.clone(),
            archived: self.archived,
            abandoned: self.abandoned,
            deleted: self.deleted,
            search: self.search.clone(),
            product: self.product.clone(),
            delivery_company: self.delivery_company.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub address: String,
    pub note: String,
    pub email: String,
    pub phone: String,
    pub city: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer: Customer,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<order::Order> for Order {
    fn from(order: order::Order) -> Self {
        let c = order.customer;
        Self {
            id: order.id,
            customer: Customer {
                name: c.name,
                address: c.address,
                note: c.note,
                email: c.email,
                phone: c.phone,
                city: c.city,
            },
            status: order.status,
            created_at: order.created_at,
        }
    }
}
