use crate::adapters::converty::{PartnerApi, RawResponse};
use crate::domain::order::{Customer, Order, OrderQuery};
use crate::error::{AppError, Result};
use crate::services::token_service::TokenService;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use time::OffsetDateTime;

const PRODUCTS_PATH: &str = "/api/v1/products";
const ORDERS_PATH: &str = "/api/v1/orders";

#[derive(Debug, Deserialize)]
struct OrdersEnvelope {
    success: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Vec<OrderItem>,
}

#[derive(Debug, Deserialize)]
struct OrderItem {
    id: String,
    #[serde(default)]
    customer: Customer,
    #[serde(default)]
    status: String,
    #[serde(default)]
    created_at: String,
}

/// Partner API operations that need a valid access token.
#[derive(Clone, Debug)]
pub struct PartnerService {
    api: PartnerApi,
    tokens: TokenService,
    store_id: Option<String>,
}

impl PartnerService {
    #[must_use]
    pub fn new(api: PartnerApi, tokens: TokenService, store_id: Option<String>) -> Self {
        Self { api, tokens, store_id }
    }

    /// Fetches the product catalogue and returns the body untouched.
    ///
    /// # Errors
    /// Token errors, `AppError::Network`, or `AppError::Upstream` for a non-200 response.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn get_products(&self, user_id: &str) -> Result<String> {
        let token = self.tokens.get_valid_access_token(user_id).await?;
        let response = self.api.call_raw(Method::GET, PRODUCTS_PATH, &token).await?;
        ensure_ok(response)
    }

    /// Lists orders. A 401 triggers exactly one forced refresh and one retry.
    ///
    /// # Errors
    /// Token errors, `AppError::Network`, `AppError::Upstream` for a non-200 response,
    /// `AppError::UpstreamRejected` when the partner reports failure or returns an unreadable body.
    #[tracing::instrument(skip(self, query), fields(page = query.page, limit = query.limit), err(level = "warn"))]
    pub async fn list_orders(&self, user_id: &str, query: &OrderQuery) -> Result<Vec<Order>> {
        let params = query.to_params(self.store_id.as_deref());

        let token = self.tokens.get_valid_access_token(user_id).await?;
        let mut response = self.api.get(ORDERS_PATH, &token, &params).await?;

        if response.status == StatusCode::UNAUTHORIZED {
            tracing::info!("Partner API rejected the access token, refreshing once");
            let token = self.tokens.force_refresh(user_id, &token).await?;
            response = self.api.get(ORDERS_PATH, &token, &params).await?;
        }

        let body = ensure_ok(response)?;
        parse_orders(&body, OffsetDateTime::now_utc())
    }
}

fn ensure_ok(response: RawResponse) -> Result<String> {
    if response.status == StatusCode::OK {
        Ok(response.body)
    } else {
        Err(AppError::Upstream { status: response.status.as_u16(), body: response.body })
    }
}

fn parse_orders(body: &str, now: OffsetDateTime) -> Result<Vec<Order>> {
    let envelope: OrdersEnvelope = serde_json::from_str(body)
        .map_err(|e| AppError::UpstreamRejected(format!("failed to parse response: {e}")))?;

    if !envelope.success {
        return Err(AppError::UpstreamRejected(envelope.message));
    }

    Ok(envelope
        .data
        .into_iter()
        .map(|item| Order {
            created_at: Order::parse_created_at(&item.created_at, now),
            id: item.id,
            customer: item.customer,
            status: item.status,
        })
        .collect())
}
