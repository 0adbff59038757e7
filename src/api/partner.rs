use crate::api::AppState;
use crate::api::schemas::oauth::UserParams;
use crate::api::schemas::orders::{Order, OrdersParams};
use crate::error::Result;
use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};

pub async fn get_products(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> Result<impl IntoResponse> {
    let user_id = params.user_id.as_deref().unwrap_or_else(|| state.token_service.default_user_id());
    let body = state.partner_service.get_products(user_id).await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<OrdersParams>,
) -> Result<impl IntoResponse> {
    let user_id = params.user_id.as_deref().unwrap_or_else(|| state.token_service.default_user_id());
    let orders = state.partner_service.list_orders(user_id, &params.to_query()).await?;
    Ok(Json(orders.into_iter().map(Order::from).collect::<Vec<_>>()))
}
