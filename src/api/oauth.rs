use crate::api::AppState;
use crate::api::schemas::oauth::{CallbackParams, LoginParams, TokenResponse, UserParams};
use crate::error::Result;
use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

/// Starts an authorization flow and redirects the browser to the authorization server.
pub async fn login(State(state): State<AppState>, Query(params): Query<LoginParams>) -> Result<impl IntoResponse> {
    let request = state.token_service.begin_authorization(params.user_id.as_deref())?;
    tracing::debug!("Redirecting to authorization server");
    Ok((StatusCode::FOUND, [(header::LOCATION, request.url)]))
}

pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse> {
    let record = state.token_service.exchange_code(params.code.as_deref(), params.state.as_deref()).await?;

    Ok(format!(
        "Authorization successful! Access Token: {}\nRefresh Token: {}",
        record.access_token, record.refresh_token
    ))
}

pub async fn refresh(State(state): State<AppState>, Query(params): Query<UserParams>) -> Result<impl IntoResponse> {
    let user_id = params.user_id.as_deref().unwrap_or_else(|| state.token_service.default_user_id());
    let record = state.token_service.refresh_token(user_id).await?;
    Ok(Json(TokenResponse::from(record)))
}
