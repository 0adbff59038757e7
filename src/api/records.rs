use crate::api::AppState;
use crate::api::middleware::ApiJson;
use crate::api::schemas::records::{NewRecord, Record};
use crate::error::Result;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

pub async fn list_records(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let records = state.interaction_service.list_records().await?;
    Ok(Json(records.into_iter().map(Record::from).collect::<Vec<_>>()))
}

pub async fn get_record(State(state): State<AppState>, Path(id): Path<i64>) -> Result<impl IntoResponse> {
    let record = state.interaction_service.find_record(id).await?;
    Ok(Json(Record::from(record)))
}

pub async fn create_record(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewRecord>,
) -> Result<impl IntoResponse> {
    let record = state.interaction_service.insert_record(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(Record::from(record))))
}

pub async fn list_issues(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let issues = state.interaction_service.list_issues().await?;
    Ok(Json(issues.into_iter().map(Record::from).collect::<Vec<_>>()))
}
