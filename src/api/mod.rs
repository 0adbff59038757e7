use crate::services::health_service::HealthService;
use crate::services::interaction_service::InteractionService;
use crate::services::partner_service::PartnerService;
use crate::services::token_service::TokenService;
use axum::body::Body;
use axum::http::{HeaderName, Request};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod health;
pub mod middleware;
pub mod oauth;
pub mod partner;
pub mod records;
pub mod schemas;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Debug)]
pub struct AppState {
    pub token_service: TokenService,
    pub partner_service: PartnerService,
    pub interaction_service: InteractionService,
    pub health_service: HealthService,
}

/// Configures and returns the application router.
pub fn app_router(state: AppState) -> Router {
    let oauth_routes = Router::new()
        .route("/login", get(oauth::login))
        .route("/api/v1/callback", get(oauth::callback))
        .route("/refresh", post(oauth::refresh))
        .route("/GetAccessToken", post(oauth::refresh));

    let api_routes = Router::new()
        .route("/get-products", get(partner::get_products))
        .route("/api/v1/orders", get(partner::list_orders))
        .route("/api/v1/records", get(records::list_records).post(records::create_record))
        .route("/api/v1/records/{id}", get(records::get_record))
        .route("/api/v1/issues", get(records::list_issues));

    Router::new()
        .route("/health", get(health::health))
        .route("/readyz", get(health::readyz))
        .merge(oauth_routes)
        .merge(api_routes)
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER)))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .and_then(|id| id.header_value().to_str().ok())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                        let status = response.status();
                        span.record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER), middleware::MakeRequestUuidV7))
        .with_state(state)
}
