#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, missing_debug_implementations, unreachable_pub)]
use reqwest::StatusCode;
use serde_json::json;
use time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};
mod common;

fn orders_body() -> serde_json::Value {
    json!({
        "success": true,
        "message": "ok",
        "data": [
            {
                "id": "o-1",
                "customer": { "name": "Amine", "address": "12 Rue de Marseille", "phone": "22000000", "city": "Tunis" },
                "status": "pending",
                "created_at": "2024-06-30T08:15:00Z"
            },
            {
                "id": "o-2",
                "customer": { "name": "Sarra" },
                "status": "shipped",
                "created_at": "not a date"
            }
        ]
    })
}

#[tokio::test]
async fn test_get_products_passes_partner_body_through() {
    let app = common::TestApp::spawn().await;
    app.seed_token("access-1", Duration::hours(1), Duration::days(1)).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products"))
        .and(header("authorization", "Bearer access-1"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":[{"id":"p-1","name":"Mug"}]}"#))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let resp = app.client.get(app.url("/get-products")).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "application/json");
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"][0]["name"], "Mug");
}

#[tokio::test]
async fn test_get_products_refreshes_stale_token_first() {
    let app = common::TestApp::spawn().await;
    app.seed_token("access-1", Duration::minutes(-1), Duration::days(1)).await;
    Mock::given(method("POST"))
        .and(path(common::TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-2",
            "refresh_token": "refresh-2",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&app.upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products"))
        .and(header("authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let resp = app.client.get(app.url("/get-products")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_products_upstream_failure_is_bad_gateway() {
    let app = common::TestApp::spawn().await;
    app.seed_token("access-1", Duration::hours(1), Duration::days(1)).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&app.upstream)
        .await;

    let resp = app.client.get(app.url("/get-products")).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "API request failed with status 503: maintenance");
}

#[tokio::test]
async fn test_list_orders_maps_query_and_items() {
    let app = common::TestApp::spawn().await;
    app.seed_token("access-1", Duration::hours(1), Duration::days(1)).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/orders"))
        .and(query_param("store_id", "store-9"))
        .and(query_param("page", "3"))
        .and(query_param("limit", "10"))
        .and(query_param("status", "pending"))
        .and(query_param("deliveryCompany", "aramex"))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_body()))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let resp = app
        .client
        .get(app.url("/api/v1/orders"))
        .query(&[("page", "3"), ("status", "pending"), ("deliveryCompany", "aramex")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let orders: Vec<serde_json::Value> = resp.json().await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"], "o-1");
    assert_eq!(orders[0]["customer"]["city"], "Tunis");
    assert_eq!(orders[0]["created_at"], "2024-06-30T08:15:00Z");
    // The unparsable timestamp falls back to the time of the request.
    assert_eq!(orders[1]["customer"]["email"], "");
    assert!(orders[1]["created_at"].as_str().unwrap() > "2025-01-01");
}

#[tokio::test]
async fn test_list_orders_retries_once_after_unauthorized() {
    let app = common::TestApp::spawn().await;
    app.seed_token("revoked", Duration::hours(1), Duration::days(1)).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/orders"))
        .and(header("authorization", "Bearer revoked"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&app.upstream)
        .await;
    Mock::given(method("POST"))
        .and(path(common::TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-2",
            "refresh_token": "refresh-2",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&app.upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/orders"))
        .and(header("authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_body()))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let resp = app.client.get(app.url("/api/v1/orders")).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(app.stored_token().await.unwrap().access_token, "access-2");
}

#[tokio::test]
async fn test_list_orders_rejected_by_partner() {
    let app = common::TestApp::spawn().await;
    app.seed_token("access-1", Duration::hours(1), Duration::days(1)).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false, "message": "store disabled"})))
        .mount(&app.upstream)
        .await;

    let resp = app.client.get(app.url("/api/v1/orders")).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Upstream rejected the request: store disabled");
}

#[tokio::test]
async fn test_partner_routes_require_authorization() {
    let app = common::TestApp::spawn().await;

    for route in ["/get-products", "/api/v1/orders"] {
        let resp = app.client.get(app.url(route)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
