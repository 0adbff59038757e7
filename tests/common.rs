#![allow(dead_code)]
use converty_bridge::AppBuilder;
use converty_bridge::adapters::memory::{InMemoryInteractionStore, InMemoryTokenStore};
use converty_bridge::config::Config;
use converty_bridge::domain::token::TokenRecord;
use converty_bridge::services::stores::TokenStore;
use clap::Parser;
use std::sync::{Arc, Once};
use time::{Duration, OffsetDateTime};
use tokio::net::TcpListener;
use wiremock::MockServer;

static INIT: Once = Once::new();

pub const TOKEN_PATH: &str = "/oauth2/token";
pub const AUTHORIZE_PATH: &str = "/oauth2/authorize";

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("converty_bridge=debug".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap())
            .add_directive("wiremock=warn".parse().unwrap());

        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
}

/// Configuration pointing every upstream URL at `upstream`.
pub fn get_test_config(upstream: &str) -> Config {
    Config::try_parse_from([
        "converty-bridge".to_string(),
        "--in-memory".to_string(),
        "--host".to_string(),
        "127.0.0.1".to_string(),
        "--port".to_string(),
        "0".to_string(),
        "--client-id".to_string(),
        "test-client".to_string(),
        "--client-secret".to_string(),
        "test-secret".to_string(),
        "--redirect-uri".to_string(),
        "http://127.0.0.1/api/v1/callback".to_string(),
        "--authorize-url".to_string(),
        format!("{upstream}{AUTHORIZE_PATH}"),
        "--token-url".to_string(),
        format!("{upstream}{TOKEN_PATH}"),
        "--api-base-url".to_string(),
        upstream.to_string(),
        "--store-id".to_string(),
        "store-9".to_string(),
        "--request-timeout-secs".to_string(),
        "5".to_string(),
    ])
    .expect("test configuration must parse")
}

pub struct TestApp {
    pub server_url: String,
    pub client: reqwest::Client,
    pub upstream: MockServer,
    pub token_store: Arc<InMemoryTokenStore>,
    pub interaction_store: Arc<InMemoryInteractionStore>,
    pub config: Config,
}

impl TestApp {
    pub async fn spawn() -> Self {
        setup_tracing();

        let upstream = MockServer::start().await;
        let config = get_test_config(&upstream.uri());
        let token_store = Arc::new(InMemoryTokenStore::new());
        let interaction_store = Arc::new(InMemoryInteractionStore::new());

        let state = AppBuilder::new(config.clone())
            .with_token_store(token_store.clone())
            .with_interaction_store(interaction_store.clone())
            .build()
            .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = converty_bridge::api::app_router(state);
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        // Redirects are asserted on, never followed.
        let client = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none()).build().unwrap();

        Self {
            server_url: format!("http://{addr}"),
            client,
            upstream,
            token_store,
            interaction_store,
            config,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }

    /// Stores a token for the default user whose access and refresh tokens expire after the given offsets.
    pub async fn seed_token(&self, access_token: &str, access_valid_for: Duration, refresh_valid_for: Duration) {
        let now = OffsetDateTime::now_utc();
        let issued_at = now - Duration::hours(3);
        self.token_store
            .upsert(&TokenRecord {
                user_id: self.config.oauth.default_user_id.clone(),
                access_token: access_token.to_string(),
                refresh_token: "seeded-refresh".to_string(),
                token_type: "Bearer".to_string(),
                expires_in: 3600,
                issued_at,
                expires_at: now + access_valid_for,
                refresh_issued_at: issued_at,
                refresh_expires_at: now + refresh_valid_for,
            })
            .await
            .unwrap();
    }

    pub async fn stored_token(&self) -> Option<TokenRecord> {
        self.token_store.get(&self.config.oauth.default_user_id).await.unwrap()
    }
}
