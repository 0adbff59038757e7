#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod console;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;

use crate::adapters::converty::{PartnerApi, http_client};
use crate::adapters::database::DbPool;
use crate::adapters::database::interaction_repo::PgInteractionStore;
use crate::adapters::database::token_repo::PgTokenStore;
use crate::api::AppState;
use crate::config::Config;
use crate::services::health_service::HealthService;
use crate::services::interaction_service::InteractionService;
use crate::services::partner_service::PartnerService;
use crate::services::stores::{InteractionStore, TokenStore};
use crate::services::token_service::TokenService;
use std::sync::Arc;
use tokio::sync::watch;

/// Applies the embedded SQL migrations.
///
/// # Errors
/// Returns an error if a migration fails to apply.
pub async fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    sqlx::migrate!().run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// Flips `shutdown_tx` to `true` on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
            () = terminate => tracing::info!("Received SIGTERM, shutting down"),
        }

        let _ = shutdown_tx.send(true);
    });
}

/// Wires stores and services together. Stores come either from a Postgres pool or
/// are injected directly.
#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    token_store: Option<Arc<dyn TokenStore>>,
    interaction_store: Option<Arc<dyn InteractionStore>>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, token_store: None, interaction_store: None }
    }

    #[must_use]
    pub fn with_database(self, pool: DbPool) -> Self {
        self.with_token_store(Arc::new(PgTokenStore::new(pool.clone())))
            .with_interaction_store(Arc::new(PgInteractionStore::new(pool)))
    }

    #[must_use]
    pub fn with_token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    #[must_use]
    pub fn with_interaction_store(mut self, store: Arc<dyn InteractionStore>) -> Self {
        self.interaction_store = Some(store);
        self
    }

    /// Builds the shared service instances.
    ///
    /// # Errors
    /// Returns an error if a store is missing or the HTTP client cannot be built.
    pub fn build(self) -> anyhow::Result<AppState> {
        let token_store = self.token_store.ok_or_else(|| anyhow::anyhow!("token store is required"))?;
        let interaction_store =
            self.interaction_store.ok_or_else(|| anyhow::anyhow!("interaction store is required"))?;

        let http = http_client(&self.config.partner)?;

        let token_service = TokenService::new(&self.config.oauth, http.clone(), Arc::clone(&token_store));
        let partner_service = PartnerService::new(
            PartnerApi::new(http, &self.config.partner.api_base_url),
            token_service.clone(),
            self.config.partner.store_id.clone(),
        );
        let interaction_service = InteractionService::new(interaction_store);
        let health_service = HealthService::new(token_store, self.config.database.health_timeout_ms);

        Ok(AppState { token_service, partner_service, interaction_service, health_service })
    }
}
