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

use converty_bridge::adapters::memory::{InMemoryInteractionStore, InMemoryTokenStore};
use converty_bridge::config::Config;
use converty_bridge::console::Console;
use converty_bridge::{AppBuilder, adapters, telemetry};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::watch;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let log_target = telemetry::LogTarget::for_console(config.console);
    let telemetry_guard = telemetry::init_telemetry(&config.telemetry, log_target)?;

    let boot_span = tracing::info_span!("boot_server");
    let (listener, state, shutdown_tx, shutdown_rx) = async {
        // Phase 1: Infrastructure Setup (Resources)
        let builder = AppBuilder::new(config.clone());
        let builder = if config.in_memory {
            tracing::warn!("Running with in-memory stores; tokens and records are lost on exit");
            builder
                .with_token_store(Arc::new(InMemoryTokenStore::new()))
                .with_interaction_store(Arc::new(InMemoryInteractionStore::new()))
        } else {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("CONVERTY_DATABASE_URL is required unless --in-memory is set"))?;
            let pool = adapters::database::init_pool(url, &config.database).await?;
            converty_bridge::run_migrations(&pool).await?;
            builder.with_database(pool)
        };

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        converty_bridge::spawn_signal_handler(shutdown_tx.clone());

        // Phase 2: Component Wiring
        let state = builder.build()?;

        // Phase 3: Listener
        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        tracing::info!(address = %addr, "listening");
        let listener = tokio::net::TcpListener::bind(addr).await?;

        Ok::<_, anyhow::Error>((listener, state, shutdown_tx, shutdown_rx))
    }
    .instrument(boot_span)
    .await?;

    // Phase 4: Start Runtime
    let console_task = config.console.then(|| {
        let console = Console::new(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            state.interaction_service.clone(),
            state.partner_service.clone(),
            state.token_service.default_user_id(),
        );
        let shutdown_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = console.run().await {
                tracing::error!(error = %e, "Console failed");
            }
            // Leaving the console stops the whole process.
            let _ = shutdown_tx.send(true);
        })
    });

    let mut api_rx = shutdown_rx.clone();
    let server = axum::serve(listener, converty_bridge::api::app_router(state))
        .with_graceful_shutdown(async move {
            let _ = api_rx.wait_for(|&s| s).await;
        })
        .into_future();

    let shutdown_timeout = std::time::Duration::from_secs(config.server.shutdown_timeout_secs);
    let mut drain_rx = shutdown_rx.clone();
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Server error");
            }
        }
        () = async {
            let _ = drain_rx.wait_for(|&s| s).await;
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            tracing::warn!("Timeout waiting for in-flight requests to finish.");
        }
    }

    // Phase 5: Graceful Shutdown Orchestration
    let _ = shutdown_tx.send(true);
    if let Some(task) = console_task {
        task.abort();
    }

    telemetry_guard.shutdown();
    Ok(())
}
