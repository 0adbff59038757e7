use crate::services::stores::TokenStore;
use opentelemetry::{KeyValue, global, metrics::Gauge};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

#[derive(Clone, Debug)]
pub struct Metrics {
    pub status: Gauge<i64>,
}

impl Metrics {
    #[must_use]
    pub(crate) fn new() -> Self {
        let meter = global::meter("converty-bridge");
        Self {
            status: meter
                .i64_gauge("converty_health_status")
                .with_description("Status of health checks (1 for ok, 0 for error)")
                .build(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
pub struct HealthService {
    store: Arc<dyn TokenStore>,
    timeout: Duration,
    metrics: Metrics,
}

impl HealthService {
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>, timeout_ms: u64) -> Self {
        Self { store, timeout: Duration::from_millis(timeout_ms), metrics: Metrics::new() }
    }

    /// Checks that the token store answers.
    ///
    /// # Errors
    /// Returns a string describing the failure if the store is unreachable or too slow.
    pub async fn check_store(&self) -> Result<(), String> {
        match timeout(self.timeout, self.store.health_check()).await {
            Ok(Ok(())) => {
                self.metrics.status.record(1, &[KeyValue::new("component", "token_store")]);
                Ok(())
            }
            Ok(Err(e)) => {
                self.metrics.status.record(0, &[KeyValue::new("component", "token_store")]);
                Err(format!("Token store check failed: {e}"))
            }
            Err(_) => {
                self.metrics.status.record(0, &[KeyValue::new("component", "token_store")]);
                Err("Token store check timed out".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryTokenStore;
    use crate::domain::token::{TokenRecord, TokenUpdate};
    use crate::error::{AppError, Result};
    use async_trait::async_trait;

    #[derive(Debug)]
    struct SlowStore;

    #[async_trait]
    impl TokenStore for SlowStore {
        async fn get(&self, _user_id: &str) -> Result<Option<TokenRecord>> {
            Ok(None)
        }

        async fn upsert(&self, _record: &TokenRecord) -> Result<()> {
            Ok(())
        }

        async fn update_fields(&self, _user_id: &str, _update: &TokenUpdate) -> Result<()> {
            Err(AppError::Internal)
        }

        async fn health_check(&self) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_in_memory_store_is_healthy() {
        let service = HealthService::new(Arc::new(InMemoryTokenStore::new()), 100);
        assert!(service.check_store().await.is_ok());
    }

    #[tokio::test]
    async fn test_slow_store_times_out() {
        let service = HealthService::new(Arc::new(SlowStore), 20);
        assert_eq!(service.check_store().await.unwrap_err(), "Token store check timed out");
    }
}
