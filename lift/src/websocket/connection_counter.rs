//! Decorates a [`ConnectionStore`] with the atomic active-connection counter
//! required by §4.8: increment on save, decrement on delete, never below
//! zero, and counter bookkeeping never blocks the underlying lifecycle
//! operation it wraps.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use lift_core::collaborators::{ConnectionStore, Logger, MetricsCollector, WebSocketConnection};
use lift_core::error::LiftError;

pub struct CountingConnectionStore {
    inner: Arc<dyn ConnectionStore>,
    active: AtomicU64,
    metrics: Arc<dyn MetricsCollector>,
    logger: Arc<dyn Logger>,
}

impl CountingConnectionStore {
    pub fn new(inner: Arc<dyn ConnectionStore>, metrics: Arc<dyn MetricsCollector>, logger: Arc<dyn Logger>) -> Self {
        Self {
            inner,
            active: AtomicU64::new(0),
            metrics,
            logger,
        }
    }

    pub fn active_count(&self) -> u64 {
        self.active.load(Ordering::SeqCst)
    }

    /// Counter updates are fire-and-forget: a panic inside the metrics
    /// collaborator is caught and logged rather than propagated to the
    /// caller of `save`/`delete`.
    fn report(&self) {
        let value = self.active.load(Ordering::SeqCst) as f64;
        let metrics = &self.metrics;
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            metrics.gauge("websocket_connections_active").record(value, &[]);
        }));
        if outcome.is_err() {
            self.logger.warn(
                "failed to record active connection gauge",
                &serde_json::json!({"value": value}),
            );
        }
    }
}

#[async_trait]
impl ConnectionStore for CountingConnectionStore {
    async fn save(&self, connection: WebSocketConnection) -> Result<(), LiftError> {
        self.inner.save(connection).await?;
        self.active.fetch_add(1, Ordering::SeqCst);
        self.report();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), LiftError> {
        self.inner.delete(id).await?;
        let _ = self
            .active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| Some(v.saturating_sub(1)));
        self.report();
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<WebSocketConnection>, LiftError> {
        self.inner.get(id).await
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<WebSocketConnection>, LiftError> {
        self.inner.list_by_user(user_id).await
    }

    async fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<WebSocketConnection>, LiftError> {
        self.inner.list_by_tenant(tenant_id).await
    }

    async fn count_active(&self) -> Result<u64, LiftError> {
        Ok(self.active.load(Ordering::SeqCst))
    }
}
