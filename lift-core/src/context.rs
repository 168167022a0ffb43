//! The per-invocation [`Context`] (§3, §5).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::collaborators::{ConnectionStore, Logger, ManagementApi, MetricsCollector, Principal, Tracer};
use crate::request::Request;
use crate::response::Response;

/// A deadline-aware, poll-based cancellation signal (§5).
///
/// This intentionally does not wake waiters the way `tokio::sync::Notify`
/// or a `CancellationToken` from the `tokio-util` crate would: libraries
/// that want to react to cancellation promptly are expected to poll
/// `is_cancelled` at natural yield points (between retry attempts, inside a
/// loop body, ...), not block on it.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    pub fn new(remaining: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + remaining),
        }
    }

    /// A token that never expires and is only cancelled explicitly.
    pub fn unbounded() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: None,
        }
    }

    /// Marks the token cancelled. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// True once cancelled explicitly or once the deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        if self.cancelled.load(Ordering::SeqCst) {
            return true;
        }
        matches!(self.deadline, Some(d) if Instant::now() >= d)
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}

/// Everything a [`crate::handler::Handler`] or
/// [`crate::middleware::Middleware`] needs for one invocation: the request,
/// the response being built up, collaborator handles, and a scratch map for
/// data middleware wants to pass down the chain.
pub struct Context {
    request: Request,
    response: Response,
    cancellation: CancellationToken,
    request_id: String,
    principal: Option<Principal>,
    logger: Arc<dyn Logger>,
    metrics: Arc<dyn MetricsCollector>,
    tracer: Arc<dyn Tracer>,
    scratch: HashMap<String, Value>,
    management_api: Option<Arc<dyn ManagementApi>>,
    connection_store: Option<Arc<dyn ConnectionStore>>,
}

impl Context {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        request: Request,
        request_id: impl Into<String>,
        cancellation: CancellationToken,
        logger: Arc<dyn Logger>,
        metrics: Arc<dyn MetricsCollector>,
        tracer: Arc<dyn Tracer>,
    ) -> Self {
        Self {
            request,
            response: Response::new(),
            cancellation,
            request_id: request_id.into(),
            principal: None,
            logger,
            metrics,
            tracer,
            scratch: HashMap::new(),
            management_api: None,
            connection_store: None,
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Set by the authentication middleware once a credential validates.
    pub fn set_principal(&mut self, principal: Principal) {
        self.principal = Some(principal);
    }

    pub fn user_id(&self) -> Option<&str> {
        self.principal.as_ref().and_then(|p| p.user_id.as_deref())
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.principal.as_ref().and_then(|p| p.tenant_id.as_deref())
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    /// Replaces the request-scoped logger, e.g. to bind request-id or
    /// tenant fields for the remainder of the chain.
    pub fn set_logger(&mut self, logger: Arc<dyn Logger>) {
        self.logger = logger;
    }

    pub fn metrics(&self) -> &Arc<dyn MetricsCollector> {
        &self.metrics
    }

    pub fn tracer(&self) -> &Arc<dyn Tracer> {
        &self.tracer
    }

    pub fn scratch(&self) -> &HashMap<String, Value> {
        &self.scratch
    }

    pub fn set_scratch(&mut self, key: impl Into<String>, value: Value) {
        self.scratch.insert(key.into(), value);
    }

    pub fn get_scratch(&self, key: &str) -> Option<&Value> {
        self.scratch.get(key)
    }

    /// The API Gateway Management API handle, present only for invocations
    /// dispatched through the WebSocket sub-router (§4.8).
    pub fn management_api(&self) -> Option<&Arc<dyn ManagementApi>> {
        self.management_api.as_ref()
    }

    pub fn set_management_api(&mut self, management_api: Arc<dyn ManagementApi>) {
        self.management_api = Some(management_api);
    }

    /// The connection persistence handle, present only for invocations
    /// dispatched through the WebSocket sub-router (§4.8).
    pub fn connection_store(&self) -> Option<&Arc<dyn ConnectionStore>> {
        self.connection_store.as_ref()
    }

    pub fn set_connection_store(&mut self, connection_store: Arc<dyn ConnectionStore>) {
        self.connection_store = Some(connection_store);
    }
}
