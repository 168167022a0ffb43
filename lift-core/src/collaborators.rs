//! Collaborator contracts (§6).
//!
//! The core consumes these, it does not implement them. `lift-std` ships
//! reasonable default implementations (a `tracing`-backed `Logger`, an
//! in-process `RateLimitStore`, ...); production hosts are expected to
//! supply their own (CloudWatch, DynamoDB, a JWT validator, ...) without the
//! core ever depending on those SDKs.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::LiftError;

/// Authenticated identity, attached to [`crate::context::Context`] once the
/// authentication middleware has run.
#[derive(Debug, Clone, Default)]
pub struct Principal {
    pub user_id: Option<String>,
    pub tenant_id: Option<String>,
    pub roles: Vec<String>,
    pub scopes: Vec<String>,
    pub claims: Value,
}

/// Structured logging handle.
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str, fields: &Value);
    fn info(&self, message: &str, fields: &Value);
    fn warn(&self, message: &str, fields: &Value);
    fn error(&self, message: &str, fields: &Value);

    /// Returns a logger with `fields` bound to every subsequent call.
    fn with(&self, fields: Value) -> Box<dyn Logger>;
}

/// A single emitted metric (counter, gauge or histogram).
pub trait Metric: Send + Sync {
    fn record(&self, value: f64, tags: &[(&str, &str)]);
}

/// Metrics collection handle.
pub trait MetricsCollector: Send + Sync {
    fn counter(&self, name: &str) -> Box<dyn Metric>;
    fn gauge(&self, name: &str) -> Box<dyn Metric>;
    fn histogram(&self, name: &str) -> Box<dyn Metric>;
}

/// An open tracing span handle, closed by dropping the guard returned from
/// [`Tracer::start_span`].
pub trait SpanGuard: Send {
    fn add_annotation(&mut self, key: &str, value: &str);
}

/// Distributed tracing handle.
pub trait Tracer: Send + Sync {
    fn start_span(&self, name: &str) -> Box<dyn SpanGuard>;
}

/// Validates a bearer token (or similar credential) handed in by the
/// authentication middleware, producing a [`Principal`] or a `LiftError`
/// (typically `UNAUTHORIZED`). The core never implements a token format
/// itself -- that is always a collaborator's job.
#[async_trait]
pub trait AuthValidator: Send + Sync {
    async fn validate(&self, token: &str, config: &Value) -> Result<Principal, LiftError>;
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u64,
    pub reset_at_epoch_secs: u64,
}

/// Token-bucket style rate limiting, backed by whatever shared store the
/// host wires up (in-process, Redis, DynamoDB, ...).
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn try_consume(&self, key: &str, limit: u64, window_secs: u64) -> RateLimitDecision;
}

/// A WebSocket connection record (§3).
#[derive(Debug, Clone)]
pub struct WebSocketConnection {
    pub id: String,
    pub user_id: Option<String>,
    pub tenant_id: Option<String>,
    pub created_at_epoch_secs: u64,
    pub last_active_at_epoch_secs: u64,
    pub ttl_secs: u64,
    pub metadata: HashMap<String, Value>,
}

/// WebSocket lifecycle persistence (§4.8). The core defines this contract
/// without owning storage.
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    async fn save(&self, connection: WebSocketConnection) -> Result<(), LiftError>;
    async fn delete(&self, id: &str) -> Result<(), LiftError>;
    async fn get(&self, id: &str) -> Result<Option<WebSocketConnection>, LiftError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<WebSocketConnection>, LiftError>;
    async fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<WebSocketConnection>, LiftError>;
    /// May be eventually consistent (§4.8).
    async fn count_active(&self) -> Result<u64, LiftError>;
}

/// The API Gateway Management API contract (§4.8), injected so the core
/// never links against an AWS SDK client directly.
#[async_trait]
pub trait ManagementApi: Send + Sync {
    async fn post_to_connection(&self, connection_id: &str, data: &[u8]) -> Result<(), LiftError>;
    async fn delete_connection(&self, connection_id: &str) -> Result<(), LiftError>;
    async fn get_connection(&self, connection_id: &str) -> Result<Value, LiftError>;
}

/// Secret retrieval, e.g. for JWT signing keys or downstream API credentials.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    async fn get(&self, name: &str) -> Result<String, LiftError>;

    async fn rotate(&self, _name: &str) -> Result<(), LiftError> {
        Err(LiftError::new(
            crate::error::ErrorCode::Custom("ROTATION_UNSUPPORTED".into()),
            "this secret provider does not support rotation",
        ))
    }
}
