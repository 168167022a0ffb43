//! # Lift -- a serverless handler runtime
//!
//! `Lift` turns an opaque cloud function event into a typed, testable
//! request/response pipeline: an [`adapters::AdapterRegistry`] normalizes
//! seven Lambda trigger shapes into one [`Request`], a [`PathRouter`] /
//! [`WebSocketRouter`] resolve it to a handler through a composed
//! middleware chain, and [`driver::LiftApp`] drives one invocation end to
//! end.
//!
//! ```rust,ignore
//! use lift::{LiftApp, LiftConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lambda_runtime::Error> {
//!     let mut app = LiftApp::new(LiftConfig::new());
//!     app.route("GET", "/health", lift::handler_adapter::from_context(|ctx| async move {
//!         ctx.response_mut().set_status(204);
//!         Ok(())
//!     }));
//!     lift::run(app).await
//! }
//! ```

#![warn(missing_docs)]

pub mod adapters;
pub mod config;
pub mod driver;
pub mod errors;
pub mod handler_adapter;
pub mod testing;
pub mod websocket;

// ============================================================================
// Core Traits & Types (from lift-core)
// ============================================================================
pub use lift_core::collaborators::{
    AuthValidator, ConnectionStore, Logger, ManagementApi, Metric, MetricsCollector, Principal, RateLimitDecision,
    RateLimitStore, SecretProvider, SpanGuard, Tracer, WebSocketConnection,
};
pub use lift_core::context::{CancellationToken, Context};
pub use lift_core::error::{BoxError, ErrorCode, LiftError};
pub use lift_core::handler::{DynHandler, Handler, HandlerFn};
pub use lift_core::middleware::{compose, DynMiddleware, Middleware};
pub use lift_core::request::{string_map_from_value, Request};
pub use lift_core::response::{Body, Response};
pub use lift_core::trigger::Trigger;
pub use lift_core::validation::{errors_to_json, FieldError, Validate, ValueValidator};

// ============================================================================
// Standard Implementations (from lift-std)
// ============================================================================
pub use lift_std::collaborators::{InMemoryRateLimitStore, StdTracer, TracingLogger, TracingMetrics};
pub use lift_std::middleware::{
    AuthMiddleware, AuthzMiddleware, CorsConfig, CorsMiddleware, LoggerMiddleware, RateLimitMiddleware, RecoveryMiddleware,
    RequestIdMiddleware, TracingMiddleware, ValidationMiddleware, ORDERING,
};
pub use lift_std::recovery::{Backoff, CircuitBreaker, CircuitState, DefaultClassifier, Fallback, Retry, RetryClassifier};
pub use lift_std::routing::{PathRouter, RouteGroup, RoutingError, WebSocketRouter};

// ============================================================================
// This crate's own additions
// ============================================================================
pub use config::{Environment, LiftConfig};
pub use driver::{run, LiftApp};
pub use websocket::{CountingConnectionStore, WebSocketContextExt};

/// `#[lift::main]` and `#[lift::handler]`, re-exported behind the `macros` feature.
#[cfg(feature = "macros")]
pub use lift_macros::{handler, main};
