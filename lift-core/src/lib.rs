//! # lift-core
//!
//! Core request/response/context types and collaborator contracts for the
//! Lift serverless handler runtime.
//!
//! This crate has minimal dependencies (`http`, `bytes`, `serde`,
//! `thiserror`, `async-trait`) and carries no AWS or Lambda-specific code at
//! all -- it describes the shape of a normalized invocation, independent of
//! any particular cloud host. `lift-std` provides concrete routing,
//! middleware and recovery implementations against these types, and `lift`
//! provides the Lambda-specific Event Adapter Registry and Invocation
//! Driver that produce and consume them.
//!
//! # Layers
//!
//! - [`Request`] / [`Response`] -- the normalized per-invocation data (§3).
//! - [`Context`] -- everything a handler needs to process one invocation,
//!   including collaborator handles and a [`CancellationToken`].
//! - [`Handler`] / [`DynHandler`] -- the terminal unit of processing, static
//!   dispatch paired with an object-safe bridge for storage in `Arc<dyn _>`.
//! - [`Middleware`] / [`DynMiddleware`] -- composable wrapping around a
//!   handler, assembled by [`middleware::compose`].
//! - [`LiftError`] -- the single structured failure shape recovery
//!   middleware and adapters both produce.
//! - `collaborators` -- contracts (`Logger`, `MetricsCollector`, `Tracer`,
//!   `AuthValidator`, `RateLimitStore`, `ConnectionStore`, `ManagementApi`,
//!   `SecretProvider`) this crate consumes but never implements.

#![warn(missing_docs)]
#![allow(clippy::module_inception)]

pub mod collaborators;
pub mod context;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod request;
pub mod response;
pub mod trigger;
pub mod validation;

pub use collaborators::{
    AuthValidator, ConnectionStore, Logger, ManagementApi, Metric, MetricsCollector, Principal,
    RateLimitDecision, RateLimitStore, SecretProvider, SpanGuard, Tracer, WebSocketConnection,
};
pub use context::{CancellationToken, Context};
pub use error::{BoxError, ErrorCode, LiftError};
pub use handler::{DynHandler, Handler, HandlerFn};
pub use middleware::{compose, DynMiddleware, Middleware};
pub use request::{string_map_from_value, Request};
pub use response::{Body, Response};
pub use trigger::Trigger;
pub use validation::{errors_to_json, FieldError, Validate, ValueValidator};
