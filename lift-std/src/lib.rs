//! # lift-std
//!
//! Concrete routing, the built-in middleware set, recovery strategies, and
//! default implementations of `lift-core`'s collaborator contracts.
//!
//! `lift-core` defines the shapes; this crate is the "batteries included"
//! standard library built against them, the way `risten-std` relates to
//! `risten-core` in this lineage. Hosts that want a different routing
//! algorithm or a different default `Logger` can depend on `lift-core`
//! directly and skip this crate entirely.

#![warn(missing_docs)]

/// Default `Logger`/`MetricsCollector`/`Tracer`/`RateLimitStore` implementations.
pub mod collaborators;
/// The built-in middleware set (§4.3).
pub mod middleware;
/// Retry, circuit breaker, and fallback recovery strategies (§4.6).
pub mod recovery;
/// `PathRouter`, `RouteGroup`, and the WebSocket sub-router (§4.2).
pub mod routing;
