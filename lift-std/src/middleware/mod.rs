//! The built-in middleware set (§4.3).
//!
//! Each middleware here is freestanding and can be composed directly via
//! [`lift_core::middleware::compose`]; [`BuiltinMiddleware`] additionally
//! documents (and the `lift` facade relies on) the relative ordering §4.3
//! requires when all of them are present.

mod auth;
mod cors;
mod logger;
mod observability;
mod rate_limit;
mod recovery;
mod request_id;
mod validation;

pub use auth::{AuthMiddleware, AuthzMiddleware};
pub use cors::{CorsConfig, CorsMiddleware};
pub use logger::LoggerMiddleware;
pub use observability::TracingMiddleware;
pub use rate_limit::RateLimitMiddleware;
pub use recovery::RecoveryMiddleware;
pub use request_id::RequestIdMiddleware;
pub use validation::ValidationMiddleware;

/// Enumerates the built-ins strictly in the order §4.3 requires, purely as
/// documentation and a registration-order sanity check for `lift`'s default
/// app builder: request-id, logger, recovery, tracing, CORS, auth, authz,
/// rate-limit, validation -- handler comes after all of these.
pub const ORDERING: &[&str] = &[
    "request_id",
    "logger",
    "recovery",
    "tracing",
    "cors",
    "auth",
    "authz",
    "rate_limit",
    "validation",
];
