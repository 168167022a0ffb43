//! The three composable recovery strategies (§4.6).
//!
//! Each strategy is itself a [`Middleware`](lift_core::middleware::Middleware):
//! it wraps `next` and decides whether to call it, retry it, skip it, or
//! replace its result. This keeps them freely composable with everything
//! else in the pipeline -- "retry inside circuit breaker" is just
//! `compose(vec![circuit_breaker, retry], handler)`.

mod circuit_breaker;
mod fallback;
mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use fallback::Fallback;
pub use retry::{Backoff, Retry};

use lift_core::error::LiftError;

/// Decides whether a given error is worth retrying (§4.6 classifiers).
pub trait RetryClassifier: Send + Sync {
    fn is_retryable(&self, error: &LiftError) -> bool;
}

/// Retries errors whose default recoverability (§7) says so: timeouts,
/// bad gateway, service unavailable. 4xx-shaped errors never retry.
pub struct DefaultClassifier;

impl RetryClassifier for DefaultClassifier {
    fn is_retryable(&self, error: &LiftError) -> bool {
        error.is_retryable_by_default()
    }
}

impl<F> RetryClassifier for F
where
    F: Fn(&LiftError) -> bool + Send + Sync,
{
    fn is_retryable(&self, error: &LiftError) -> bool {
        self(error)
    }
}
