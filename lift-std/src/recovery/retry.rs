//! Exponential-backoff-with-jitter retry (§4.6).

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use lift_core::context::Context;
use lift_core::error::{ErrorCode, LiftError};
use lift_core::handler::Handler;
use lift_core::middleware::Middleware;
use rand::Rng;

use super::{DefaultClassifier, RetryClassifier};

/// Exponential backoff with full jitter: `delay = random(0, min(cap, base *
/// 2^attempt))`.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub base: Duration,
    pub cap: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(50),
            cap: Duration::from_secs(5),
        }
    }
}

impl Backoff {
    fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self.base.saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX));
        let capped = exp.min(self.cap);
        let jittered_millis = rand::thread_rng().gen_range(0..=capped.as_millis().max(1) as u64);
        Duration::from_millis(jittered_millis)
    }
}

/// Re-invokes `next` up to `max_attempts` times (the first call plus
/// `max_attempts - 1` retries) while the classifier says the error is
/// retryable. Errors that don't match the classifier propagate immediately.
pub struct Retry {
    max_attempts: u32,
    backoff: Backoff,
    classifier: Box<dyn RetryClassifier>,
}

impl Retry {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Backoff::default(),
            classifier: Box::new(DefaultClassifier),
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_classifier(mut self, classifier: impl RetryClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }
}

impl Middleware for Retry {
    fn process<'a>(
        &'a self,
        ctx: &'a mut Context,
        next: &'a (dyn Handler + Sync),
    ) -> Pin<Box<dyn Future<Output = Result<(), LiftError>> + Send + 'a>> {
        Box::pin(async move {
            let mut attempt = 0;
            loop {
                if ctx.cancellation().is_cancelled() {
                    return Err(LiftError::new(ErrorCode::Cancelled, "request cancelled"));
                }
                match next.handle(ctx).await {
                    Ok(()) => return Ok(()),
                    Err(err) => {
                        attempt += 1;
                        if attempt >= self.max_attempts || !self.classifier.is_retryable(&err) {
                            return Err(err);
                        }
                        tokio::time::sleep(self.backoff.delay_for(attempt - 1)).await;
                    }
                }
            }
        })
    }
}
