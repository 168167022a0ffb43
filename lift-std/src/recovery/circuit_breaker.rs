//! Per-named-circuit breaker state machine (§4.6).

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lift_core::context::Context;
use lift_core::error::{ErrorCode, LiftError};
use lift_core::handler::Handler;
use lift_core::middleware::Middleware;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: CircuitState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    opened_at: Option<Instant>,
}

/// `closed -> open` after `failure_threshold` consecutive failures;
/// `open -> half-open` after `cooldown` elapses; `half-open -> closed` after
/// `success_threshold` consecutive successes, or back to `open` on any
/// failure. While open, `next` is skipped entirely -- the fallback, if any,
/// runs instead -- otherwise `CIRCUIT_OPEN` is returned.
pub struct CircuitBreaker {
    name: String,
    failure_threshold: u32,
    success_threshold: u32,
    cooldown: Duration,
    fallback: Option<Box<dyn Fn(&Context) -> Result<(), LiftError> + Send + Sync>>,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, failure_threshold: u32, success_threshold: u32, cooldown: Duration) -> Self {
        Self {
            name: name.into(),
            failure_threshold: failure_threshold.max(1),
            success_threshold: success_threshold.max(1),
            cooldown,
            fallback: None,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                consecutive_successes: 0,
                opened_at: None,
            }),
        }
    }

    pub fn with_fallback(
        mut self,
        fallback: impl Fn(&Context) -> Result<(), LiftError> + Send + Sync + 'static,
    ) -> Self {
        self.fallback = Some(Box::new(fallback));
        self
    }

    pub fn state(&self) -> CircuitState {
        self.inner.lock().unwrap().state
    }

    fn should_attempt(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let elapsed = inner.opened_at.map(|t| t.elapsed()).unwrap_or_default();
                if elapsed >= self.cooldown {
                    inner.state = CircuitState::HalfOpen;
                    inner.consecutive_successes = 0;
                    true
                } else {
                    false
                }
            }
        }
    }

    fn on_success(&self) {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures = 0;
            }
            CircuitState::HalfOpen => {
                inner.consecutive_successes += 1;
                if inner.consecutive_successes >= self.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.consecutive_failures = 0;
                    inner.consecutive_successes = 0;
                }
            }
            CircuitState::Open => {}
        }
    }

    fn on_failure(&self) {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                }
            }
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                inner.consecutive_successes = 0;
            }
            CircuitState::Open => {}
        }
    }
}

impl Middleware for CircuitBreaker {
    fn process<'a>(
        &'a self,
        ctx: &'a mut Context,
        next: &'a (dyn Handler + Sync),
    ) -> Pin<Box<dyn Future<Output = Result<(), LiftError>> + Send + 'a>> {
        Box::pin(async move {
            if !self.should_attempt() {
                if let Some(fallback) = &self.fallback {
                    return fallback(ctx);
                }
                return Err(LiftError::new(
                    ErrorCode::CircuitOpen,
                    format!("circuit {} is open", self.name),
                ));
            }

            match next.handle(ctx).await {
                Ok(()) => {
                    self.on_success();
                    Ok(())
                }
                Err(err) => {
                    self.on_failure();
                    Err(err)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lift_core::handler::HandlerFn;
    use std::sync::Arc;

    fn test_ctx() -> Context {
        Context::new(
            lift_core::request::Request::new(
                lift_core::trigger::Trigger::Http,
                "GET",
                "/",
                http::HeaderMap::new(),
                std::collections::HashMap::new(),
                bytes::Bytes::new(),
                std::collections::HashMap::new(),
                serde_json::Value::Null,
            ),
            "req-1",
            lift_core::context::CancellationToken::unbounded(),
            Arc::new(crate::collaborators::NoopLogger),
            Arc::new(crate::collaborators::NoopMetrics),
            Arc::new(crate::collaborators::NoopTracer),
        )
    }

    fn failing() -> HandlerFn<impl Fn(&mut Context) -> Pin<Box<dyn Future<Output = Result<(), LiftError>> + Send>> + Send + Sync>
    {
        HandlerFn(|_ctx: &mut Context| {
            Box::pin(async { Err(LiftError::new(ErrorCode::ServiceUnavailable, "down")) })
                as Pin<Box<dyn Future<Output = Result<(), LiftError>> + Send>>
        })
    }

    #[tokio::test]
    async fn opens_after_threshold_failures() {
        let cb = CircuitBreaker::new("test", 2, 1, Duration::from_secs(60));
        let handler = failing();
        let mut ctx = test_ctx();
        let _ = cb.process(&mut ctx, &handler).await;
        assert_eq!(cb.state(), CircuitState::Closed);
        let _ = cb.process(&mut ctx, &handler).await;
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn open_circuit_short_circuits_without_calling_next() {
        let cb = CircuitBreaker::new("test", 1, 1, Duration::from_secs(60));
        let handler = failing();
        let mut ctx = test_ctx();
        let _ = cb.process(&mut ctx, &handler).await;
        assert_eq!(cb.state(), CircuitState::Open);
        let err = cb.process(&mut ctx, &handler).await.unwrap_err();
        assert_eq!(*err.code(), ErrorCode::CircuitOpen);
    }

    #[tokio::test]
    async fn half_open_closes_after_success_threshold() {
        let cb = CircuitBreaker::new("test", 1, 1, Duration::from_millis(1));
        let handler = failing();
        let mut ctx = test_ctx();
        let _ = cb.process(&mut ctx, &handler).await;
        assert_eq!(cb.state(), CircuitState::Open);
        tokio::time::sleep(Duration::from_millis(5)).await;

        let succeeding = HandlerFn(|_ctx: &mut Context| async { Ok(()) });
        cb.process(&mut ctx, &succeeding).await.unwrap();
        assert_eq!(cb.state(), CircuitState::Closed);
    }
}
