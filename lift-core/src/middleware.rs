//! The composable middleware pipeline (§4.3).
//!
//! Middleware wraps a [`Handler`] the way `tower` layers wrap a service: each
//! middleware receives the `Context` and a handle to the rest of the chain
//! (`next`), and decides whether to call it, short-circuit, or wrap its
//! result. Ordering matters and is fixed by §4.3 for built-in middleware;
//! user middleware is appended after those in registration order.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::error::LiftError;
use crate::handler::Handler;

#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Middleware`",
    label = "missing `Middleware` implementation",
    note = "implement `process` to observe or wrap the rest of the chain via `next`"
)]
pub trait Middleware: Send + Sync + 'static {
    fn process<'a>(
        &'a self,
        ctx: &'a mut Context,
        next: &'a (dyn Handler + Sync),
    ) -> impl Future<Output = Result<(), LiftError>> + Send + 'a;
}

/// Dynamic object-safe version of [`Middleware`].
pub trait DynMiddleware: Send + Sync + 'static {
    fn process_dyn<'a>(
        &'a self,
        ctx: &'a mut Context,
        next: &'a (dyn Handler + Sync),
    ) -> Pin<Box<dyn Future<Output = Result<(), LiftError>> + Send + 'a>>;
}

impl<T: Middleware> DynMiddleware for T {
    fn process_dyn<'a>(
        &'a self,
        ctx: &'a mut Context,
        next: &'a (dyn Handler + Sync),
    ) -> Pin<Box<dyn Future<Output = Result<(), LiftError>> + Send + 'a>> {
        Box::pin(self.process(ctx, next))
    }
}

impl Middleware for Box<dyn DynMiddleware> {
    fn process<'a>(
        &'a self,
        ctx: &'a mut Context,
        next: &'a (dyn Handler + Sync),
    ) -> impl Future<Output = Result<(), LiftError>> + Send + 'a {
        self.process_dyn(ctx, next)
    }
}

/// A single link in the composed chain: a middleware paired with the
/// (already-composed) rest of the chain, stored so the whole pipeline is
/// itself a [`Handler`].
struct Link {
    middleware: Arc<dyn DynMiddleware>,
    rest: Arc<dyn Handler + Send + Sync>,
}

impl Handler for Link {
    async fn handle(&self, ctx: &mut Context) -> Result<(), LiftError> {
        self.middleware.process(ctx, self.rest.as_ref()).await
    }
}

/// Composes a list of middleware (in execution order, outermost first)
/// around a terminal handler into a single [`Handler`].
///
/// This builds the chain from the inside out: the terminal handler is the
/// innermost link, and each middleware wraps progressively outward, so
/// `middlewares[0]` runs first and decides whether everything after it
/// (including the handler) ever runs.
pub fn compose(
    middlewares: Vec<Arc<dyn DynMiddleware>>,
    terminal: Arc<dyn Handler + Send + Sync>,
) -> Arc<dyn Handler + Send + Sync> {
    middlewares.into_iter().rev().fold(terminal, |rest, mw| {
        Arc::new(Link {
            middleware: mw,
            rest,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{Logger, Metric, MetricsCollector, SpanGuard, Tracer};
    use crate::handler::HandlerFn;
    use crate::request::Request;
    use crate::trigger::Trigger;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NoopLogger;
    impl Logger for NoopLogger {
        fn debug(&self, _: &str, _: &serde_json::Value) {}
        fn info(&self, _: &str, _: &serde_json::Value) {}
        fn warn(&self, _: &str, _: &serde_json::Value) {}
        fn error(&self, _: &str, _: &serde_json::Value) {}
        fn with(&self, _: serde_json::Value) -> Box<dyn Logger> {
            Box::new(NoopLogger)
        }
    }
    struct NoopMetric;
    impl Metric for NoopMetric {
        fn record(&self, _: f64, _: &[(&str, &str)]) {}
    }
    struct NoopMetrics;
    impl MetricsCollector for NoopMetrics {
        fn counter(&self, _: &str) -> Box<dyn Metric> {
            Box::new(NoopMetric)
        }
        fn gauge(&self, _: &str) -> Box<dyn Metric> {
            Box::new(NoopMetric)
        }
        fn histogram(&self, _: &str) -> Box<dyn Metric> {
            Box::new(NoopMetric)
        }
    }
    struct NoopSpan;
    impl SpanGuard for NoopSpan {
        fn add_annotation(&mut self, _: &str, _: &str) {}
    }
    struct NoopTracer;
    impl Tracer for NoopTracer {
        fn start_span(&self, _: &str) -> Box<dyn SpanGuard> {
            Box::new(NoopSpan)
        }
    }

    fn test_ctx() -> Context {
        Context::new(
            Request::new(
                Trigger::Http,
                "GET",
                "/",
                http::HeaderMap::new(),
                HashMap::new(),
                bytes::Bytes::new(),
                HashMap::new(),
                serde_json::Value::Null,
            ),
            "req-1",
            crate::context::CancellationToken::unbounded(),
            Arc::new(NoopLogger),
            Arc::new(NoopMetrics),
            Arc::new(NoopTracer),
        )
    }

    struct RecordingMiddleware {
        order: Arc<std::sync::Mutex<Vec<&'static str>>>,
        name: &'static str,
    }

    impl Middleware for RecordingMiddleware {
        fn process<'a>(
            &'a self,
            ctx: &'a mut Context,
            next: &'a (dyn Handler + Sync),
        ) -> impl Future<Output = Result<(), LiftError>> + Send + 'a {
            async move {
                self.order.lock().unwrap().push(self.name);
                next.handle(ctx).await
            }
        }
    }

    struct ShortCircuit;
    impl Middleware for ShortCircuit {
        fn process<'a>(
            &'a self,
            ctx: &'a mut Context,
            _next: &'a (dyn Handler + Sync),
        ) -> impl Future<Output = Result<(), LiftError>> + Send + 'a {
            async move {
                ctx.response_mut().set_status(403);
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn composed_chain_runs_middleware_in_registration_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = calls.clone();
        let terminal: Arc<dyn Handler + Send + Sync> = Arc::new(HandlerFn(move |ctx: &mut Context| {
            let calls = calls2.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                ctx.response_mut().set_status(200);
                Ok(())
            }
        }));
        let mws: Vec<Arc<dyn DynMiddleware>> = vec![
            Arc::new(RecordingMiddleware {
                order: order.clone(),
                name: "first",
            }),
            Arc::new(RecordingMiddleware {
                order: order.clone(),
                name: "second",
            }),
        ];
        let chain = compose(mws, terminal);
        let mut ctx = test_ctx();
        chain.handle(&mut ctx).await.unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.response().status_code(), 200);
    }

    #[tokio::test]
    async fn middleware_can_short_circuit_before_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = calls.clone();
        let terminal: Arc<dyn Handler + Send + Sync> = Arc::new(HandlerFn(move |_ctx: &mut Context| {
            let calls = calls2.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }));
        let mws: Vec<Arc<dyn DynMiddleware>> = vec![Arc::new(ShortCircuit)];
        let chain = compose(mws, terminal);
        let mut ctx = test_ctx();
        chain.handle(&mut ctx).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(ctx.response().status_code(), 403);
    }
}
