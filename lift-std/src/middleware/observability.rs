//! Tracing/observability middleware (§4.3 ordering position 4).

use std::future::Future;
use std::pin::Pin;

use lift_core::context::Context;
use lift_core::error::LiftError;
use lift_core::handler::Handler;
use lift_core::middleware::Middleware;

/// Opens a span for the invocation via the context's [`Tracer`](lift_core::collaborators::Tracer)
/// collaborator and annotates it with the outcome.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn process<'a>(
        &'a self,
        ctx: &'a mut Context,
        next: &'a (dyn Handler + Sync),
    ) -> Pin<Box<dyn Future<Output = Result<(), LiftError>> + Send + 'a>> {
        Box::pin(async move {
            let mut span = ctx.tracer().start_span(ctx.request().path());
            span.add_annotation("http.method", ctx.request().method());

            let result = next.handle(ctx).await;

            match &result {
                Ok(()) => span.add_annotation("http.status_code", &ctx.response().status_code().to_string()),
                Err(err) => span.add_annotation("error.code", err.code().as_str()),
            }

            result
        })
    }
}
