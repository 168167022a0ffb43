//! Structured start/finish logging (§4.3 ordering position 2).

use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use lift_core::context::Context;
use lift_core::error::LiftError;
use lift_core::handler::Handler;
use lift_core::middleware::Middleware;

pub struct LoggerMiddleware;

impl Middleware for LoggerMiddleware {
    fn process<'a>(
        &'a self,
        ctx: &'a mut Context,
        next: &'a (dyn Handler + Sync),
    ) -> Pin<Box<dyn Future<Output = Result<(), LiftError>> + Send + 'a>> {
        Box::pin(async move {
            let started = Instant::now();
            ctx.logger().info(
                "request started",
                &serde_json::json!({
                    "method": ctx.request().method(),
                    "path": ctx.request().path(),
                }),
            );

            let result = next.handle(ctx).await;
            let elapsed_ms = started.elapsed().as_millis();

            match &result {
                Ok(()) => ctx.logger().info(
                    "request completed",
                    &serde_json::json!({
                        "status_code": ctx.response().status_code(),
                        "elapsed_ms": elapsed_ms,
                    }),
                ),
                Err(err) => ctx.logger().error(
                    "request failed",
                    &serde_json::json!({
                        "code": err.code().as_str(),
                        "status_code": err.status_code(),
                        "elapsed_ms": elapsed_ms,
                        "details": err.details(),
                    }),
                ),
            }

            result
        })
    }
}
